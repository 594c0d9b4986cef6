//! # Form Intake Service
//!
//! This module aggregates the endpoints of the KYC form intake flow. It
//! acts as a router, directing incoming HTTP requests to the handler logic
//! defined in its sub-modules.
//!
//! ## Sub-modules:
//! - `intake`: reads the multipart stream and commits uploaded files to the
//!   uploads directory before any validation runs.
//! - `submit`: the submission pipeline — validates the fields, builds the
//!   profile record, and persists it.
//! - `list`: bulk read-back of every persisted profile.

pub mod intake;
mod list;
mod submit;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// Public path prefix under which stored files are served back. Every
/// persisted document's `file_path` starts with it.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Configures and returns the Actix `Scope` for the form intake routes.
///
/// # Registered Routes:
///
/// *   **`POST /submit`**:
///     - **Handler**: `submit::process`
///     - **Description**: Accepts a multipart form with the applicant's
///       text fields plus up to ten files under the `documents` field,
///       validates the minimum-age rule, and persists the profile together
///       with its document descriptors. Returns the persisted profile.
///
/// *   **`GET /getFormData`**:
///     - **Handler**: `list::process`
///     - **Description**: Returns every persisted profile, unfiltered and
///       unpaginated, with documents in upload order.
pub fn configure_routes() -> Scope {
    scope("")
        .route("/submit", post().to(submit::process))
        .route("/getFormData", get().to(list::process))
}
