use serde::{Deserialize, Serialize};

/// MIME types a document may declare. The database schema enforces this
/// set at insert time; anything else fails the whole submission.
pub const ALLOWED_FILE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

/// One uploaded identity document, embedded in its owning `Profile`.
///
/// Created once at submission time from the stored upload and immutable
/// afterwards. `file_path` is the public retrieval path, always the
/// `/uploads/` prefix followed by the generated storage filename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Original client-supplied filename.
    pub file_name: String,
    /// Declared MIME type, one of `ALLOWED_FILE_TYPES`.
    pub file_type: String,
    /// Server-relative path the file is served back under.
    pub file_path: String,
}
