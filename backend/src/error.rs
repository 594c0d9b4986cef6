//! Failure taxonomy for the submission pipeline.
//!
//! Handlers convert these into HTTP responses at the request boundary:
//! `Validation` and `MalformedInput` are client errors (400), everything
//! else is a server error (500). Nothing here panics the process and no
//! failure is retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmitError {
    /// A business rule rejected the submission. The message is shown to
    /// the client verbatim.
    #[error("{0}")]
    Validation(String),

    /// A field was missing, not valid UTF-8, or failed to parse.
    #[error("{0}")]
    MalformedInput(String),

    /// The record store refused or failed the operation, including schema
    /// violations such as a disallowed document MIME type.
    #[error("database error: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// Reading the upload stream off the wire failed.
    #[error("multipart error: {0}")]
    Multipart(#[from] actix_multipart::MultipartError),

    /// Writing an uploaded file to disk failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A prior panic poisoned the connection lock.
    #[error("database connection lock poisoned")]
    LockPoisoned,
}

impl SubmitError {
    /// True for failures the client can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SubmitError::Validation(_) | SubmitError::MalformedInput(_)
        )
    }
}
