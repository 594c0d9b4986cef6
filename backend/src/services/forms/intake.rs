//! File intake: drains the multipart stream, committing uploaded files to
//! the uploads directory and collecting the text fields.
//!
//! Files hit disk *before* the submission is validated; when a later step
//! rejects the submission, the caller is expected to discard the stored
//! files again via `discard_files`.

use crate::error::SubmitError;
use actix_multipart::Multipart;
use futures_util::StreamExt;
use log::warn;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Field name under which clients send their uploaded files.
pub const FILE_FIELD: &str = "documents";

/// Upper bound on files accepted per submission.
pub const MAX_FILES: usize = 10;

/// One uploaded file already committed to the uploads directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Filename as supplied by the client.
    pub original_name: String,
    /// MIME type declared for the part.
    pub mime_type: String,
    /// Generated storage filename, unique across concurrent requests.
    pub stored_name: String,
}

impl StoredFile {
    pub fn disk_path(&self, uploads_dir: &Path) -> PathBuf {
        uploads_dir.join(&self.stored_name)
    }
}

/// The raw submission as read off the wire.
pub struct RawSubmission {
    pub fields: HashMap<String, String>,
    pub files: Vec<StoredFile>,
}

/// Reads the whole multipart payload. Text parts land in the field map;
/// every part named `documents` is streamed to disk under
/// `<unix-millis>-<original-filename>`, order preserved.
///
/// On failure, files already written by this request are removed again
/// before the error is returned.
pub async fn read_submission(
    payload: Multipart,
    uploads_dir: &Path,
) -> Result<RawSubmission, SubmitError> {
    let mut files = Vec::new();
    match drain_parts(payload, uploads_dir, &mut files).await {
        Ok(fields) => Ok(RawSubmission { fields, files }),
        Err(e) => {
            discard_files(&files, uploads_dir);
            Err(e)
        }
    }
}

async fn drain_parts(
    mut payload: Multipart,
    uploads_dir: &Path,
    files: &mut Vec<StoredFile>,
) -> Result<HashMap<String, String>, SubmitError> {
    let mut fields = HashMap::new();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = match field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()))
        {
            Some(name) => name,
            None => continue,
        };

        if name == FILE_FIELD {
            if files.len() == MAX_FILES {
                return Err(SubmitError::MalformedInput(format!(
                    "At most {MAX_FILES} documents are allowed"
                )));
            }

            let original_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                .unwrap_or_default();
            let mime_type = field
                .content_type()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let stored_name = format!("{}-{}", unix_millis(), original_name);

            let file = File::create(uploads_dir.join(&stored_name))?;
            let mut writer = BufWriter::new(file);
            while let Some(chunk) = field.next().await {
                writer.write_all(&chunk?)?;
            }
            writer.flush()?;

            files.push(StoredFile {
                original_name,
                mime_type,
                stored_name,
            });
        } else {
            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                bytes.extend_from_slice(&chunk?);
            }
            let value = String::from_utf8(bytes).map_err(|_| {
                SubmitError::MalformedInput(format!("Field `{name}` is not valid UTF-8"))
            })?;
            fields.insert(name, value);
        }
    }

    Ok(fields)
}

/// Best-effort removal of this request's stored files after a failed
/// submission, so rejected uploads do not accumulate on disk.
pub fn discard_files(files: &[StoredFile], uploads_dir: &Path) {
    for file in files {
        let path = file.disk_path(uploads_dir);
        if let Err(e) = std::fs::remove_file(&path) {
            warn!("could not remove rejected upload {}: {}", path.display(), e);
        }
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
