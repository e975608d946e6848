//! File Receiver — consumes the multipart body of `POST /apply`.
//!
//! Text parts are buffered; the `resume` file part is streamed chunk by chunk
//! into the staging directory and flushed before the handler continues.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use bytes::Bytes;
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::errors::AppError;

pub const FULL_NAME_FIELD: &str = "fullName";
pub const EMAIL_FIELD: &str = "email";
pub const RESUME_FIELD: &str = "resume";

/// Upper bound on suffixed names tried when a staged name is already taken.
const MAX_NAME_ATTEMPTS: u32 = 32;

/// A file fully written to the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Location on disk, `{staging dir}/{key}`.
    pub path: PathBuf,
    /// Generated file name; doubles as the object key in the remote variant.
    pub key: String,
    pub original_name: Option<String>,
    pub content_type: Option<String>,
    pub size: u64,
}

impl StagedFile {
    /// Best-effort removal of the staged copy.
    pub async fn discard(&self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!("Removed staged file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove staged file {}: {e}", self.path.display()),
        }
    }
}

/// Everything the multipart body carried, before validation.
#[derive(Debug, Default)]
pub struct ReceivedSubmission {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub resume: Option<StagedFile>,
}

impl ReceivedSubmission {
    pub async fn discard(self) {
        if let Some(staged) = self.resume {
            staged.discard().await;
        }
    }
}

/// Reads every part of the request. A staged file is removed again if the
/// body turns out to be malformed.
pub async fn receive(
    staging_dir: &Path,
    mut multipart: Multipart,
) -> Result<ReceivedSubmission, AppError> {
    let mut received = ReceivedSubmission::default();
    match read_parts(staging_dir, &mut multipart, &mut received).await {
        Ok(()) => Ok(received),
        Err(e) => {
            received.discard().await;
            Err(e)
        }
    }
}

async fn read_parts(
    staging_dir: &Path,
    multipart: &mut Multipart,
    received: &mut ReceivedSubmission,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_owned);

        match (name.as_str(), file_name) {
            // A file input left empty still sends its part, with `filename=""`.
            (_, Some(original)) if original.is_empty() => {
                debug!("Skipping empty file field `{name}`");
            }
            (RESUME_FIELD, Some(original)) => {
                if received.resume.is_some() {
                    return Err(AppError::Validation(
                        "only one `resume` file may be uploaded".to_string(),
                    ));
                }
                let content_type = field.content_type().map(str::to_owned);
                let staged = stage_stream(
                    staging_dir,
                    RESUME_FIELD,
                    Some(original.as_str()),
                    content_type,
                    field,
                )
                .await?;
                received.resume = Some(staged);
            }
            (_, Some(_)) => {
                return Err(AppError::Validation(format!("Unexpected file field `{name}`")));
            }
            (FULL_NAME_FIELD, None) => received.full_name = Some(field.text().await?),
            (EMAIL_FIELD, None) => received.email = Some(field.text().await?),
            _ => debug!("Ignoring multipart field `{name}`"),
        }
    }
    Ok(())
}

/// Writes `stream` to a freshly named file under `staging_dir`.
///
/// The name is `{field}-{unix millis}.{ext}`; when that name already exists a
/// numeric suffix is appended. A partially written file is removed on error.
pub async fn stage_stream<S, E>(
    staging_dir: &Path,
    field: &str,
    original_name: Option<&str>,
    content_type: Option<String>,
    stream: S,
) -> Result<StagedFile, AppError>
where
    S: Stream<Item = Result<Bytes, E>>,
    AppError: From<E>,
{
    let millis = Utc::now().timestamp_millis();
    let (key, mut file) = create_unique(staging_dir, field, original_name, millis).await?;
    let path = staging_dir.join(&key);

    let mut staged = StagedFile {
        path,
        key,
        original_name: original_name.map(str::to_owned),
        content_type,
        size: 0,
    };

    match write_all(&mut file, stream).await {
        Ok(size) => {
            staged.size = size;
            debug!("Staged {} ({size} bytes)", staged.path.display());
            Ok(staged)
        }
        Err(e) => {
            drop(file);
            staged.discard().await;
            Err(e)
        }
    }
}

async fn write_all<S, E>(file: &mut File, stream: S) -> Result<u64, AppError>
where
    S: Stream<Item = Result<Bytes, E>>,
    AppError: From<E>,
{
    tokio::pin!(stream);
    let mut size = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;
    Ok(size)
}

async fn create_unique(
    staging_dir: &Path,
    field: &str,
    original_name: Option<&str>,
    millis: i64,
) -> Result<(String, File), AppError> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let key = staged_file_name(field, original_name, millis, attempt);
        let opened = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(staging_dir.join(&key))
            .await;
        match opened {
            Ok(file) => return Ok((key, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::Storage(format!(
        "no free staging name for `{field}` at {millis} after {MAX_NAME_ATTEMPTS} attempts"
    )))
}

/// `{field}-{millis}[-{attempt}][.{ext}]`
pub fn staged_file_name(
    field: &str,
    original_name: Option<&str>,
    millis: i64,
    attempt: u32,
) -> String {
    let mut name = format!("{field}-{millis}");
    if attempt > 0 {
        name.push_str(&format!("-{attempt}"));
    }
    if let Some(ext) = original_name.and_then(extension_of) {
        name.push('.');
        name.push_str(&ext);
    }
    name
}

/// Extension of the client's file name, restricted to ASCII alphanumerics so
/// it can never carry a path separator.
fn extension_of(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    let ext: String = ext.chars().filter(char::is_ascii_alphanumeric).collect();
    (!ext.is_empty()).then_some(ext)
}
