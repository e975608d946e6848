use std::path::PathBuf;
use std::sync::Arc;

use crate::applications::repository::ApplicationRepository;
use crate::applications::storage::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ApplicationRepository>,
    /// Local or S3, chosen from `STORAGE_BACKEND` at startup.
    pub store: Arc<dyn ResumeStore>,
    /// Staging directory the File Receiver writes into.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}
