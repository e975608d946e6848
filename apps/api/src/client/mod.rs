//! Client Form — the applicant-side half of `POST /apply`.
//!
//! `ApplicationForm` holds the three inputs plus a `SubmissionState`;
//! `ApplyClient` does the multipart request. The `apply` binary drives both.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

/// Where the form posts unless told otherwise.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/apply";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not read resume {path}: {source}")]
    Resume {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// UI state of the form. Each variant carries only what it renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    NotSent,
    Loading,
    Success,
    Err {
        msg: String,
    },
}

impl SubmissionState {
    /// Maps the server's status code to the state the form lands in.
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => SubmissionState::Success,
            400 => SubmissionState::Err {
                msg: "Bad Request".to_string(),
            },
            500 => SubmissionState::Err {
                msg: "Could not apply".to_string(),
            },
            other => SubmissionState::Err {
                msg: format!("Unexpected response ({other})"),
            },
        }
    }

    /// Text shown under the form, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionState::NotSent => None,
            SubmissionState::Loading => Some("Loading..."),
            SubmissionState::Success => Some("Successfully Applied"),
            SubmissionState::Err { msg } => Some(msg.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApplyClient {
    http: Client,
    endpoint: String,
}

impl ApplyClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one multipart submission and returns the response status code.
    pub async fn send(
        &self,
        full_name: &str,
        email: &str,
        resume: &Path,
    ) -> Result<u16, ClientError> {
        let bytes = tokio::fs::read(resume)
            .await
            .map_err(|source| ClientError::Resume {
                path: resume.to_path_buf(),
                source,
            })?;
        let file_name = resume
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());

        let form = Form::new()
            .part("resume", Part::bytes(bytes).file_name(file_name))
            .text("fullName", full_name.to_string())
            .text("email", email.to_string());

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        debug!("POST {} -> {}", self.endpoint, response.status());
        Ok(response.status().as_u16())
    }
}

/// The three form inputs and the state they produced.
#[derive(Debug, Clone, Default)]
pub struct ApplicationForm {
    pub full_name: String,
    pub email: String,
    pub resume: Option<PathBuf>,
    state: SubmissionState,
}

impl ApplicationForm {
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        resume: Option<PathBuf>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            resume,
            state: SubmissionState::NotSent,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Submits the form. Without a resume nothing is sent and the state is
    /// left as it was.
    pub async fn submit(&mut self, client: &ApplyClient) -> &SubmissionState {
        self.submit_with(client, |_| {}).await
    }

    /// Like `submit`, calling `render` after every state change.
    pub async fn submit_with<F>(&mut self, client: &ApplyClient, mut render: F) -> &SubmissionState
    where
        F: FnMut(&SubmissionState),
    {
        let Some(resume) = self.resume.clone() else {
            return &self.state;
        };

        self.state = SubmissionState::Loading;
        render(&self.state);

        self.state = match client.send(&self.full_name, &self.email, &resume).await {
            Ok(status) => SubmissionState::from_status(status),
            Err(e) => {
                warn!("Submission to {} failed: {e}", client.endpoint());
                SubmissionState::Err {
                    msg: "Could not apply".to_string(),
                }
            }
        };
        render(&self.state);

        &self.state
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::applications::repository::testing::{
        InMemoryApplicationRepository, UnavailableRepository,
    };
    use crate::applications::repository::ApplicationRepository;
    use crate::applications::storage::LocalResumeStore;
    use crate::routes::build_router;
    use crate::state::AppState;

    /// Serves the real router on an ephemeral port; returns its base URL.
    async fn spawn_server(repository: Arc<dyn ApplicationRepository>, dir: &Path) -> String {
        let router = build_router(AppState {
            repository,
            store: Arc::new(LocalResumeStore::new(dir)),
            upload_dir: dir.to_path_buf(),
            max_upload_bytes: 1024 * 1024,
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn resume_file(dir: &Path) -> PathBuf {
        let path = dir.join("jane_doe.pdf");
        tokio::fs::write(&path, b"%PDF-1.4 resume").await.unwrap();
        path
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(SubmissionState::from_status(200), SubmissionState::Success);
        assert_eq!(
            SubmissionState::from_status(400),
            SubmissionState::Err {
                msg: "Bad Request".into()
            }
        );
        assert_eq!(
            SubmissionState::from_status(500),
            SubmissionState::Err {
                msg: "Could not apply".into()
            }
        );
        assert_eq!(
            SubmissionState::from_status(404).message(),
            Some("Unexpected response (404)")
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(SubmissionState::NotSent.message(), None);
        assert_eq!(SubmissionState::Loading.message(), Some("Loading..."));
        assert_eq!(SubmissionState::Success.message(), Some("Successfully Applied"));
    }

    #[tokio::test]
    async fn test_submit_without_resume_sends_nothing() {
        let mut form = ApplicationForm::new("Jane Doe", "jane@example.com", None);
        // Nothing listens here; a request would flip the state to Err.
        let client = ApplyClient::new("http://127.0.0.1:9/apply");

        assert_eq!(form.submit(&client).await, &SubmissionState::NotSent);
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let staging = tempfile::tempdir().unwrap();
        let files = tempfile::tempdir().unwrap();
        let repository = Arc::new(InMemoryApplicationRepository::default());
        let base = spawn_server(repository.clone(), staging.path()).await;
        let client = ApplyClient::new(format!("{base}/apply"));

        let mut form = ApplicationForm::new(
            "Jane Doe",
            "jane@example.com",
            Some(resume_file(files.path()).await),
        );

        let mut rendered = Vec::new();
        let state = form
            .submit_with(&client, |state| rendered.push(state.clone()))
            .await;

        assert_eq!(state, &SubmissionState::Success);
        assert_eq!(rendered, vec![SubmissionState::Loading, SubmissionState::Success]);
        assert_eq!(form.state(), &SubmissionState::Success);
        assert_eq!(repository.len(), 1);
        let stored = repository.list().await.unwrap();
        assert_eq!(
            tokio::fs::read(&stored[0].resume).await.unwrap(),
            b"%PDF-1.4 resume"
        );
    }

    #[tokio::test]
    async fn test_bad_request_and_server_error() {
        let staging = tempfile::tempdir().unwrap();
        let files = tempfile::tempdir().unwrap();
        let resume = resume_file(files.path()).await;

        let base = spawn_server(
            Arc::new(InMemoryApplicationRepository::default()),
            staging.path(),
        )
        .await;
        let client = ApplyClient::new(format!("{base}/apply"));
        let mut form = ApplicationForm::new("", "jane@example.com", Some(resume.clone()));
        assert_eq!(form.submit(&client).await.message(), Some("Bad Request"));

        let base = spawn_server(Arc::new(UnavailableRepository), staging.path()).await;
        let client = ApplyClient::new(format!("{base}/apply"));
        let mut form = ApplicationForm::new("Jane Doe", "jane@example.com", Some(resume));
        assert_eq!(form.submit(&client).await.message(), Some("Could not apply"));
    }

    #[tokio::test]
    async fn test_unexpected_status_and_unreachable_server() {
        let staging = tempfile::tempdir().unwrap();
        let files = tempfile::tempdir().unwrap();
        let resume = resume_file(files.path()).await;

        let base = spawn_server(
            Arc::new(InMemoryApplicationRepository::default()),
            staging.path(),
        )
        .await;
        let client = ApplyClient::new(format!("{base}/not-here"));
        let mut form = ApplicationForm::new("Jane Doe", "jane@example.com", Some(resume.clone()));
        assert_eq!(
            form.submit(&client).await.message(),
            Some("Unexpected response (404)")
        );

        let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = closed.local_addr().unwrap();
        drop(closed);
        let client = ApplyClient::new(format!("http://{addr}/apply"));
        let mut form = ApplicationForm::new("Jane Doe", "jane@example.com", Some(resume));
        assert_eq!(form.submit(&client).await.message(), Some("Could not apply"));
    }
}
