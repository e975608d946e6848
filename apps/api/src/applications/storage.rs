//! Resume stores — where a staged resume goes once the submission is valid.
//!
//! `LocalResumeStore` keeps the staged file in place and reports its path.
//! `S3ResumeStore` streams it to a bucket and reports a public URL.
//! `AppState` holds an `Arc<dyn ResumeStore>` picked at startup from config.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::applications::receiver::StagedFile;
use crate::config::S3Config;
use crate::errors::AppError;

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Makes the staged file durable and returns the reference to persist.
    async fn store(&self, staged: &StagedFile) -> Result<String, AppError>;

    /// Directory to expose under `/uploads`, if resumes are served locally.
    fn public_dir(&self) -> Option<&Path>;

    /// "local" | "s3" — for logs.
    fn backend(&self) -> &'static str;
}

pub struct LocalResumeStore {
    dir: PathBuf,
}

impl LocalResumeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ResumeStore for LocalResumeStore {
    async fn store(&self, staged: &StagedFile) -> Result<String, AppError> {
        Ok(staged.path.to_string_lossy().into_owned())
    }

    fn public_dir(&self) -> Option<&Path> {
        Some(&self.dir)
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

pub struct S3ResumeStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: String,
}

impl S3ResumeStore {
    pub fn new(client: aws_sdk_s3::Client, config: &S3Config) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.clone(),
        }
    }
}

#[async_trait]
impl ResumeStore for S3ResumeStore {
    async fn store(&self, staged: &StagedFile) -> Result<String, AppError> {
        let body = ByteStream::from_path(&staged.path).await.map_err(|e| {
            AppError::Storage(format!("Could not open {}: {e}", staged.path.display()))
        })?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&staged.key)
            .body(body);
        if let Some(content_type) = &staged.content_type {
            request = request.content_type(content_type);
        }
        if let Some(disposition) = staged.original_name.as_deref().and_then(content_disposition) {
            request = request.content_disposition(disposition);
        }
        request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload of {} failed: {e}", staged.key)))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, staged.key);

        // The bucket copy is authoritative from here on.
        staged.discard().await;

        Ok(public_url(&self.endpoint, &self.bucket, &staged.key))
    }

    fn public_dir(&self) -> Option<&Path> {
        None
    }

    fn backend(&self) -> &'static str {
        "s3"
    }
}

/// Path-style object URL: `{endpoint}/{bucket}/{key}`.
pub fn public_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        endpoint.trim_end_matches('/'),
        bucket.trim_matches('/'),
        key.trim_start_matches('/')
    )
}

/// `attachment; filename="..."` for the applicant's file name. Characters that
/// cannot appear in a quoted header value are dropped.
fn content_disposition(original_name: &str) -> Option<String> {
    let name: String = original_name
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && !matches!(*c, '"' | '\\'))
        .collect();
    let name = name.trim();
    (!name.is_empty()).then(|| format!("attachment; filename=\"{name}\""))
}

#[cfg(test)]
pub mod testing {
    use std::sync::{Arc, Mutex};

    use aws_sdk_s3::config::retry::RetryConfig;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region, RequestChecksumCalculation};
    use axum::body::Bytes;
    use axum::extract::{Path, State};
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::put;
    use axum::Router;

    use crate::config::S3Config;

    pub const BUCKET: &str = "resumes";

    /// One `PUT /{bucket}/{key}` as the bucket saw it.
    #[derive(Debug, Clone)]
    pub struct UploadedObject {
        pub bucket: String,
        pub key: String,
        pub content_type: Option<String>,
        pub content_disposition: Option<String>,
        pub body: Vec<u8>,
    }

    #[derive(Clone)]
    struct FakeBucket {
        status: StatusCode,
        uploads: Arc<Mutex<Vec<UploadedObject>>>,
    }

    /// Path-style S3 endpoint on an ephemeral port. Every upload is recorded
    /// and answered with `status`.
    pub struct FakeS3 {
        pub endpoint: String,
        uploads: Arc<Mutex<Vec<UploadedObject>>>,
    }

    impl FakeS3 {
        pub async fn spawn(status: StatusCode) -> Self {
            let uploads = Arc::new(Mutex::new(Vec::new()));
            let router = Router::new()
                .route("/:bucket/:key", put(put_object))
                .with_state(FakeBucket {
                    status,
                    uploads: uploads.clone(),
                });
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, router).await.unwrap();
            });
            Self {
                endpoint: format!("http://{addr}"),
                uploads,
            }
        }

        pub fn uploads(&self) -> Vec<UploadedObject> {
            self.uploads.lock().unwrap().clone()
        }

        pub fn config(&self) -> S3Config {
            S3Config {
                region: "us-east-1".into(),
                access_key_id: "test-key".into(),
                secret_access_key: "test-secret".into(),
                bucket: BUCKET.into(),
                endpoint: self.endpoint.clone(),
            }
        }

        /// Client addressed like production: path-style, plain request bodies.
        pub fn client(&self) -> aws_sdk_s3::Client {
            let config = aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new("us-east-1"))
                .credentials_provider(Credentials::new(
                    "test-key",
                    "test-secret",
                    None,
                    None,
                    "fake-s3",
                ))
                .endpoint_url(&self.endpoint)
                .force_path_style(true)
                .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
                .retry_config(RetryConfig::disabled())
                .build();
            aws_sdk_s3::Client::from_conf(config)
        }
    }

    async fn put_object(
        State(bucket): State<FakeBucket>,
        Path((name, key)): Path<(String, String)>,
        headers: HeaderMap,
        body: Bytes,
    ) -> StatusCode {
        let header_text = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        bucket.uploads.lock().unwrap().push(UploadedObject {
            bucket: name,
            key,
            content_type: header_text(header::CONTENT_TYPE),
            content_disposition: header_text(header::CONTENT_DISPOSITION),
            body: body.to_vec(),
        });
        bucket.status
    }
}
