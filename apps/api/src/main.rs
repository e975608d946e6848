use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::{Credentials, RequestChecksumCalculation};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use resume_intake::applications::repository::PgApplicationRepository;
use resume_intake::applications::storage::{LocalResumeStore, ResumeStore, S3ResumeStore};
use resume_intake::config::{Config, S3Config, StorageConfig};
use resume_intake::db::create_pool;
use resume_intake::routes::build_router;
use resume_intake::state::AppState;
use resume_intake::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    telemetry::init(&config.rust_log);

    info!("Starting resume intake API v{}", env!("CARGO_PKG_VERSION"));

    // Staging directory must exist before the first upload
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Could not create {}", config.upload_dir.display()))?;

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize resume storage
    let store: Arc<dyn ResumeStore> = match &config.storage {
        StorageConfig::Local => Arc::new(LocalResumeStore::new(&config.upload_dir)),
        StorageConfig::S3(s3_config) => {
            let client = build_s3_client(s3_config).await;
            info!("S3 client initialized (bucket: {})", s3_config.bucket);
            Arc::new(S3ResumeStore::new(client, s3_config))
        }
    };
    info!(
        "Resume storage: {} (staging in {})",
        store.backend(),
        config.upload_dir.display()
    );

    let state = AppState {
        repository: Arc::new(PgApplicationRepository::new(db.clone())),
        store,
        upload_dir: config.upload_dir.clone(),
        max_upload_bytes: config.max_upload_bytes,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Shut down cleanly");

    Ok(())
}

/// Constructs an S3 client for AWS or any S3-compatible endpoint (MinIO, R2).
async fn build_s3_client(config: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "resume-intake-static",
    );

    let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.endpoint)
        .load()
        .await;

    // Path-style addressing keeps object URLs in `{endpoint}/{bucket}/{key}` form.
    // Checksums only where required: some S3-compatible stores reject aws-chunked bodies.
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(true)
        .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
