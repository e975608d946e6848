use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::application::{Application, NewApplication};

/// Storage abstraction for application records. Records are insert-only.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create(&self, new: NewApplication) -> Result<Application, AppError>;

    /// Every record, in whatever order the store yields them.
    async fn list(&self) -> Result<Vec<Application>, AppError>;
}

pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn create(&self, new: NewApplication) -> Result<Application, AppError> {
        let draft = new.into_application();
        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (id, full_name, email, resume, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, full_name, email, resume, created_at
            "#,
        )
        .bind(draft.id)
        .bind(&draft.full_name)
        .bind(&draft.email)
        .bind(&draft.resume)
        .bind(draft.created_at)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted application {}", application.id);
        Ok(application)
    }

    async fn list(&self) -> Result<Vec<Application>, AppError> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT id, full_name, email, resume, created_at FROM applications",
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
