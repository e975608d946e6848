use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted job application. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    /// Local path or object-storage URL of the uploaded resume.
    pub resume: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new application record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub full_name: String,
    pub email: String,
    pub resume: String,
}

impl NewApplication {
    /// Assigns identity and creation time.
    pub fn into_application(self) -> Application {
        Application {
            id: Uuid::new_v4(),
            full_name: self.full_name,
            email: self.email,
            resume: self.resume,
            created_at: Utc::now(),
        }
    }
}
