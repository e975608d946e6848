use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::applications::receiver;
use crate::applications::validation::{validate_submission, ValidSubmission};
use crate::errors::AppError;
use crate::models::application::{Application, NewApplication};
use crate::state::AppState;

/// POST /apply
///
/// receive (stage file) → validate → store resume → persist record.
/// No step is retried; a stored resume whose record fails to persist is left behind.
pub async fn handle_submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Application>, AppError> {
    let received = receiver::receive(&state.upload_dir, multipart).await?;

    let ValidSubmission {
        full_name,
        email,
        resume,
    } = match validate_submission(received) {
        Ok(submission) => submission,
        Err(rejection) => return Err(rejection.discard().await),
    };

    let reference = state.store.store(&resume).await?;

    let application = state
        .repository
        .create(NewApplication {
            full_name,
            email,
            resume: reference,
        })
        .await?;

    info!(
        "Accepted application {} ({} bytes, {} storage)",
        application.id,
        resume.size,
        state.store.backend()
    );
    Ok(Json(application))
}

/// GET /apply
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<Application>>, AppError> {
    let applications = state.repository.list().await?;
    Ok(Json(applications))
}
