pub mod form;
pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::services::ServeDir;

use crate::applications::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(form::form_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/apply",
            get(handlers::handle_list)
                .post(handlers::handle_submit)
                .layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        );

    // Local variant only: resumes are served straight from the staging directory.
    if let Some(dir) = state.store.public_dir() {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    router.with_state(state)
}
