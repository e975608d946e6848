use axum::response::Html;

const FORM_PAGE: &str = include_str!("../../static/index.html");

/// GET /
/// Browser rendition of the application form; posts to `/apply`.
pub async fn form_handler() -> Html<&'static str> {
    Html(FORM_PAGE)
}
