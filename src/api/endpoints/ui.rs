//! Single-page UI served at `/`.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../../resources/index.html");

/// `GET /`: login, patient forms, predictions and chatbot in one page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
