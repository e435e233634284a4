use crate::core::error::DashboardError;
use axum::{
    http::{HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};

pub async fn fallback_handler(headers: HeaderMap, uri: Uri) -> Response {
    let accepts_html = headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        let html = r#"Nothing to see here. <a href="/">Back to the dashboard</a>"#;

        return (StatusCode::NOT_FOUND, Html(html)).into_response();
    }

    DashboardError::NotFound(uri.path().to_string()).into_response()
}
