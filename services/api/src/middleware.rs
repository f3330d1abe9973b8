//! Request logging middleware

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::info;

/// Log every request with its origin and user agent, then its outcome
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let headers = req.headers();
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("native app")
        .to_string();
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    info!(%method, %uri, %origin, %user_agent, "request");

    let response = next.run(req).await;

    info!(%method, %uri, status = response.status().as_u16(), "response");

    response
}
