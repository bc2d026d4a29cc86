use axum::http::StatusCode;
use axum::response::IntoResponse;
use routier::{Next, RequestHandler};

/// Logs every request passing through the controller, with the response
/// status once the rest of the chain has answered.
pub fn request_logging() -> RequestHandler {
    RequestHandler::from_fn(|request, next: Next| async move {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let response = next.run(request).await;
        tracing::info!("{method} {path} -> {}", response.status());
        response
    })
}

/// Rejects requests without an `x-api-key` header before they reach the
/// handler.
pub fn require_api_key() -> RequestHandler {
    RequestHandler::from_fn(|request, next: Next| async move {
        if request.headers().get("x-api-key").is_none() {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        next.run(request).await
    })
}
