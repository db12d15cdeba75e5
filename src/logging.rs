//! Middleware for logging requests and responses.

use std::time::Instant;

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of characters of a response body to log at the `debug` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// The method, path, status and elapsed time are logged at the `info` level.
/// The response body is logged at the `debug` level, truncated to
/// [LOG_BODY_LENGTH_LIMIT] characters.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    tracing::info!("Received request: {method} {uri}");

    let response = next.run(request).await;
    let elapsed = start.elapsed();
    let (parts, body) = response.into_parts();

    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read response body for {method} {uri}: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tracing::info!(
        "Sending response: {method} {uri} {} in {elapsed:?}",
        parts.status
    );
    log_body(&String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

fn log_body(body: &str) {
    let truncated = truncate(body, LOG_BODY_LENGTH_LIMIT);

    if truncated.len() < body.len() {
        tracing::debug!("Response body: {truncated}...");
    } else {
        tracing::debug!("Response body: {body}");
    }
}

/// The first `max_chars` characters of `text`.
fn truncate(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(end, _)| &text[..end])
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::get};
    use axum_test::TestServer;

    use super::{logging_middleware, truncate};

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("₹₹₹₹", 2), "₹₹");
        assert_eq!(truncate("short", 64), "short");
        assert_eq!(truncate("", 3), "");
    }

    #[tokio::test]
    async fn passes_response_through_unchanged() {
        let body = "a".repeat(200);
        let handler_body = body.clone();
        let app = Router::new()
            .route("/", get(move || async move { handler_body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app);

        let response = server.get("/").await;

        response.assert_status_ok();
        response.assert_text(body);
    }
}
