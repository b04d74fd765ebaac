//! Liveness endpoint
//!
//! Answers probes on `/` with a fixed body. It shares nothing with the
//! signaller loop, so it stays up even while a cycle is blocked.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Body returned by the liveness endpoint
pub const LIVENESS_BODY: &str = "ok";

/// Router serving the liveness probe
pub fn liveness_router() -> Router {
    Router::new()
        .route("/", get(liveness))
        .layer(TraceLayer::new_for_http())
}

async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, LIVENESS_BODY)
}

/// Bind `addr` and serve the liveness router until the task is dropped
pub async fn serve_liveness(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Liveness endpoint listening on {}", listener.local_addr()?);
    axum::serve(listener, liveness_router()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_root_returns_ok() {
        let response = liveness_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], LIVENESS_BODY.as_bytes());
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = liveness_router()
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
