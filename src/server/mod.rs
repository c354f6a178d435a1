//! HTTP proxy in front of the upstream image generator.
//!
//! Routes:
//! - `POST /generate`: fan out `count` upstream calls, answer once all settle
//! - `GET /health`: liveness
//! - `GET /test-api`: configuration diagnostic, no upstream call
//!
//! CORS is permissive; preflight `OPTIONS` is answered by the CORS layer.

mod error;
mod handlers;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::batch::BatchGenerator;
use crate::error::ImageError;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Batch orchestrator over the upstream generator.
    pub batch: Arc<BatchGenerator>,
    /// Upstream model name, reported by `/test-api`.
    pub model: Arc<str>,
    /// Largest `count` accepted per request.
    pub max_count: usize,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS]);

    Router::new()
        .route("/generate", post(handlers::generate).fallback(handlers::method_not_allowed))
        .route("/health", get(handlers::health))
        .route("/test-api", get(handlers::test_api))
        .fallback(handlers::not_found)
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), ImageError> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    serve_until(state, listener, shutdown_signal()).await
}

async fn serve_until(
    state: AppState,
    listener: TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ImageError> {
    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown).await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::test_support::FakeGenerator;

    fn app(fake: Arc<FakeGenerator>) -> Router {
        router(AppState {
            batch: Arc::new(BatchGenerator::new(fake)),
            model: Arc::from("gemini-test"),
            max_count: 4,
        })
    }

    fn post_generate(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/generate")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn generate_returns_data_uris() {
        let fake = Arc::new(FakeGenerator::new(2, &[]));
        let response = app(fake.clone())
            .oneshot(post_generate(r#"{"prompt":"a fox","width":672,"height":384,"count":2}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let body = json_body(response).await;
        let images = body["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        // "a fox" base64-encoded, MIME carries the requested size
        assert_eq!(images[0], "data:image/png;w=672;h=384;base64,YSBmb3g=");
        assert!(body.get("failures").is_none());
        assert_eq!(fake.calls(), 2);
    }

    #[tokio::test]
    async fn generate_defaults_to_one_square_image() {
        let fake = Arc::new(FakeGenerator::new(1, &[]));
        let response = app(fake.clone()).oneshot(post_generate(r#"{"prompt":"a fox"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["images"][0], "data:image/png;w=512;h=512;base64,YSBmb3g=");
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn partial_failure_reports_failed_slots() {
        let fake = Arc::new(FakeGenerator::new(3, &[1]));
        let response =
            app(fake).oneshot(post_generate(r#"{"prompt":"a fox","count":3}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["images"].as_array().unwrap().len(), 2);
        assert_eq!(body["failures"], json!([{"index": 1, "message": "no image for slot 1"}]));
    }

    #[tokio::test]
    async fn total_failure_is_a_server_error() {
        let fake = Arc::new(FakeGenerator::new(2, &[0, 1]));
        let response =
            app(fake).oneshot(post_generate(r#"{"prompt":"a fox","count":2}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Failed to generate image", "details": "no image for slot 0"})
        );
    }

    #[tokio::test]
    async fn missing_prompt_makes_no_upstream_calls() {
        let fake = Arc::new(FakeGenerator::new(1, &[]));
        for body in [r#"{}"#, r#"{"prompt":""}"#, r#"{"prompt":"   ","count":3}"#] {
            let response = app(fake.clone()).oneshot(post_generate(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(response).await, json!({"error": "Prompt is required"}));
        }
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn zero_count_is_empty_success() {
        let fake = Arc::new(FakeGenerator::new(0, &[]));
        let response =
            app(fake.clone()).oneshot(post_generate(r#"{"prompt":"a fox","count":0}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"images": []}));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn oversized_batch_and_zero_size_are_rejected() {
        let fake = Arc::new(FakeGenerator::new(5, &[]));
        for body in [r#"{"prompt":"a fox","count":5}"#, r#"{"prompt":"a fox","width":0}"#] {
            let response = app(fake.clone()).oneshot(post_generate(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let fake = Arc::new(FakeGenerator::new(1, &[]));
        let response = app(fake).oneshot(post_generate("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid request body");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn preflight_is_answered_permissively() {
        let fake = Arc::new(FakeGenerator::new(1, &[]));
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/generate")
            .header("origin", "http://localhost:5500")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app(fake.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        for m in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
            assert!(methods.contains(m), "{m} missing from {methods}");
        }
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn other_methods_on_generate_are_rejected() {
        let fake = Arc::new(FakeGenerator::new(1, &[]));
        let request = Request::builder().method("GET").uri("/generate").body(Body::empty()).unwrap();

        let response = app(fake).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json_body(response).await, json!({"error": "Method not allowed"}));
    }

    #[tokio::test]
    async fn health_and_test_api() {
        let fake = Arc::new(FakeGenerator::new(1, &[]));

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app(fake.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());

        let request = Request::builder().uri("/test-api").body(Body::empty()).unwrap();
        let response = app(fake.clone()).oneshot(request).await.unwrap();
        assert_eq!(
            json_body(response).await,
            json!({"status": "ok", "model": "gemini-test", "api_key_configured": true})
        );
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_server_cleanly() {
        let fake = Arc::new(FakeGenerator::new(1, &[]));
        let state = AppState {
            batch: Arc::new(BatchGenerator::new(fake)),
            model: Arc::from("gemini-test"),
            max_count: 4,
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve_until(state, listener, async {
            let _ = stopped.await;
        }));
        stop.send(()).unwrap();

        let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), server).await;
        assert!(matches!(outcome, Ok(Ok(Ok(())))));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let fake = Arc::new(FakeGenerator::new(1, &[]));
        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let response = app(fake).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
