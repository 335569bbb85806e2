use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/runs/last", get(handlers::last_run))
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use kinoscout_core::{load_config_from_str, RunReport};
    use serde_json::Value;
    use tower::ServiceExt;

    const CONFIG: &str = r#"
[catalog]
url = "https://kinotam.example"
token = "super-secret"
category_id = 91

[tracker_api]
url = "http://127.0.0.1:8443"

[matching]
max_size_gb = 20.0
min_views = 100
good_quality = ["WEB-DL"]
bad_quality = ["CAMRip"]
"#;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(load_config_from_str(CONFIG).unwrap()))
    }

    async fn fetch(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = fetch(create_router(test_state()), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_config_hides_token() {
        let (status, body) = fetch(create_router(test_state()), "/api/v1/config").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("super-secret"));

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["catalog_token_configured"], true);
        assert_eq!(json["category_id"], 91);
    }

    #[tokio::test]
    async fn test_last_run_before_and_after_first_run() {
        let state = test_state();

        let (status, _) = fetch(create_router(state.clone()), "/api/v1/runs/last").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        state
            .record_run(RunReport {
                run_id: Default::default(),
                fresh_films: 4,
                recheck_films: 1,
                outcomes: Vec::new(),
                uploads: Vec::new(),
                duration_ms: 12,
            })
            .await;

        let (status, body) = fetch(create_router(state), "/api/v1/runs/last").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["fresh_films"], 4);
        assert_eq!(json["recheck_films"], 1);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_counts_requests() {
        let state = test_state();
        let (status, _) = fetch(create_router(state.clone()), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = fetch(create_router(state), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("kinoscout_http_requests_total"));
        assert!(body.contains("path=\"/api/v1/health\""));
    }
}
