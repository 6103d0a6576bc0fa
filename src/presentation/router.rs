// Router assembly
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_data, health_check};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the API router, mounted under `base_path` when one is configured
pub fn build_router(state: Arc<AppState>, base_path: &str) -> Router {
    let api = Router::new()
        .route("/healthz", get(health_check))
        .route("/data", get(get_data))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let router = match normalize_base_path(base_path) {
        Some(prefix) => Router::new().nest(&prefix, api),
        None => api,
    };

    router
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// `""`, `"/"` mean the root; otherwise a single leading slash and no trailing one
fn normalize_base_path(base_path: &str) -> Option<String> {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{}", trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::data_store::TemperatureDataStore;
    use crate::presentation::app_state::RequestLimits;
    use crate::test_support::{ManualClock, MockRepository};
    use chrono::{TimeDelta, Utc};
    use reqwest::StatusCode;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            data_store: Arc::new(TemperatureDataStore::new(
                Arc::new(MockRepository::new()),
                Arc::new(ManualClock::new(Utc::now())),
                TimeDelta::days(10),
            )),
            limits: RequestLimits {
                max_range_days: 10,
                max_count: 5000,
                default_count: 500,
                default_range_hours: 48,
            },
        })
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path(""), None);
        assert_eq!(normalize_base_path("/"), None);
        assert_eq!(normalize_base_path("api"), Some("/api".to_string()));
        assert_eq!(normalize_base_path("/temps/api/"), Some("/temps/api".to_string()));
    }

    #[tokio::test]
    async fn test_routes_are_mounted_under_base_path() {
        let base = serve(build_router(state(), "/temps/")).await;
        let client = reqwest::Client::new();

        let response = client.get(format!("{}/temps/healthz", base)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "ok");

        let response = client
            .get(format!("{}/temps/data?min=0&max=10000&count=10", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["actual"]["count"], 10);

        let response = client.get(format!("{}/healthz", base)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_routes_at_root_allow_cross_origin_requests() {
        let base = serve(build_router(state(), "")).await;

        let response = reqwest::Client::new()
            .get(format!("{}/healthz", base))
            .header("Origin", "http://dashboard.example")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
