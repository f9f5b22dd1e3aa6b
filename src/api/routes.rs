//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, clear_all_handler, delete_handler, get_handler, health_handler,
    policies_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Cache a payload for a category and parameters
/// - `POST /get` - Look up a cached payload
/// - `POST /del` - Clear one entry
/// - `DELETE /cache/clear` - Clear every entry in this cache's namespace
/// - `POST /cache/cleanup` - Sweep invalid entries now
/// - `GET /cache/stats` - Tier counts, sizes and hit counters
/// - `GET /cache/policies` - Registered categories
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (the dashboard is served from another port)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/get", post(get_handler))
        .route("/del", post(delete_handler))
        .route("/cache/clear", delete(clear_all_handler))
        .route("/cache/cleanup", post(cleanup_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/policies", get(policies_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CategoryPolicyTable, TieredCacheStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let cache = TieredCacheStore::in_memory(CategoryPolicyTable::default_table());
        create_router(AppState::new(cache))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = create_test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/cache/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_set_endpoint() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/set")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"category":"hero_constants","payload":{"1":"Anti-Mage"}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/get")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"category":"hero_constants"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
