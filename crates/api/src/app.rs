use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_admin, trace_id};
use crate::routes::{analytics, health, meta};
use domain::services::{AnalyticsStore, Clock, ReportEngine};

#[derive(Clone)]
pub struct AppState {
    pub engine: ReportEngine,
    pub store: Arc<dyn AnalyticsStore>,
    pub config: Arc<Config>,
}

pub fn create_app(config: Config, store: Arc<dyn AnalyticsStore>, clock: Arc<dyn Clock>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        engine: ReportEngine::new(store.clone(), clock),
        store,
        config: config.clone(),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Admin analytics routes (require an admin JWT)
    let admin_routes = Router::new().nest(
        "/api/v1/analytics",
        analytics::router().route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        )),
    );

    // Unversioned dashboard for older admin clients
    let legacy_routes = if config.analytics.legacy_routes {
        Router::new().nest(
            "/api/analytics",
            analytics::legacy_router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin,
            )),
        )
    } else {
        Router::new()
    };

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/", get(meta::welcome))
        .route(meta::DOCS_PATH, get(meta::api_docs))
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(legacy_routes)
        .fallback(meta::not_found)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
