//! Public service metadata: welcome payload, endpoint listing and the JSON
//! 404 fallback.

use axum::{
    http::{Method, Uri},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;

pub const API_VERSION: &str = "1.0.0";
pub const DOCS_PATH: &str = "/api/v1/docs";

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub success: bool,
    pub message: String,
    pub version: String,
    pub documentation: String,
}

pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        success: true,
        message: "Welcome to Shopdesk API".to_string(),
        version: API_VERSION.to_string(),
        documentation: DOCS_PATH.to_string(),
    })
}

/// Lists the routes this service exposes.
pub async fn api_docs() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "API Documentation",
        "endpoints": {
            "analytics": {
                "dashboard": {
                    "method": "GET",
                    "path": "/api/v1/analytics/dashboard",
                    "query": ["range", "startDate", "endDate"],
                    "protected": true
                },
                "salesReport": {
                    "method": "GET",
                    "path": "/api/v1/analytics/sales-report",
                    "query": ["startDate", "endDate"],
                    "protected": true
                },
                "users": {
                    "method": "GET",
                    "path": "/api/v1/analytics/users",
                    "query": ["days"],
                    "protected": true
                },
                "products": {
                    "method": "GET",
                    "path": "/api/v1/analytics/products",
                    "query": ["limit"],
                    "protected": true
                }
            },
            "health": {
                "health": { "method": "GET", "path": "/api/health" },
                "live": { "method": "GET", "path": "/api/health/live" },
                "ready": { "method": "GET", "path": "/api/health/ready" }
            },
            "metrics": { "method": "GET", "path": "/metrics" }
        }
    }))
}

/// Fallback for unmatched routes.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Cannot {} {}", method, uri))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[tokio::test]
    async fn test_welcome_points_at_docs() {
        let Json(body) = welcome().await;
        assert!(body.success);
        assert_eq!(body.version, API_VERSION);
        assert_eq!(body.documentation, DOCS_PATH);
    }

    #[tokio::test]
    async fn test_docs_lists_analytics_routes() {
        let Json(body) = api_docs().await;
        assert_eq!(
            body["endpoints"]["analytics"]["salesReport"]["path"],
            "/api/v1/analytics/sales-report"
        );
    }

    #[tokio::test]
    async fn test_not_found_message_includes_method_and_path() {
        let uri: Uri = "/api/v1/nope?x=1".parse().unwrap();
        let err = not_found(Method::POST, uri).await;
        match &err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Cannot POST /api/v1/nope?x=1"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
