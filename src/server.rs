//! HTTP routing.

use crate::error::ServiceError;
use crate::service::GraphQLService;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEPTH_HEADER: &str = "x-graphql-depth";

#[derive(Clone)]
struct AppState {
    service: Arc<GraphQLService>,
}

/// Build the router serving the GraphQL endpoint and `/health`.
pub fn router(service: Arc<GraphQLService>) -> Router {
    let graphql_path = service.settings().graphql_path.clone();

    Router::new()
        .route(&graphql_path, post(graphql_handler))
        .route("/health", get(health_handler))
        .with_state(AppState { service })
        .layer(TraceLayer::new_for_http())
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("GraphQL endpoint listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let result = state.service.handle(&body, &correlation_id).await;
    let status = StatusCode::from_u16(result.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response = (status, Json(result.body)).into_response();
    if state.service.settings().debug_headers {
        if let Some(depth) = result.depth {
            response
                .headers_mut()
                .insert(HeaderName::from_static(DEPTH_HEADER), HeaderValue::from(depth));
        }
    }
    response
}

async fn health_handler(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "healthy",
        "stats": state.service.stats(),
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsConfig;
    use crate::service::tests::StubExecutor;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_router(settings: SettingsConfig) -> Router {
        let service = GraphQLService::new(settings, Arc::new(StubExecutor::new()));
        router(Arc::new(service))
    }

    fn graphql_request(query: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "query": query }).to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_depth_limit_returns_ok_status_with_errors() {
        let response = test_router(SettingsConfig::default())
            .oneshot(graphql_request("{ a { b { c { d { e { f } } } } } }"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["data"].is_null());
        assert_eq!(body["errors"][0]["type"], "DepthLimitExceeded");
        assert_eq!(
            body["errors"][0]["message"],
            "exceeds maximum operation depth of 5"
        );
    }

    #[tokio::test]
    async fn test_accepted_query_forwards_result() {
        let response = test_router(SettingsConfig::default())
            .oneshot(graphql_request("{ a { b { c { d { e } } } } }"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-graphql-depth").is_none());
        let body = body_json(response).await;
        assert_eq!(body["data"]["echo"], "{ a { b { c { d { e } } } } }");
    }

    #[tokio::test]
    async fn test_debug_depth_header() {
        let settings = SettingsConfig {
            debug_headers: true,
            ..SettingsConfig::default()
        };
        let response = test_router(settings)
            .oneshot(graphql_request("{ a { b { c } } x { y } }"))
            .await
            .unwrap();

        assert_eq!(response.headers()["x-graphql-depth"], "3");
    }

    #[tokio::test]
    async fn test_invalid_body_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .body(Body::from("not json"))
            .unwrap();

        let response = test_router(SettingsConfig::default())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["type"], "InvalidRequest");
    }

    #[tokio::test]
    async fn test_custom_graphql_path() {
        let settings = SettingsConfig {
            graphql_path: "/api/graphql".to_string(),
            ..SettingsConfig::default()
        };
        let request = Request::builder()
            .method("POST")
            .uri("/api/graphql")
            .body(Body::from(json!({ "query": "{ users { id } }" }).to_string()))
            .unwrap();

        let response = test_router(settings).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = test_router(SettingsConfig::default())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["stats"]["requests_total"], 0);
    }
}
