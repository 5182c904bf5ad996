//! HTTP routes.
//!
//! | Method/Path | Input | Output |
//! |---|---|---|
//! | POST /track | `{"trackingNumber"}` | tracking payload |
//! | GET /tariff/{country} | path | tariff payload |
//! | GET /discounts | | discounts payload |
//! | POST /kb | `{"question"}` | kb payload |
//! | GET /healthcheck | | `{"status": "ok"}` |
//! | GET /cache/stats | | entry counts per category |

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use parcelscope_core::ResponsePayload;
use parcelscope_core::cache::CacheStats;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::service::QueryService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackRequest {
    #[serde(default)]
    tracking_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KbRequest {
    #[serde(default)]
    question: Option<String>,
}

/// Build the router over a shared [`QueryService`].
pub fn make_router(service: Arc<QueryService>) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/track", post(track))
        .route("/tariff/{country}", get(tariff))
        .route("/discounts", get(discounts))
        .route("/kb", post(kb))
        .route("/cache/stats", get(cache_stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn track(
    State(service): State<Arc<QueryService>>, body: Result<Json<TrackRequest>, JsonRejection>,
) -> Result<Json<ResponsePayload>, ApiError> {
    let Json(request) = body?;
    let tracking_number = request.tracking_number.unwrap_or_default();
    Ok(Json(service.track(&tracking_number).await?))
}

async fn tariff(
    State(service): State<Arc<QueryService>>, Path(country): Path<String>,
) -> Result<Json<ResponsePayload>, ApiError> {
    Ok(Json(service.tariff(&country).await?))
}

async fn discounts(State(service): State<Arc<QueryService>>) -> Json<ResponsePayload> {
    Json(service.discounts().await)
}

async fn kb(
    State(service): State<Arc<QueryService>>, body: Result<Json<KbRequest>, JsonRejection>,
) -> Result<Json<ResponsePayload>, ApiError> {
    let Json(request) = body?;
    let question = request.question.unwrap_or_default();
    Ok(Json(service.kb(&question)?))
}

async fn cache_stats(State(service): State<Arc<QueryService>>) -> Json<CacheStats> {
    Json(service.stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::service;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use parcelscope_core::kb::NO_ANSWER;
    use tower::ServiceExt;

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_track_then_cached() {
        let (service, fetcher) = service();
        let router = make_router(service);

        let (status, first) = send(&router, post_json("/track", r#"{"trackingNumber":"LX123"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["type"], "tracking");
        assert_eq!(first["trackingNumber"], "LX123");

        let (_, second) = send(&router, post_json("/track", r#"{"trackingNumber":"LX123"}"#)).await;
        assert_eq!(first, second);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_track_missing_number() {
        let (service, fetcher) = service();
        let router = make_router(service);

        let (status, body) = send(&router, post_json("/track", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "trackingNumber is required");
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_track_malformed_body() {
        let (service, _) = service();
        let router = make_router(service);

        let (status, body) = send(&router, post_json("/track", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_tariff_route() {
        let (service, _) = service();
        let router = make_router(service);

        let (status, body) = send(&router, get_req("/tariff/hk")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "type": "tariff", "country": "hk", "info": "hk rates #1" }));
    }

    #[tokio::test]
    async fn test_discounts_route() {
        let (service, _) = service();
        let router = make_router(service);

        let (status, body) = send(&router, get_req("/discounts")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "type": "discounts", "offers": ["US: 1%"] }));
    }

    #[tokio::test]
    async fn test_kb_route() {
        let (service, fetcher) = service();
        let router = make_router(service);

        let (status, body) = send(&router, post_json("/kb", r#"{"question":"Does my parcel have insurance?"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "kb");
        assert!(body["answer"].as_str().unwrap().contains("insured"));

        let (_, body) = send(&router, post_json("/kb", r#"{"question":"Is it raining?"}"#)).await;
        assert_eq!(body["answer"], NO_ANSWER);

        let (status, _) = send(&router, post_json("/kb", r#"{"question":""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_healthcheck_and_stats() {
        let (service, _) = service();
        let router = make_router(service);

        let (status, body) = send(&router, get_req("/healthcheck")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        send(&router, get_req("/discounts")).await;
        let (_, stats) = send(&router, get_req("/cache/stats")).await;
        assert_eq!(stats["discounts"], json!({ "entries": 1, "fresh": 1 }));
        assert_eq!(stats["tracking"]["entries"], 0);
    }

    #[tokio::test]
    async fn test_cors_headers_present() {
        let (service, _) = service();
        let router = make_router(service);

        let request = Request::builder()
            .uri("/discounts")
            .header(header::ORIGIN, "https://shop.example.com")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
