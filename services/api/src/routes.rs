use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use credence::credibility::{credibility_router, CredibilityService, WorkRecordStore};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_credibility_routes<S>(service: Arc<CredibilityService<S>>) -> axum::Router
where
    S: WorkRecordStore + 'static,
{
    credibility_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::seed_demo_store;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let store = Arc::new(seed_demo_store().expect("seeds"));
        with_credibility_routes(Arc::new(CredibilityService::new(store)))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn health_route_is_mounted_next_to_scoring_routes() {
        let response = app()
            .oneshot(
                Request::get("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn decision_then_recalculation_round_trip() {
        let router = app();

        let decision = router
            .clone()
            .oneshot(
                Request::post("/api/v1/work-history/wh-001/decision")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "approved": true, "quality_rating": 5 }).to_string(),
                    ))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(decision.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::post("/functions/v1/calculate-credibility")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "work_history_id": "wh-001" }).to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
        // on time, 5 stars, complexity 4, one project: 30 + 35 + 8.25 + 16
        assert_eq!(payload["overall_score"], 89.25);
    }
}
