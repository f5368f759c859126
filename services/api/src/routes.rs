use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use club_licensing::workflows::licensing::{
    licensing_router, LicensingReviewService, LicensingStore, ReviewerDirectory,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_licensing_routes<S, D>(service: Arc<LicensingReviewService<S, D>>) -> axum::Router
where
    S: LicensingStore + 'static,
    D: ReviewerDirectory + 'static,
{
    licensing_router(service)
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
    use crate::infra::{seed_demo_store, InMemoryLicensingStore, InMemoryReviewerDirectory};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use club_licensing::workflows::licensing::DecisionConfig;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let store = Arc::new(InMemoryLicensingStore::default());
        let directory = Arc::new(InMemoryReviewerDirectory::default());
        let submitted = NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date");
        seed_demo_store(&store, &directory, submitted, 3).expect("seed");
        let service = Arc::new(LicensingReviewService::new(
            store,
            directory,
            DecisionConfig::default(),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_licensing_routes(service).layer(Extension(state))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
            .await
            .expect("body");
        let value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let (status, body) = get(app(false), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let (status, body) = get(app(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        let (status, _) = get(app(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn licensing_routes_are_mounted() {
        let (status, body) = get(app(true), "/api/v1/licensing/workflow?role=club_admin").await;
        assert_eq!(status, StatusCode::OK);
        let values: Vec<&str> = body
            .as_array()
            .expect("steps")
            .iter()
            .filter_map(|step| step["value"].as_str())
            .collect();
        assert_eq!(values, vec!["submitted", "review"]);

        let (status, _) = get(app(true), "/api/v1/licensing/criteria/100/progress").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(
            app(true),
            "/api/v1/licensing/workflow/2/statuses?role=club_admin&lang=kk",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["title"], "Бастапқы тексеру");
        assert_eq!(body[2]["position"], "last");

        let (status, body) = get(app(true), "/api/v1/licensing/certificates/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["club_full_name_en"], "FC Kairat");
        assert_eq!(body["license_end_at"], "31/12/2025");
    }
}
