use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use insight_core::{Feature, FeatureStatus, InsightService};
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    service: Arc<InsightService>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub segmentation: HealthCheck,
    pub recommendation: HealthCheck,
    pub checked_at: String,
}

pub fn router(service: Arc<InsightService>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { service })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let statuses = state.service.availability();
    let segmentation = feature_check(&statuses, Feature::Segmentation);
    let recommendation = feature_check(&statuses, Feature::Recommendation);
    let ready = segmentation.status == "ready" && recommendation.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "insight-server runtime initialized".to_string(),
        },
        segmentation,
        recommendation,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn feature_check(statuses: &[FeatureStatus], feature: Feature) -> HealthCheck {
    match statuses.iter().find(|status| status.feature == feature) {
        Some(status) if status.ready => {
            HealthCheck { status: "ready", detail: status.detail.clone() }
        }
        Some(status) => HealthCheck { status: "degraded", detail: status.detail.clone() },
        None => HealthCheck { status: "degraded", detail: format!("{feature} was not reported") },
    }
}
