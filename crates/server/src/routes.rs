//! JSON API over the segmentation and recommendation features.
//!
//! - `POST /api/v1/segments`: assign a customer segment
//! - `GET  /api/v1/products`: distinct catalog product names
//! - `GET  /api/v1/recommendations?product=&top_n=`: similar products by name

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use insight_core::{
    ApplicationError, DomainError, InsightService, InterfaceError, RankedProduct,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    service: Arc<InsightService>,
}

#[derive(Debug, Deserialize)]
pub struct SegmentRequest {
    pub recency: f64,
    pub frequency: i64,
    pub monetary: f64,
}

#[derive(Debug, Serialize)]
pub struct SegmentResponse {
    pub label: String,
    pub cluster_index: usize,
    pub message: String,
    pub correlation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub product: String,
    pub top_n: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub query: String,
    pub products: Vec<String>,
    pub ranked: Vec<RankedProduct>,
    pub correlation_id: String,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub user_message: &'static str,
    pub correlation_id: String,
}

pub struct ApiError(InterfaceError);

impl ApiError {
    fn domain(error: DomainError, correlation_id: &str) -> Self {
        Self(ApplicationError::from(error).into_interface(correlation_id))
    }

    fn bad_request(message: impl Into<String>, correlation_id: &str) -> Self {
        Self(InterfaceError::BadRequest {
            message: message.into(),
            correlation_id: correlation_id.to_owned(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        warn!(
            event_name = "api.request_failed",
            correlation_id = %self.0.correlation_id(),
            error_class = self.0.error_class(),
            error = %self.0,
            "request failed"
        );

        let body = ErrorBody {
            error: self.0.error_class(),
            message: self.0.message().to_owned(),
            user_message: self.0.user_message(),
            correlation_id: self.0.correlation_id().to_owned(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(service: Arc<InsightService>) -> Router {
    Router::new()
        .route("/api/v1/segments", post(classify_segment))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/recommendations", get(recommendations))
        .with_state(ApiState { service })
}

fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

async fn classify_segment(
    State(state): State<ApiState>,
    payload: Result<Json<SegmentRequest>, JsonRejection>,
) -> Result<Json<SegmentResponse>, ApiError> {
    let correlation_id = correlation_id();
    let Json(request) =
        payload.map_err(|rejection| ApiError::bad_request(rejection.body_text(), &correlation_id))?;

    let frequency = u64::try_from(request.frequency).map_err(|_| {
        ApiError::domain(
            DomainError::InvalidInput(format!("frequency must be >= 1, got {}", request.frequency)),
            &correlation_id,
        )
    })?;

    let assignment = state
        .service
        .classify(request.recency, frequency, request.monetary)
        .map_err(|error| ApiError::domain(error, &correlation_id))?;

    info!(
        event_name = "api.segment.classified",
        correlation_id = %correlation_id,
        cluster_index = assignment.cluster_index,
        "segment request served"
    );

    Ok(Json(SegmentResponse {
        message: format!("This customer belongs to: {}", assignment.headline()),
        label: assignment.label,
        cluster_index: assignment.cluster_index,
        correlation_id,
    }))
}

async fn list_products(State(state): State<ApiState>) -> Result<Json<ProductsResponse>, ApiError> {
    let correlation_id = correlation_id();
    let products =
        state.service.product_names().map_err(|error| ApiError::domain(error, &correlation_id))?;
    Ok(Json(ProductsResponse { products }))
}

async fn recommendations(
    State(state): State<ApiState>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let correlation_id = correlation_id();
    let Query(query) =
        query.map_err(|rejection| ApiError::bad_request(rejection.body_text(), &correlation_id))?;

    let max_top_n = state.service.max_top_n();
    let top_n = match query.top_n {
        None => state.service.default_top_n(),
        Some(value) if value <= 0 => 0,
        Some(value) => match usize::try_from(value) {
            Ok(value) if value <= max_top_n => value,
            _ => {
                return Err(ApiError::bad_request(
                    format!("top_n must be at most {max_top_n}"),
                    &correlation_id,
                ))
            }
        },
    };

    let ranked = state
        .service
        .recommend_detailed(&query.product, top_n)
        .map_err(|error| ApiError::domain(error, &correlation_id))?;

    info!(
        event_name = "api.recommendations.served",
        correlation_id = %correlation_id,
        returned = ranked.len(),
        "recommendation request served"
    );

    Ok(Json(RecommendationResponse {
        query: query.product.trim().to_owned(),
        products: ranked.iter().map(|item| item.display_name.clone()).collect(),
        ranked,
        correlation_id,
    }))
}
