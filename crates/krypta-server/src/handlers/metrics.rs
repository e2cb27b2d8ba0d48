//! Metrics summary endpoint

use crate::api::responses::MetricsSummaryResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::Json;
use krypta_core::model::AuthData;
use std::sync::Arc;

/// POST /api/metrics/get-summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(_auth): Extension<AuthData>,
) -> Result<Json<MetricsSummaryResponse>, ApiError> {
    let usage = state.metrics.disk_usage().await?;
    Ok(Json(MetricsSummaryResponse::from_usage(usage)))
}
