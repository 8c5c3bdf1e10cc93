use crate::errors::ServiceError;
use crate::{ApiResponse, AppState};
use axum::{extract::State, response::IntoResponse, Json};

/// Aggregate dashboard metrics
pub async fn get_dashboard_metrics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let metrics = state.services.metrics.get_dashboard_metrics().await?;
    Ok(Json(ApiResponse::success(metrics)))
}
