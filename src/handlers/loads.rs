use crate::errors::ServiceError;
use crate::services::loads::{CreatePurchaseLoadRequest, CreateSalesLoadRequest};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Ingest a purchase load (stock in)
pub async fn process_purchase_load(
    State(state): State<AppState>,
    Json(request): Json<CreatePurchaseLoadRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.services.loads.process_purchase_load(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(summary))))
}

/// Ingest a sales load (stock out)
pub async fn process_sales_load(
    State(state): State<AppState>,
    Json(request): Json<CreateSalesLoadRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.services.loads.process_sales_load(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(summary))))
}

/// Undo a previously applied load
pub async fn revert_load(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.services.load_revert.revert_load(id).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// Reconstructed records of a persisted load
pub async fn get_load_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let data = state.services.loads.get_load_data(id).await?;
    Ok(Json(ApiResponse::success(data)))
}

/// All persisted loads, newest first
pub async fn get_loads_history(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let history = state.services.loads.get_loads_history().await?;
    Ok(Json(ApiResponse::success(history)))
}
