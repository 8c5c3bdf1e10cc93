use crate::errors::ServiceError;
use crate::services::clients::{CreateClientRequest, CreatePhoneRequest, UpdateClientRequest};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

pub async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state.services.clients.create_client(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(client))))
}

pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let clients = state.services.clients.list_clients().await?;
    Ok(Json(ApiResponse::success(clients)))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state.services.clients.get_client(id).await?;
    Ok(Json(ApiResponse::success(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state.services.clients.update_client(id, request).await?;
    Ok(Json(ApiResponse::success(client)))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.clients.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_phone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreatePhoneRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let phone = state.services.clients.add_phone(id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(phone))))
}

pub async fn remove_phone(
    State(state): State<AppState>,
    Path(phone_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.clients.remove_phone(phone_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
