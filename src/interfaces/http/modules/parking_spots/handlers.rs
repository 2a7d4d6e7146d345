//! Parking spot handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{CreateSpotRequest, CreateSpotResponse, DeviceDto, SpotStatusDto};
use crate::application::ParkingService;
use crate::interfaces::http::common::{ApiError, ErrorResponse, PageQuery, PagedResponse, ValidatedJson};

/// Parking handler state
#[derive(Clone)]
pub struct ParkingState {
    pub service: Arc<ParkingService>,
}

#[utoipa::path(
    get,
    path = "/api/parking-spots",
    tag = "Parking Spots",
    params(PageQuery),
    responses(
        (status = 200, description = "Spots with their occupancy", body = PagedResponse<SpotStatusDto>),
        (status = 400, description = "Invalid paging", body = ErrorResponse)
    )
)]
pub async fn list_spots_status(
    State(state): State<ParkingState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResponse<SpotStatusDto>>, ApiError> {
    let page = state.service.list_spots_status(query.params()?).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/api/parking-spots",
    tag = "Parking Spots",
    request_body = CreateSpotRequest,
    responses(
        (status = 201, description = "Spot and device paired", body = CreateSpotResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Spot or device already paired", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn create_spot(
    State(state): State<ParkingState>,
    ValidatedJson(body): ValidatedJson<CreateSpotRequest>,
) -> Result<(StatusCode, Json<CreateSpotResponse>), ApiError> {
    let outcome = state.service.create_spot(body.into()).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

#[utoipa::path(
    delete,
    path = "/api/parking-spots/{id}",
    tag = "Parking Spots",
    params(("id" = String, Path, description = "Parking spot id")),
    responses(
        (status = 204, description = "Spot, status, pairing and device retired"),
        (status = 404, description = "A record of the pairing is missing", body = ErrorResponse)
    )
)]
pub async fn delete_spot(
    State(state): State<ParkingState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_spot(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/parking-spots/{id}/occupy",
    tag = "Parking Spots",
    params(("id" = String, Path, description = "Id of the reporting device")),
    responses(
        (status = 204, description = "Spot marked occupied"),
        (status = 404, description = "Unknown device, pairing or status", body = ErrorResponse),
        (status = 409, description = "Spot already occupied", body = ErrorResponse),
        (status = 429, description = "Device inside its cooldown window", body = ErrorResponse)
    )
)]
pub async fn occupy(
    State(state): State<ParkingState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.occupy(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/parking-spots/{id}/free",
    tag = "Parking Spots",
    params(("id" = String, Path, description = "Id of the reporting device")),
    responses(
        (status = 204, description = "Spot marked free"),
        (status = 404, description = "Unknown device, pairing or status", body = ErrorResponse),
        (status = 409, description = "Spot already free", body = ErrorResponse),
        (status = 429, description = "Device inside its cooldown window", body = ErrorResponse)
    )
)]
pub async fn free(
    State(state): State<ParkingState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.free(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/parking-spots/devices",
    tag = "Parking Spots",
    params(PageQuery),
    responses(
        (status = 200, description = "Working devices and whether they guard a spot", body = PagedResponse<DeviceDto>),
        (status = 400, description = "Invalid paging", body = ErrorResponse)
    )
)]
pub async fn list_devices(
    State(state): State<ParkingState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResponse<DeviceDto>>, ApiError> {
    let page = state.service.list_devices(query.params()?).await?;
    Ok(Json(page.into()))
}
