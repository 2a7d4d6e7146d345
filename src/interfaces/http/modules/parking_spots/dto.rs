//! Parking spot DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::{
    CreateSpotCommand, CreateSpotOutcome, DeviceUsageView, SpotStatusView,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpotRequest {
    #[validate(length(min = 1, max = 64))]
    pub parking_spot_id: String,
    #[validate(length(min = 1, max = 100))]
    pub parking_name: String,
    #[validate(length(min = 1, max = 64))]
    pub device_id: String,
    #[validate(length(min = 1, max = 200))]
    pub device_specification: String,
}

impl From<CreateSpotRequest> for CreateSpotCommand {
    fn from(r: CreateSpotRequest) -> Self {
        Self {
            spot_id: r.parking_spot_id,
            spot_name: r.parking_name,
            device_id: r.device_id,
            device_specification: r.device_specification,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpotResponse {
    /// Describes which records were created or reused
    pub message: String,
    pub parking_spot_id: String,
    pub device_id: String,
}

impl From<CreateSpotOutcome> for CreateSpotResponse {
    fn from(o: CreateSpotOutcome) -> Self {
        Self {
            message: o.message,
            parking_spot_id: o.spot_id,
            device_id: o.device_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpotStatusDto {
    pub parking_spot_id: String,
    pub parking_name: String,
    /// "Occupied" or "Free"
    pub status: String,
}

impl From<SpotStatusView> for SpotStatusDto {
    fn from(v: SpotStatusView) -> Self {
        Self {
            parking_spot_id: v.spot_id,
            parking_name: v.name,
            status: v.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDto {
    pub device_id: String,
    /// "Registered and in use" or "Registered but not in use"
    pub status: String,
}

impl From<DeviceUsageView> for DeviceDto {
    fn from(v: DeviceUsageView) -> Self {
        Self {
            device_id: v.device_id,
            status: v.usage.to_string(),
        }
    }
}
