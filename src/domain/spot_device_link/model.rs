//! Spot–device link domain entity

use uuid::Uuid;

use crate::domain::{DomainError, SoftDelete};

/// Pairing between one spot and one device.
///
/// At most one active link may exist per device and per spot. The storage
/// layer has no unique constraint for it: the spot-creation flow checks it
/// up front and the aggregate write checks it again before committing.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotDeviceLink {
    pub id: String,
    pub spot_id: String,
    pub device_id: String,
    pub deletion: SoftDelete,
}

impl SpotDeviceLink {
    pub fn new(spot_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            spot_id: spot_id.into(),
            device_id: device_id.into(),
            deletion: SoftDelete::active(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.deletion.is_active()
    }

    /// The device of a new link already guards another spot.
    pub fn device_in_use() -> DomainError {
        DomainError::Conflict("Device already in use with other parking spot".to_string())
    }

    /// The spot of a new link is already guarded by another device.
    pub fn spot_in_use() -> DomainError {
        DomainError::Conflict("Parking spot already in use with other device".to_string())
    }
}
