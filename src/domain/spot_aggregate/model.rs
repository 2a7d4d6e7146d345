//! Spot aggregate value types

use chrono::{DateTime, Utc};

use crate::domain::{Device, ParkingSpot, SpotDeviceLink, SpotStatus};

/// Records to insert for a new pairing.
///
/// `spot`, `device` and `status` are `None` when an existing active record
/// is reused; the link is always new.
#[derive(Debug, Clone)]
pub struct NewSpotAggregate {
    pub spot: Option<ParkingSpot>,
    pub device: Option<Device>,
    pub status: Option<SpotStatus>,
    pub link: SpotDeviceLink,
}

impl NewSpotAggregate {
    pub fn new(link: SpotDeviceLink) -> Self {
        Self {
            spot: None,
            device: None,
            status: None,
            link,
        }
    }

    pub fn with_spot(mut self, spot: ParkingSpot) -> Self {
        self.spot = Some(spot);
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    pub fn with_status(mut self, status: SpotStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Number of records the write will insert.
    pub fn record_count(&self) -> usize {
        1 + self.spot.is_some() as usize
            + self.device.is_some() as usize
            + self.status.is_some() as usize
    }
}

/// Fully linked pairing, as loaded for deletion
#[derive(Debug, Clone)]
pub struct SpotAggregate {
    pub spot: ParkingSpot,
    pub status: SpotStatus,
    pub link: SpotDeviceLink,
    pub device: Device,
}

impl SpotAggregate {
    /// Soft-delete all four records with one shared timestamp.
    pub fn retire(&mut self, at: DateTime<Utc>) {
        self.spot.deletion.retire(at);
        self.status.deletion.retire(at);
        self.link.deletion.retire(at);
        self.device.deletion.retire(at);
    }
}
