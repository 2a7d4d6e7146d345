//! Domain layer: parking records, their invariants and the store ports

pub mod device;
pub mod parking_spot;
pub mod repositories;
pub mod soft_delete;
pub mod spot_aggregate;
pub mod spot_device_link;
pub mod spot_status;

pub use device::{Device, DeviceRepository};
pub use parking_spot::{ParkingSpot, ParkingSpotRepository};
pub use repositories::{DomainResult, RepositoryProvider};
pub use soft_delete::SoftDelete;
pub use spot_aggregate::{NewSpotAggregate, SpotAggregate, SpotAggregateRepository};
pub use spot_device_link::{SpotDeviceLink, SpotDeviceLinkRepository};
pub use spot_status::{Occupancy, SpotStatus, SpotStatusRepository};

pub use crate::shared::errors::DomainError;
