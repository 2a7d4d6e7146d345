//! Parking use cases

pub mod creation;
pub mod dto;
pub mod lifecycle;
pub mod occupancy;
pub mod service;

pub use creation::{CreationStrategy, SpotCreationResolver};
pub use dto::{
    CreateSpotCommand, CreateSpotOutcome, DeviceUsage, DeviceUsageView, SpotStatusView,
};
pub use lifecycle::SpotLifecycleService;
pub use occupancy::OccupancyService;
pub use service::ParkingService;
