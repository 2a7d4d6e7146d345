//! Spot–device link aggregate
//!
//! The pairing that says "this device guards this spot".

pub mod model;
pub mod repository;

pub use model::SpotDeviceLink;
pub use repository::SpotDeviceLinkRepository;
