//! Device aggregate
//!
//! The IoT sensor that guards a parking spot.

pub mod model;
pub mod repository;

pub use model::Device;
pub use repository::DeviceRepository;
