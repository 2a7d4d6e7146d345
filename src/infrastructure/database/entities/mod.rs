//! Database entities module

pub mod device;
pub mod parking_spot;
pub mod spot_device_link;
pub mod spot_status;

pub use device::Entity as Device;
pub use parking_spot::Entity as ParkingSpot;
pub use spot_device_link::Entity as SpotDeviceLink;
pub use spot_status::Entity as SpotStatus;
