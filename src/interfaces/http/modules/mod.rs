pub mod health;
pub mod metrics;
pub mod parking_spots;
