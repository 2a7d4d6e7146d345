//! Spot status aggregate
//!
//! Holds the two-state occupancy machine {Free, Occupied}.

pub mod model;
pub mod repository;

pub use model::{Occupancy, SpotStatus};
pub use repository::SpotStatusRepository;
