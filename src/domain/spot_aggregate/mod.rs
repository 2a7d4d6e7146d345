//! Spot aggregate
//!
//! Spot, device, link and status records of one pairing are created and
//! retired together. They are stored as separate records, so this module
//! defines the atomic unit the store must apply them in.

pub mod model;
pub mod repository;

pub use model::{NewSpotAggregate, SpotAggregate};
pub use repository::SpotAggregateRepository;
