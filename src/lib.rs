//! # Parking IoT Service
//!
//! Tracks the occupancy of parking spots from signals sent by the IoT
//! device paired with each spot.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Parking records, invariants and store ports
//! - **application**: Occupancy transitions, spot creation, lifecycle, rate limiting
//! - **infrastructure**: SeaORM/SQLite and in-memory stores, demo data
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: Runtime bootstrap and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export storage types for easy access
pub use infrastructure::{init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider};

// Re-export API router
pub use interfaces::http::create_api_router;
