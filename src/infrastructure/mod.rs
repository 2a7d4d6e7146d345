//! Infrastructure layer - external concerns

pub mod database;
pub mod seed;
pub mod storage;

pub use database::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
pub use seed::seed_demo_data;
pub use storage::InMemoryRepositoryProvider;
