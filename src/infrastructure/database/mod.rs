pub mod entities;
pub mod repositories;

pub use repositories::SeaOrmRepositoryProvider;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use tracing::info;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./parking.db?mode=rwc")
    pub url: String,
    /// Pool size. In-memory SQLite must use 1: every connection opens its own database.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::sqlite("./parking.db")
    }
}

impl DatabaseConfig {
    /// Create config for a SQLite file, creating it when missing
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
            max_connections: 8,
        }
    }

    /// Private in-memory SQLite database
    pub fn sqlite_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }

    /// Create config from environment variable
    pub fn from_env() -> Self {
        match std::env::var("DATABASE_URL") {
            Ok(url) => Self {
                url,
                ..Self::default()
            },
            Err(_) => Self::default(),
        }
    }
}

/// Initialize database connection and make sure every table exists
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to database: {}", config.url);

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    ensure_schema(&db).await?;

    info!("Database connected successfully");
    Ok(db)
}

/// Create missing tables and indexes straight from the entity definitions.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables = [
        schema
            .create_table_from_entity(entities::ParkingSpot)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(entities::Device)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(entities::SpotDeviceLink)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(entities::SpotStatus)
            .if_not_exists()
            .to_owned(),
    ];
    for table in &tables {
        db.execute(backend.build(table)).await?;
    }

    let indexes = schema
        .create_index_from_entity(entities::SpotDeviceLink)
        .into_iter()
        .chain(schema.create_index_from_entity(entities::SpotStatus));
    for mut index in indexes {
        db.execute(backend.build(index.if_not_exists())).await?;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_connection() -> DatabaseConnection {
    init_database(&DatabaseConfig::sqlite_memory())
        .await
        .expect("in-memory sqlite")
}
