//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod device_repository;
pub mod parking_spot_repository;
pub mod repository_provider;
pub mod spot_aggregate_repository;
pub mod spot_device_link_repository;
pub mod spot_status_repository;

pub use device_repository::SeaOrmDeviceRepository;
pub use parking_spot_repository::SeaOrmParkingSpotRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use spot_aggregate_repository::SeaOrmSpotAggregateRepository;
pub use spot_device_link_repository::SeaOrmSpotDeviceLinkRepository;
pub use spot_status_repository::SeaOrmSpotStatusRepository;

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

use crate::domain::{DomainError, DomainResult, SoftDelete};

fn duplicate(entity: &str, id: &str) -> DomainError {
    DomainError::Conflict(format!("{} '{}' already exists", entity, id))
}

/// Map an update result, turning "no row matched" into `NotFound`.
fn update_or_missing<M>(
    result: Result<M, DbErr>,
    entity: &'static str,
    id: &str,
) -> DomainResult<()> {
    match result {
        Ok(_) => Ok(()),
        Err(DbErr::RecordNotUpdated) => Err(DomainError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Soft-delete columns of one table
struct RetireColumns<C> {
    id: C,
    is_deleted: C,
    deleted_at: C,
}

/// Write `deletion` onto the row `id`, provided the row is still active.
async fn retire_row<E, C>(
    db: &C,
    columns: RetireColumns<E::Column>,
    id: &str,
    deletion: &SoftDelete,
    entity: &'static str,
) -> DomainResult<()>
where
    E: EntityTrait,
    E::Column: Copy,
    C: ConnectionTrait,
{
    let result = E::update_many()
        .col_expr(columns.is_deleted, Expr::value(deletion.is_deleted))
        .col_expr(columns.deleted_at, Expr::value(deletion.deleted_at))
        .filter(columns.id.eq(id))
        .filter(columns.is_deleted.eq(false))
        .exec(db)
        .await?;

    if result.rows_affected == 1 {
        Ok(())
    } else {
        Err(DomainError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        })
    }
}
