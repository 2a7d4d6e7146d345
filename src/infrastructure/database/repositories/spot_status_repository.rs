//! SeaORM implementation of SpotStatusRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

use super::{retire_row, update_or_missing, RetireColumns};
use crate::domain::{DomainResult, Occupancy, SoftDelete, SpotStatus, SpotStatusRepository};
use crate::infrastructure::database::entities::spot_status;

fn model_to_domain(m: spot_status::Model) -> SpotStatus {
    SpotStatus {
        id: m.id,
        spot_id: m.spot_id,
        occupied: m.occupied,
        deletion: SoftDelete {
            is_deleted: m.is_deleted,
            deleted_at: m.deleted_at,
        },
    }
}

fn domain_to_active(s: SpotStatus) -> spot_status::ActiveModel {
    spot_status::ActiveModel {
        id: Set(s.id),
        spot_id: Set(s.spot_id),
        occupied: Set(s.occupied),
        is_deleted: Set(s.deletion.is_deleted),
        deleted_at: Set(s.deletion.deleted_at),
    }
}

pub(super) async fn insert_status<C: ConnectionTrait>(db: &C, status: SpotStatus) -> DomainResult<()> {
    debug!("Saving status for spot: {}", status.spot_id);
    spot_status::Entity::insert(domain_to_active(status))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn update_status<C: ConnectionTrait>(db: &C, status: SpotStatus) -> DomainResult<()> {
    let id = status.id.clone();
    update_or_missing(domain_to_active(status).update(db).await, "Parking spot status", &id)
}

/// Store the retired state of `status`; `NotFound` when the row is no longer active.
pub(super) async fn retire_status<C: ConnectionTrait>(db: &C, status: &SpotStatus) -> DomainResult<()> {
    let columns = RetireColumns {
        id: spot_status::Column::Id,
        is_deleted: spot_status::Column::IsDeleted,
        deleted_at: spot_status::Column::DeletedAt,
    };
    retire_row::<spot_status::Entity, _>(db, columns, &status.id, &status.deletion, "Parking spot status").await
}

pub struct SeaOrmSpotStatusRepository {
    db: DatabaseConnection,
}

impl SeaOrmSpotStatusRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SpotStatusRepository for SeaOrmSpotStatusRepository {
    async fn find_active_by_spot(&self, spot_id: &str) -> DomainResult<Option<SpotStatus>> {
        let model = spot_status::Entity::find()
            .filter(spot_status::Column::SpotId.eq(spot_id))
            .filter(spot_status::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn insert(&self, status: SpotStatus) -> DomainResult<()> {
        insert_status(&self.db, status).await
    }

    async fn insert_many(&self, statuses: Vec<SpotStatus>) -> DomainResult<()> {
        let txn = self.db.begin().await?;
        for status in statuses {
            insert_status(&txn, status).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn update(&self, status: SpotStatus) -> DomainResult<()> {
        update_status(&self.db, status).await
    }

    async fn transition(&self, status_id: &str, target: Occupancy) -> DomainResult<bool> {
        debug!("Moving status {} to {}", status_id, target);

        let result = spot_status::Entity::update_many()
            .col_expr(spot_status::Column::Occupied, Expr::value(target.is_occupied()))
            .filter(spot_status::Column::Id.eq(status_id))
            .filter(spot_status::Column::IsDeleted.eq(false))
            .filter(spot_status::Column::Occupied.eq(target.opposite().is_occupied()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::infrastructure::database::test_connection;

    #[tokio::test]
    async fn transition_is_conditional_on_current_state() {
        let repo = SeaOrmSpotStatusRepository::new(test_connection().await);
        let status = SpotStatus::free("S1");
        let id = status.id.clone();
        repo.insert(status).await.unwrap();

        assert!(!repo.transition(&id, Occupancy::Free).await.unwrap());
        assert!(repo.transition(&id, Occupancy::Occupied).await.unwrap());
        assert!(!repo.transition(&id, Occupancy::Occupied).await.unwrap());

        let stored = repo.find_active_by_spot("S1").await.unwrap().unwrap();
        assert_eq!(stored.occupancy(), Occupancy::Occupied);
    }

    #[tokio::test]
    async fn retired_status_cannot_transition() {
        let repo = SeaOrmSpotStatusRepository::new(test_connection().await);
        let mut status = SpotStatus::free("S1");
        let id = status.id.clone();
        repo.insert(status.clone()).await.unwrap();
        status.deletion.retire(Utc::now());
        repo.update(status).await.unwrap();

        assert!(!repo.transition(&id, Occupancy::Occupied).await.unwrap());
        assert!(repo.find_active_by_spot("S1").await.unwrap().is_none());
    }
}
