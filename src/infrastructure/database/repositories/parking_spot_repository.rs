//! SeaORM implementation of ParkingSpotRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::{duplicate, retire_row, update_or_missing, RetireColumns};
use crate::domain::{DomainResult, ParkingSpot, ParkingSpotRepository, SoftDelete};
use crate::infrastructure::database::entities::parking_spot;

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: parking_spot::Model) -> ParkingSpot {
    ParkingSpot {
        id: m.id,
        name: m.name,
        deletion: SoftDelete {
            is_deleted: m.is_deleted,
            deleted_at: m.deleted_at,
        },
    }
}

fn domain_to_active(s: ParkingSpot) -> parking_spot::ActiveModel {
    parking_spot::ActiveModel {
        id: Set(s.id),
        name: Set(s.name),
        is_deleted: Set(s.deletion.is_deleted),
        deleted_at: Set(s.deletion.deleted_at),
    }
}

/// Insert a spot, reviving a retired row that carries the same id.
pub(super) async fn insert_spot<C: ConnectionTrait>(db: &C, spot: ParkingSpot) -> DomainResult<()> {
    debug!("Saving parking spot: {}", spot.id);

    let existing = parking_spot::Entity::find_by_id(spot.id.clone()).one(db).await?;
    match existing {
        Some(row) if !row.is_deleted => Err(duplicate("Parking spot", &spot.id)),
        Some(_) => {
            domain_to_active(spot).update(db).await?;
            Ok(())
        }
        None => {
            parking_spot::Entity::insert(domain_to_active(spot))
                .exec_without_returning(db)
                .await?;
            Ok(())
        }
    }
}

async fn update_spot<C: ConnectionTrait>(db: &C, spot: ParkingSpot) -> DomainResult<()> {
    debug!("Updating parking spot: {}", spot.id);
    let id = spot.id.clone();
    update_or_missing(domain_to_active(spot).update(db).await, "Parking spot", &id)
}

/// Store the retired state of `spot`; `NotFound` when the row is no longer active.
pub(super) async fn retire_spot<C: ConnectionTrait>(db: &C, spot: &ParkingSpot) -> DomainResult<()> {
    let columns = RetireColumns {
        id: parking_spot::Column::Id,
        is_deleted: parking_spot::Column::IsDeleted,
        deleted_at: parking_spot::Column::DeletedAt,
    };
    retire_row::<parking_spot::Entity, _>(db, columns, &spot.id, &spot.deletion, "Parking spot").await
}

pub struct SeaOrmParkingSpotRepository {
    db: DatabaseConnection,
}

impl SeaOrmParkingSpotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ParkingSpotRepository for SeaOrmParkingSpotRepository {
    async fn find_active(&self, id: &str) -> DomainResult<Option<ParkingSpot>> {
        let model = parking_spot::Entity::find_by_id(id.to_string())
            .filter(parking_spot::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_active_untracked(&self, id: &str) -> DomainResult<Option<ParkingSpot>> {
        self.find_active(id).await
    }

    async fn find_all_active(&self) -> DomainResult<Vec<ParkingSpot>> {
        let models = parking_spot::Entity::find()
            .filter(parking_spot::Column::IsDeleted.eq(false))
            .order_by_asc(parking_spot::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn insert(&self, spot: ParkingSpot) -> DomainResult<()> {
        insert_spot(&self.db, spot).await
    }

    async fn insert_many(&self, spots: Vec<ParkingSpot>) -> DomainResult<()> {
        let txn = self.db.begin().await?;
        for spot in spots {
            insert_spot(&txn, spot).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn update(&self, spot: ParkingSpot) -> DomainResult<()> {
        update_spot(&self.db, spot).await
    }
}
