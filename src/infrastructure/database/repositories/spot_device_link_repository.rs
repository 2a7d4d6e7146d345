//! SeaORM implementation of SpotDeviceLinkRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};

use super::{retire_row, update_or_missing, RetireColumns};
use crate::domain::{DomainResult, SoftDelete, SpotDeviceLink, SpotDeviceLinkRepository};
use crate::infrastructure::database::entities::spot_device_link;

fn model_to_domain(m: spot_device_link::Model) -> SpotDeviceLink {
    SpotDeviceLink {
        id: m.id,
        spot_id: m.spot_id,
        device_id: m.device_id,
        deletion: SoftDelete {
            is_deleted: m.is_deleted,
            deleted_at: m.deleted_at,
        },
    }
}

fn domain_to_active(l: SpotDeviceLink) -> spot_device_link::ActiveModel {
    spot_device_link::ActiveModel {
        id: Set(l.id),
        spot_id: Set(l.spot_id),
        device_id: Set(l.device_id),
        is_deleted: Set(l.deletion.is_deleted),
        deleted_at: Set(l.deletion.deleted_at),
    }
}

pub(super) async fn insert_link<C: ConnectionTrait>(db: &C, link: SpotDeviceLink) -> DomainResult<()> {
    debug!("Linking device {} to spot {}", link.device_id, link.spot_id);
    spot_device_link::Entity::insert(domain_to_active(link))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn update_link<C: ConnectionTrait>(db: &C, link: SpotDeviceLink) -> DomainResult<()> {
    let id = link.id.clone();
    update_or_missing(domain_to_active(link).update(db).await, "Parking spot-device", &id)
}

/// Store the retired state of `link`; `NotFound` when the row is no longer active.
pub(super) async fn retire_link<C: ConnectionTrait>(db: &C, link: &SpotDeviceLink) -> DomainResult<()> {
    let columns = RetireColumns {
        id: spot_device_link::Column::Id,
        is_deleted: spot_device_link::Column::IsDeleted,
        deleted_at: spot_device_link::Column::DeletedAt,
    };
    retire_row::<spot_device_link::Entity, _>(db, columns, &link.id, &link.deletion, "Parking spot-device").await
}

/// Active links whose `column` equals `value`.
pub(super) async fn count_active_links<C: ConnectionTrait>(
    db: &C,
    column: spot_device_link::Column,
    value: &str,
) -> DomainResult<u64> {
    let count = spot_device_link::Entity::find()
        .filter(column.eq(value))
        .filter(spot_device_link::Column::IsDeleted.eq(false))
        .count(db)
        .await?;
    Ok(count)
}

pub struct SeaOrmSpotDeviceLinkRepository {
    db: DatabaseConnection,
}

impl SeaOrmSpotDeviceLinkRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SpotDeviceLinkRepository for SeaOrmSpotDeviceLinkRepository {
    async fn find_active_by_device(&self, device_id: &str) -> DomainResult<Option<SpotDeviceLink>> {
        let model = spot_device_link::Entity::find()
            .filter(spot_device_link::Column::DeviceId.eq(device_id))
            .filter(spot_device_link::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_active_by_spot(&self, spot_id: &str) -> DomainResult<Option<SpotDeviceLink>> {
        let model = spot_device_link::Entity::find()
            .filter(spot_device_link::Column::SpotId.eq(spot_id))
            .filter(spot_device_link::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn insert(&self, link: SpotDeviceLink) -> DomainResult<()> {
        insert_link(&self.db, link).await
    }

    async fn insert_many(&self, links: Vec<SpotDeviceLink>) -> DomainResult<()> {
        let txn = self.db.begin().await?;
        for link in links {
            insert_link(&txn, link).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn update(&self, link: SpotDeviceLink) -> DomainResult<()> {
        update_link(&self.db, link).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::infrastructure::database::test_connection;

    #[tokio::test]
    async fn retired_links_do_not_match() {
        let repo = SeaOrmSpotDeviceLinkRepository::new(test_connection().await);
        let mut old = SpotDeviceLink::new("S1", "D1");
        old.deletion.retire(Utc::now());
        repo.insert(old).await.unwrap();

        assert!(repo.find_active_by_device("D1").await.unwrap().is_none());

        let fresh = SpotDeviceLink::new("S1", "D1");
        repo.insert(fresh.clone()).await.unwrap();

        assert_eq!(repo.find_active_by_device("D1").await.unwrap(), Some(fresh.clone()));
        assert_eq!(repo.find_active_by_spot("S1").await.unwrap(), Some(fresh));
    }
}
