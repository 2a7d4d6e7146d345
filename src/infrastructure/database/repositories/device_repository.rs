//! SeaORM implementation of DeviceRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{duplicate, retire_row, update_or_missing, RetireColumns};
use crate::domain::{Device, DeviceRepository, DomainResult, SoftDelete};
use crate::infrastructure::database::entities::device;
use crate::shared::{PagedResult, PaginationParams};

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: device::Model) -> Device {
    Device {
        id: m.id,
        specification: m.specification,
        is_working: m.is_working,
        registered_at: m.registered_at,
        deletion: SoftDelete {
            is_deleted: m.is_deleted,
            deleted_at: m.deleted_at,
        },
    }
}

fn domain_to_active(d: Device) -> device::ActiveModel {
    device::ActiveModel {
        id: Set(d.id),
        specification: Set(d.specification),
        is_working: Set(d.is_working),
        registered_at: Set(d.registered_at),
        is_deleted: Set(d.deletion.is_deleted),
        deleted_at: Set(d.deletion.deleted_at),
    }
}

/// Insert a device, reviving a retired row that carries the same id.
pub(super) async fn insert_device<C: ConnectionTrait>(db: &C, d: Device) -> DomainResult<()> {
    debug!("Registering device: {} ({})", d.id, d.specification);

    let existing = device::Entity::find_by_id(d.id.clone()).one(db).await?;
    match existing {
        Some(row) if !row.is_deleted => Err(duplicate("Device", &d.id)),
        Some(_) => {
            domain_to_active(d).update(db).await?;
            Ok(())
        }
        None => {
            device::Entity::insert(domain_to_active(d))
                .exec_without_returning(db)
                .await?;
            Ok(())
        }
    }
}

async fn update_device<C: ConnectionTrait>(db: &C, d: Device) -> DomainResult<()> {
    debug!("Updating device: {}", d.id);
    let id = d.id.clone();
    update_or_missing(domain_to_active(d).update(db).await, "Device", &id)
}

/// Store the retired state of `device`; `NotFound` when the row is no longer active.
pub(super) async fn retire_device<C: ConnectionTrait>(db: &C, device: &Device) -> DomainResult<()> {
    let columns = RetireColumns {
        id: device::Column::Id,
        is_deleted: device::Column::IsDeleted,
        deleted_at: device::Column::DeletedAt,
    };
    retire_row::<device::Entity, _>(db, columns, &device.id, &device.deletion, "Device").await
}

pub struct SeaOrmDeviceRepository {
    db: DatabaseConnection,
}

impl SeaOrmDeviceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeviceRepository for SeaOrmDeviceRepository {
    async fn find_active(&self, id: &str) -> DomainResult<Option<Device>> {
        let model = device::Entity::find_by_id(id.to_string())
            .filter(device::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_active_untracked(&self, id: &str) -> DomainResult<Option<Device>> {
        self.find_active(id).await
    }

    async fn find_working_page(&self, page: PaginationParams) -> DomainResult<PagedResult<Device>> {
        let listed = device::Entity::find()
            .filter(device::Column::IsWorking.eq(true))
            .filter(device::Column::IsDeleted.eq(false));

        let total = listed.clone().count(&self.db).await?;
        let models = listed
            .order_by_asc(device::Column::Id)
            .offset(page.offset())
            .limit(page.page_size)
            .all(&self.db)
            .await?;

        Ok(PagedResult::new(
            models.into_iter().map(model_to_domain).collect(),
            total,
            page,
        ))
    }

    async fn insert(&self, d: Device) -> DomainResult<()> {
        insert_device(&self.db, d).await
    }

    async fn insert_many(&self, devices: Vec<Device>) -> DomainResult<()> {
        let txn = self.db.begin().await?;
        for d in devices {
            insert_device(&txn, d).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn update(&self, d: Device) -> DomainResult<()> {
        update_device(&self.db, d).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_connection;

    #[tokio::test]
    async fn working_page_counts_the_whole_set() {
        let repo = SeaOrmDeviceRepository::new(test_connection().await);
        let mut broken = Device::new("D2", "flaky");
        broken.is_working = false;
        repo.insert_many(vec![
            Device::new("D3", "x"),
            Device::new("D1", "x"),
            broken,
            Device::new("D4", "x"),
        ])
        .await
        .unwrap();

        let page = repo
            .find_working_page(PaginationParams::new(2, 2).unwrap())
            .await
            .unwrap();

        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 2);
        let ids: Vec<_> = page.items.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["D4"]);
    }

    #[tokio::test]
    async fn last_addressable_page_is_empty() {
        let repo = SeaOrmDeviceRepository::new(test_connection().await);
        repo.insert(Device::new("D1", "x")).await.unwrap();

        let far = PaginationParams::new(i64::MAX as u64, 1).unwrap();
        let page = repo.find_working_page(far).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 1);
    }

    #[tokio::test]
    async fn insert_many_is_all_or_nothing() {
        let repo = SeaOrmDeviceRepository::new(test_connection().await);
        repo.insert(Device::new("D1", "x")).await.unwrap();

        let result = repo
            .insert_many(vec![Device::new("D2", "x"), Device::new("D1", "again")])
            .await;

        assert!(result.is_err());
        assert!(repo.find_active("D2").await.unwrap().is_none());
    }
}
