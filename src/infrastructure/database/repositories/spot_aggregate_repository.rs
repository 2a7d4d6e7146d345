//! SeaORM implementation of SpotAggregateRepository
//!
//! Every write runs in one database transaction; an error drops the
//! transaction and rolls back whatever part of the aggregate was written.
//! Each transaction opens with a write, so SQLite hands out its write lock
//! before anything is checked and concurrent aggregates are serialised.

use async_trait::async_trait;
use log::debug;
use sea_orm::{DatabaseConnection, TransactionTrait};

use super::device_repository::{insert_device, retire_device};
use super::parking_spot_repository::{insert_spot, retire_spot};
use super::spot_device_link_repository::{count_active_links, insert_link, retire_link};
use super::spot_status_repository::{insert_status, retire_status};
use crate::domain::{
    DomainResult, NewSpotAggregate, SpotAggregate, SpotAggregateRepository, SpotDeviceLink,
};
use crate::infrastructure::database::entities::spot_device_link;

pub struct SeaOrmSpotAggregateRepository {
    db: DatabaseConnection,
}

impl SeaOrmSpotAggregateRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SpotAggregateRepository for SeaOrmSpotAggregateRepository {
    async fn create(&self, aggregate: NewSpotAggregate) -> DomainResult<()> {
        debug!(
            "Creating aggregate for spot {} with {} record(s)",
            aggregate.link.spot_id,
            aggregate.record_count()
        );

        let NewSpotAggregate {
            spot,
            device,
            status,
            link,
        } = aggregate;
        let (spot_id, device_id) = (link.spot_id.clone(), link.device_id.clone());

        let txn = self.db.begin().await?;
        insert_link(&txn, link).await?;

        // The new link is counted too.
        if count_active_links(&txn, spot_device_link::Column::DeviceId, &device_id).await? > 1 {
            return Err(SpotDeviceLink::device_in_use());
        }
        if count_active_links(&txn, spot_device_link::Column::SpotId, &spot_id).await? > 1 {
            return Err(SpotDeviceLink::spot_in_use());
        }

        if let Some(spot) = spot {
            insert_spot(&txn, spot).await?;
        }
        if let Some(device) = device {
            insert_device(&txn, device).await?;
        }
        if let Some(status) = status {
            insert_status(&txn, status).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn retire(&self, aggregate: &SpotAggregate) -> DomainResult<()> {
        debug!("Retiring aggregate for spot {}", aggregate.spot.id);

        let txn = self.db.begin().await?;
        retire_spot(&txn, &aggregate.spot).await?;
        retire_status(&txn, &aggregate.status).await?;
        retire_link(&txn, &aggregate.link).await?;
        retire_device(&txn, &aggregate.device).await?;
        txn.commit().await?;
        Ok(())
    }
}
