//! Spot status repository interface

use async_trait::async_trait;

use super::model::{Occupancy, SpotStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait SpotStatusRepository: Send + Sync {
    async fn find_active_by_spot(&self, spot_id: &str) -> DomainResult<Option<SpotStatus>>;
    async fn insert(&self, status: SpotStatus) -> DomainResult<()>;
    async fn insert_many(&self, statuses: Vec<SpotStatus>) -> DomainResult<()>;
    async fn update(&self, status: SpotStatus) -> DomainResult<()>;

    /// Move an active status row to `target`, but only if it is currently in
    /// the opposite state. Returns `false` when no row matched, which means a
    /// concurrent request already applied the same transition.
    async fn transition(&self, status_id: &str, target: Occupancy) -> DomainResult<bool>;
}
