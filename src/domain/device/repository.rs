//! Device repository interface

use async_trait::async_trait;

use super::model::Device;
use crate::domain::DomainResult;
use crate::shared::{PagedResult, PaginationParams};

#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Active device by id, for read-then-write sequences.
    async fn find_active(&self, id: &str) -> DomainResult<Option<Device>>;
    /// Active device by id, for pure existence checks.
    async fn find_active_untracked(&self, id: &str) -> DomainResult<Option<Device>>;
    /// Working, active devices ordered by id.
    async fn find_working_page(&self, page: PaginationParams) -> DomainResult<PagedResult<Device>>;
    async fn insert(&self, device: Device) -> DomainResult<()>;
    async fn insert_many(&self, devices: Vec<Device>) -> DomainResult<()>;
    async fn update(&self, device: Device) -> DomainResult<()>;
}
