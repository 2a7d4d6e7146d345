//! Spot–device link repository interface

use async_trait::async_trait;

use super::model::SpotDeviceLink;
use crate::domain::DomainResult;

#[async_trait]
pub trait SpotDeviceLinkRepository: Send + Sync {
    async fn find_active_by_device(&self, device_id: &str) -> DomainResult<Option<SpotDeviceLink>>;
    async fn find_active_by_spot(&self, spot_id: &str) -> DomainResult<Option<SpotDeviceLink>>;
    async fn insert(&self, link: SpotDeviceLink) -> DomainResult<()>;
    async fn insert_many(&self, links: Vec<SpotDeviceLink>) -> DomainResult<()>;
    async fn update(&self, link: SpotDeviceLink) -> DomainResult<()>;
}
