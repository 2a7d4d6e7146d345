//! Parking spot repository interface

use async_trait::async_trait;

use super::model::ParkingSpot;
use crate::domain::DomainResult;

#[async_trait]
pub trait ParkingSpotRepository: Send + Sync {
    async fn find_active(&self, id: &str) -> DomainResult<Option<ParkingSpot>>;
    async fn find_active_untracked(&self, id: &str) -> DomainResult<Option<ParkingSpot>>;
    /// Every active spot, ordered by id.
    async fn find_all_active(&self) -> DomainResult<Vec<ParkingSpot>>;
    async fn insert(&self, spot: ParkingSpot) -> DomainResult<()>;
    async fn insert_many(&self, spots: Vec<ParkingSpot>) -> DomainResult<()>;
    async fn update(&self, spot: ParkingSpot) -> DomainResult<()>;
}
