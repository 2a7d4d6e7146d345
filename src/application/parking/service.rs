//! Parking service facade
//!
//! Single entry point the HTTP layer talks to. Each operation delegates to
//! the component that owns it.

use std::sync::Arc;

use super::creation::SpotCreationResolver;
use super::dto::{CreateSpotCommand, CreateSpotOutcome, DeviceUsageView, SpotStatusView};
use super::lifecycle::SpotLifecycleService;
use super::occupancy::OccupancyService;
use crate::application::rate_limiter::RateLimiter;
use crate::domain::{DomainResult, RepositoryProvider};
use crate::shared::{PagedResult, PaginationParams};

pub struct ParkingService {
    occupancy: OccupancyService,
    creation: SpotCreationResolver,
    lifecycle: SpotLifecycleService,
}

impl ParkingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            occupancy: OccupancyService::new(repos.clone(), rate_limiter),
            creation: SpotCreationResolver::new(repos.clone()),
            lifecycle: SpotLifecycleService::new(repos),
        }
    }

    pub async fn occupy(&self, device_id: &str) -> DomainResult<()> {
        self.occupancy.occupy(device_id).await
    }

    pub async fn free(&self, device_id: &str) -> DomainResult<()> {
        self.occupancy.free(device_id).await
    }

    pub async fn create_spot(&self, command: CreateSpotCommand) -> DomainResult<CreateSpotOutcome> {
        self.creation.create(command).await
    }

    pub async fn delete_spot(&self, spot_id: &str) -> DomainResult<()> {
        self.lifecycle.delete_spot(spot_id).await
    }

    pub async fn list_devices(
        &self,
        page: PaginationParams,
    ) -> DomainResult<PagedResult<DeviceUsageView>> {
        self.lifecycle.list_devices(page).await
    }

    pub async fn list_spots_status(
        &self,
        page: PaginationParams,
    ) -> DomainResult<PagedResult<SpotStatusView>> {
        self.lifecycle.list_spots_with_status(page).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::application::rate_limiter::RateLimitConfig;
    use crate::domain::DomainError;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn service() -> ParkingService {
        ParkingService::new(
            Arc::new(InMemoryRepositoryProvider::new()),
            Arc::new(RateLimiter::new(RateLimitConfig {
                cooldown: Duration::ZERO,
                retention: Duration::from_secs(60),
            })),
        )
    }

    fn command(spot_id: &str, device_id: &str) -> CreateSpotCommand {
        CreateSpotCommand {
            spot_id: spot_id.into(),
            spot_name: format!("Spot {}", spot_id),
            device_id: device_id.into(),
            device_specification: "Raspberry Pi 5".into(),
        }
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let service = service();
        let page = PaginationParams::new(1, 10).unwrap();

        service.create_spot(command("S1", "D1")).await.unwrap();
        service.occupy("D1").await.unwrap();

        let spots = service.list_spots_status(page).await.unwrap();
        assert_eq!(spots.items[0].status, "Occupied");

        service.free("D1").await.unwrap();
        service.delete_spot("S1").await.unwrap();

        assert_eq!(service.list_spots_status(page).await.unwrap().total_count, 0);
        assert_eq!(service.list_devices(page).await.unwrap().total_count, 0);
        assert!(matches!(
            service.occupy("D1").await,
            Err(DomainError::InvalidDevice { .. })
        ));
    }

    #[tokio::test]
    async fn deleted_pair_can_be_created_again() {
        let service = service();

        service.create_spot(command("S1", "D1")).await.unwrap();
        service.delete_spot("S1").await.unwrap();
        let outcome = service.create_spot(command("S1", "D1")).await.unwrap();

        assert_eq!(outcome.message, "Parking spot created successfully with new device");
        service.occupy("D1").await.unwrap();
    }
}
