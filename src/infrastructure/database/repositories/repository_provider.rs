//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::{
    DeviceRepository, ParkingSpotRepository, RepositoryProvider, SpotAggregateRepository,
    SpotDeviceLinkRepository, SpotStatusRepository,
};

use super::device_repository::SeaOrmDeviceRepository;
use super::parking_spot_repository::SeaOrmParkingSpotRepository;
use super::spot_aggregate_repository::SeaOrmSpotAggregateRepository;
use super::spot_device_link_repository::SeaOrmSpotDeviceLinkRepository;
use super::spot_status_repository::SeaOrmSpotStatusRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let link = repos.links().find_active_by_device("D1").await?;
/// let status = repos.statuses().find_active_by_spot(&link.spot_id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    devices: SeaOrmDeviceRepository,
    spots: SeaOrmParkingSpotRepository,
    links: SeaOrmSpotDeviceLinkRepository,
    statuses: SeaOrmSpotStatusRepository,
    aggregates: SeaOrmSpotAggregateRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            devices: SeaOrmDeviceRepository::new(db.clone()),
            spots: SeaOrmParkingSpotRepository::new(db.clone()),
            links: SeaOrmSpotDeviceLinkRepository::new(db.clone()),
            statuses: SeaOrmSpotStatusRepository::new(db.clone()),
            aggregates: SeaOrmSpotAggregateRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn devices(&self) -> &dyn DeviceRepository {
        &self.devices
    }

    fn spots(&self) -> &dyn ParkingSpotRepository {
        &self.spots
    }

    fn links(&self) -> &dyn SpotDeviceLinkRepository {
        &self.links
    }

    fn statuses(&self) -> &dyn SpotStatusRepository {
        &self.statuses
    }

    fn aggregates(&self) -> &dyn SpotAggregateRepository {
        &self.aggregates
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Barrier;

    use super::*;
    use crate::application::{CreateSpotCommand, ParkingService, RateLimitConfig, RateLimiter};
    use crate::domain::{Device, DomainError, DomainResult};
    use crate::infrastructure::database::test_connection;
    use crate::shared::PaginationParams;

    fn service_over(repos: Arc<SeaOrmRepositoryProvider>) -> ParkingService {
        ParkingService::new(
            repos,
            Arc::new(RateLimiter::new(RateLimitConfig {
                cooldown: Duration::ZERO,
                retention: Duration::from_secs(60),
            })),
        )
    }

    async fn service() -> ParkingService {
        service_over(Arc::new(SeaOrmRepositoryProvider::new(test_connection().await)))
    }

    /// Run `call(service, 0)` and `call(service, 1)` at once on separate worker threads.
    async fn race<F, Fut, T>(service: Arc<ParkingService>, call: F) -> Vec<DomainResult<T>>
    where
        F: Fn(Arc<ParkingService>, usize) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = DomainResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let call = Arc::new(call);
        let barrier = Arc::new(Barrier::new(2));
        let tasks: Vec<_> = (0..2)
            .map(|i| {
                let (service, barrier, call) = (service.clone(), barrier.clone(), call.clone());
                tokio::spawn(async move {
                    barrier.wait().await;
                    call(service, i).await
                })
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap());
        }
        results
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
    async fn parking_flow_against_sqlite() {
        let service = service().await;
        let page = PaginationParams::new(1, 10).unwrap();

        service.create_spot(command("S1", "D1")).await.unwrap();
        service.occupy("D1").await.unwrap();
        assert!(matches!(
            service.occupy("D1").await,
            Err(DomainError::AlreadyOccupied { .. })
        ));

        let listing = service.list_spots_status(page).await.unwrap();
        assert_eq!(listing.items[0].status, "Occupied");

        service.delete_spot("S1").await.unwrap();
        assert!(matches!(
            service.delete_spot("S1").await,
            Err(DomainError::NotFound { .. })
        ));

        // Ids of retired records can be reused.
        service.create_spot(command("S1", "D1")).await.unwrap();
        service.occupy("D1").await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_pairings_of_one_device_leave_one_link() {
        for _ in 0..20 {
            let repos = Arc::new(SeaOrmRepositoryProvider::new(test_connection().await));
            repos
                .devices()
                .insert(Device::new("D1", "Raspberry Pi 5"))
                .await
                .unwrap();
            let service = Arc::new(service_over(repos.clone()));

            let results = race(service, |s, i| async move {
                s.create_spot(command(["SA", "SB"][i], "D1")).await
            })
            .await;

            let created = results.iter().filter(|r| r.is_ok()).count();
            let conflicts = results
                .iter()
                .filter(|r| matches!(r, Err(DomainError::Conflict(_))))
                .count();
            assert_eq!((created, conflicts), (1, 1), "{:?}", results);

            let link = repos.links().find_active_by_device("D1").await.unwrap().unwrap();
            let loser = if link.spot_id == "SA" { "SB" } else { "SA" };
            assert!(repos.links().find_active_by_spot(loser).await.unwrap().is_none());
            assert!(repos.spots().find_active(loser).await.unwrap().is_none());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deletes_succeed_once() {
        for _ in 0..20 {
            let service = Arc::new(service().await);
            service.create_spot(command("S1", "D1")).await.unwrap();

            let results = race(service, |s, _| async move { s.delete_spot("S1").await }).await;

            let deleted = results.iter().filter(|r| r.is_ok()).count();
            let missing = results
                .iter()
                .filter(|r| matches!(r, Err(DomainError::NotFound { .. })))
                .count();
            assert_eq!((deleted, missing), (1, 1), "{:?}", results);
        }
    }
}
