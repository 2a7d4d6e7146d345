//! Spot listings and the retire cascade

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::dto::{DeviceUsage, DeviceUsageView, SpotStatusView};
use crate::domain::{DomainError, DomainResult, RepositoryProvider, SpotAggregate};
use crate::shared::{PagedResult, PaginationParams};

pub struct SpotLifecycleService {
    repos: Arc<dyn RepositoryProvider>,
}

impl SpotLifecycleService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Page over active spots. `total_count` is the size of the unpaged set;
    /// spots without an active status are dropped from the page.
    pub async fn list_spots_with_status(
        &self,
        page: PaginationParams,
    ) -> DomainResult<PagedResult<SpotStatusView>> {
        let spots = self.repos.spots().find_all_active().await?;
        let total = spots.len() as u64;

        let mut items = Vec::new();
        for spot in spots
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
        {
            if let Some(status) = self.repos.statuses().find_active_by_spot(&spot.id).await? {
                items.push(SpotStatusView {
                    spot_id: spot.id,
                    name: spot.name,
                    status: status.occupancy().to_string(),
                });
            }
        }

        Ok(PagedResult::new(items, total, page))
    }

    pub async fn list_devices(
        &self,
        page: PaginationParams,
    ) -> DomainResult<PagedResult<DeviceUsageView>> {
        let devices = self.repos.devices().find_working_page(page).await?;

        let mut items = Vec::with_capacity(devices.items.len());
        for device in &devices.items {
            let linked = self
                .repos
                .links()
                .find_active_by_device(&device.id)
                .await?
                .is_some();
            items.push(DeviceUsageView {
                device_id: device.id.clone(),
                usage: if linked {
                    DeviceUsage::InUse
                } else {
                    DeviceUsage::NotInUse
                },
            });
        }

        Ok(PagedResult::new(items, devices.total_count, page))
    }

    /// Retire a spot together with its status, link and device.
    pub async fn delete_spot(&self, spot_id: &str) -> DomainResult<()> {
        let mut aggregate = self.load_aggregate(spot_id).await?;

        aggregate.retire(Utc::now());
        self.repos.aggregates().retire(&aggregate).await?;

        info!(
            spot_id,
            device_id = %aggregate.device.id,
            "Parking spot deleted"
        );
        Ok(())
    }

    async fn load_aggregate(&self, spot_id: &str) -> DomainResult<SpotAggregate> {
        let spot = self
            .repos
            .spots()
            .find_active(spot_id)
            .await?
            .ok_or_else(|| not_found("Parking spot", "id", spot_id))?;

        let status = self
            .repos
            .statuses()
            .find_active_by_spot(spot_id)
            .await?
            .ok_or_else(|| not_found("Parking spot status", "spot_id", spot_id))?;

        let link = self
            .repos
            .links()
            .find_active_by_spot(spot_id)
            .await?
            .ok_or_else(|| not_found("Parking spot-device", "spot_id", spot_id))?;

        let device = self
            .repos
            .devices()
            .find_active(&link.device_id)
            .await?
            .ok_or_else(|| not_found("Device", "id", &link.device_id))?;

        Ok(SpotAggregate {
            spot,
            status,
            link,
            device,
        })
    }
}

fn not_found(entity: &'static str, field: &'static str, value: &str) -> DomainError {
    DomainError::NotFound {
        entity,
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Device, NewSpotAggregate, ParkingSpot, SpotDeviceLink, SpotStatus};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    async fn pair(repos: &InMemoryRepositoryProvider, spot_id: &str, device_id: &str) {
        repos
            .aggregates()
            .create(
                NewSpotAggregate::new(SpotDeviceLink::new(spot_id, device_id))
                    .with_spot(ParkingSpot::new(spot_id, format!("Spot {}", spot_id)))
                    .with_device(Device::new(device_id, "sensor"))
                    .with_status(SpotStatus::free(spot_id)),
            )
            .await
            .unwrap();
    }

    fn setup() -> (Arc<InMemoryRepositoryProvider>, SpotLifecycleService) {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let service = SpotLifecycleService::new(repos.clone());
        (repos, service)
    }

    fn page(number: u64, size: u64) -> PaginationParams {
        PaginationParams::new(number, size).unwrap()
    }

    #[tokio::test]
    async fn total_count_ignores_page_size() {
        let (repos, service) = setup();
        for i in 1..=3 {
            pair(&repos, &format!("S{}", i), &format!("D{}", i)).await;
        }

        let result = service.list_spots_with_status(page(1, 1)).await.unwrap();

        assert_eq!(result.total_count, 3);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].spot_id, "S1");
        assert_eq!(result.items[0].status, "Free");
        assert_eq!(result.total_pages, 3);
    }

    #[tokio::test]
    async fn page_far_past_the_end_is_empty() {
        let (repos, service) = setup();
        pair(&repos, "S1", "D1").await;

        let far = PaginationParams {
            page_number: u64::MAX,
            page_size: 2,
        };
        let result = service.list_spots_with_status(far).await.unwrap();

        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 1);
    }

    #[tokio::test]
    async fn spots_without_status_are_omitted() {
        let (repos, service) = setup();
        pair(&repos, "S1", "D1").await;
        repos
            .spots()
            .insert(ParkingSpot::new("S2", "bare"))
            .await
            .unwrap();

        let result = service.list_spots_with_status(page(1, 10)).await.unwrap();

        assert_eq!(result.total_count, 2);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].spot_id, "S1");
    }

    #[tokio::test]
    async fn occupied_spots_are_labelled() {
        let (repos, service) = setup();
        pair(&repos, "S1", "D1").await;
        let mut status = repos.statuses().find_active_by_spot("S1").await.unwrap().unwrap();
        status.occupied = true;
        repos.statuses().update(status).await.unwrap();

        let result = service.list_spots_with_status(page(1, 10)).await.unwrap();
        assert_eq!(result.items[0].status, "Occupied");
    }

    #[tokio::test]
    async fn devices_report_usage() {
        let (repos, service) = setup();
        pair(&repos, "S1", "1").await;
        repos.devices().insert(Device::new("2", "spare")).await.unwrap();

        let result = service.list_devices(page(1, 10)).await.unwrap();

        assert_eq!(result.total_count, 2);
        assert_eq!(
            result.items,
            vec![
                DeviceUsageView {
                    device_id: "1".into(),
                    usage: DeviceUsage::InUse
                },
                DeviceUsageView {
                    device_id: "2".into(),
                    usage: DeviceUsage::NotInUse
                },
            ]
        );
        assert_eq!(result.items[0].usage.as_str(), "Registered and in use");
        assert_eq!(result.items[1].usage.as_str(), "Registered but not in use");
    }

    #[tokio::test]
    async fn broken_devices_are_not_listed() {
        let (repos, service) = setup();
        let mut broken = Device::new("B1", "flaky");
        broken.is_working = false;
        repos.devices().insert(broken).await.unwrap();
        repos.devices().insert(Device::new("G1", "fine")).await.unwrap();

        let result = service.list_devices(page(1, 10)).await.unwrap();

        assert_eq!(result.total_count, 1);
        assert_eq!(result.items[0].device_id, "G1");
    }

    #[tokio::test]
    async fn delete_retires_all_four_records_with_one_timestamp() {
        let (repos, service) = setup();
        pair(&repos, "S1", "D1").await;

        service.delete_spot("S1").await.unwrap();

        let snapshot = repos.snapshot_for_spot("S1");
        let stamps: Vec<_> = snapshot.iter().map(|d| d.deleted_at).collect();
        assert_eq!(stamps.len(), 4);
        assert!(snapshot.iter().all(|d| d.is_deleted));
        assert!(stamps[0].is_some());
        assert!(stamps.iter().all(|s| *s == stamps[0]));

        assert!(repos.spots().find_active("S1").await.unwrap().is_none());
        assert!(repos.devices().find_active("D1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let (repos, service) = setup();
        pair(&repos, "S1", "D1").await;

        service.delete_spot("S1").await.unwrap();
        let again = service.delete_spot("S1").await;

        match again {
            Err(DomainError::NotFound { entity, .. }) => assert_eq!(entity, "Parking spot"),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn delete_names_the_first_missing_record() {
        let (repos, service) = setup();
        repos
            .spots()
            .insert(ParkingSpot::new("S1", "lonely"))
            .await
            .unwrap();

        match service.delete_spot("S1").await {
            Err(DomainError::NotFound { entity, .. }) => {
                assert_eq!(entity, "Parking spot status")
            }
            other => panic!("expected not found, got {:?}", other),
        }

        repos.statuses().insert(SpotStatus::free("S1")).await.unwrap();
        match service.delete_spot("S1").await {
            Err(DomainError::NotFound { entity, .. }) => {
                assert_eq!(entity, "Parking spot-device")
            }
            other => panic!("expected not found, got {:?}", other),
        }

        repos
            .links()
            .insert(SpotDeviceLink::new("S1", "ghost"))
            .await
            .unwrap();
        match service.delete_spot("S1").await {
            Err(DomainError::NotFound { entity, value, .. }) => {
                assert_eq!(entity, "Device");
                assert_eq!(value, "ghost");
            }
            other => panic!("expected not found, got {:?}", other),
        }

        // Nothing was retired along the way.
        assert!(repos.spots().find_active("S1").await.unwrap().is_some());
    }
}
