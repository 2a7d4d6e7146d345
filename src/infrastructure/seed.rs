//! Demo data for fresh installations

use tracing::info;
use uuid::Uuid;

use crate::domain::{
    Device, DomainResult, NewSpotAggregate, ParkingSpot, RepositoryProvider, SpotDeviceLink,
    SpotStatus,
};
use crate::shared::PaginationParams;

const DEVICE_COUNT: usize = 17;
const SPOT_COUNT: usize = 10;

/// Load the demo fleet when the store holds no spots and no devices.
///
/// Seventeen devices, ten spots. The first ten devices are paired with the
/// spots in order, and the spots alternate occupied/free starting with
/// occupied. Returns `false` when the store already had data.
pub async fn seed_demo_data(repos: &dyn RepositoryProvider) -> DomainResult<bool> {
    let first = PaginationParams::new(1, 1)?;
    let has_devices = repos.devices().find_working_page(first).await?.total_count > 0;
    let has_spots = !repos.spots().find_all_active().await?.is_empty();
    if has_devices || has_spots {
        return Ok(false);
    }

    let mut devices: Vec<Device> = (1..=DEVICE_COUNT)
        .map(|n| Device::new(Uuid::new_v4().to_string(), format!("Raspberry Pi 5-{}", n)))
        .collect();
    let spare = devices.split_off(SPOT_COUNT);

    for (i, device) in devices.into_iter().enumerate() {
        let spot = ParkingSpot::new(Uuid::new_v4().to_string(), format!("Spot {}", i + 1));
        let mut status = SpotStatus::free(&spot.id);
        status.occupied = i % 2 == 0;

        let aggregate = NewSpotAggregate::new(SpotDeviceLink::new(&spot.id, &device.id))
            .with_spot(spot)
            .with_device(device)
            .with_status(status);
        repos.aggregates().create(aggregate).await?;
    }
    repos.devices().insert_many(spare).await?;

    info!(
        devices = DEVICE_COUNT,
        spots = SPOT_COUNT,
        "🌱 Demo data loaded"
    );
    Ok(true)
}
