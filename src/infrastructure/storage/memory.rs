//! In-memory storage implementation

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{
    Device, DeviceRepository, DomainError, DomainResult, NewSpotAggregate, Occupancy, ParkingSpot,
    ParkingSpotRepository, RepositoryProvider, SoftDelete, SpotAggregate,
    SpotAggregateRepository, SpotDeviceLink, SpotDeviceLinkRepository, SpotStatus,
    SpotStatusRepository,
};
use crate::shared::{PagedResult, PaginationParams};

/// All four tables behind one lock so aggregate writes are all-or-nothing.
#[derive(Default)]
struct Tables {
    spots: BTreeMap<String, ParkingSpot>,
    devices: BTreeMap<String, Device>,
    links: BTreeMap<String, SpotDeviceLink>,
    statuses: BTreeMap<String, SpotStatus>,
}

impl Tables {
    fn put_spot(&mut self, spot: ParkingSpot) -> DomainResult<()> {
        if self.spots.get(&spot.id).is_some_and(ParkingSpot::is_active) {
            return Err(duplicate("Parking spot", &spot.id));
        }
        // A retired row with the same id is revived.
        self.spots.insert(spot.id.clone(), spot);
        Ok(())
    }

    fn put_device(&mut self, device: Device) -> DomainResult<()> {
        if self.devices.get(&device.id).is_some_and(Device::is_active) {
            return Err(duplicate("Device", &device.id));
        }
        self.devices.insert(device.id.clone(), device);
        Ok(())
    }

    fn put_link(&mut self, link: SpotDeviceLink) -> DomainResult<()> {
        if self.links.contains_key(&link.id) {
            return Err(duplicate("Parking spot-device", &link.id));
        }
        self.links.insert(link.id.clone(), link);
        Ok(())
    }

    fn put_status(&mut self, status: SpotStatus) -> DomainResult<()> {
        if self.statuses.contains_key(&status.id) {
            return Err(duplicate("Parking spot status", &status.id));
        }
        self.statuses.insert(status.id.clone(), status);
        Ok(())
    }

    /// One active link per device and per spot.
    fn check_link_free(&self, link: &SpotDeviceLink) -> DomainResult<()> {
        let mut active = self.links.values().filter(|l| l.is_active());
        if active.clone().any(|l| l.device_id == link.device_id) {
            return Err(SpotDeviceLink::device_in_use());
        }
        if active.any(|l| l.spot_id == link.spot_id) {
            return Err(SpotDeviceLink::spot_in_use());
        }
        Ok(())
    }

    fn check_new(&self, aggregate: &NewSpotAggregate) -> DomainResult<()> {
        self.check_link_free(&aggregate.link)?;
        if let Some(spot) = &aggregate.spot {
            if self.spots.get(&spot.id).is_some_and(ParkingSpot::is_active) {
                return Err(duplicate("Parking spot", &spot.id));
            }
        }
        if let Some(device) = &aggregate.device {
            if self.devices.get(&device.id).is_some_and(Device::is_active) {
                return Err(duplicate("Device", &device.id));
            }
        }
        if let Some(status) = &aggregate.status {
            if self.statuses.contains_key(&status.id) {
                return Err(duplicate("Parking spot status", &status.id));
            }
        }
        if self.links.contains_key(&aggregate.link.id) {
            return Err(duplicate("Parking spot-device", &aggregate.link.id));
        }
        Ok(())
    }
}

fn duplicate(entity: &str, id: &str) -> DomainError {
    DomainError::Conflict(format!("{} '{}' already exists", entity, id))
}

fn missing(entity: &'static str, id: &str) -> DomainError {
    DomainError::NotFound {
        entity,
        field: "id",
        value: id.to_string(),
    }
}

struct MemoryStore {
    tables: RwLock<Tables>,
    writes: AtomicUsize,
}

impl MemoryStore {
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|poisoned| {
            warn!("In-memory store lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| {
            warn!("In-memory store lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Run `op` under the write lock, counting it when it succeeds.
    fn mutate<T>(&self, op: impl FnOnce(&mut Tables) -> DomainResult<T>) -> DomainResult<T> {
        let mut tables = self.write();
        let result = op(&mut tables)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(result)
    }
}

/// In-memory record store for development and testing.
///
/// Records are ordered by id, which gives listings the same order the
/// SQLite store produces.
pub struct InMemoryRepositoryProvider {
    store: Arc<MemoryStore>,
    devices: InMemoryDeviceRepository,
    spots: InMemoryParkingSpotRepository,
    links: InMemorySpotDeviceLinkRepository,
    statuses: InMemorySpotStatusRepository,
    aggregates: InMemorySpotAggregateRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore {
            tables: RwLock::new(Tables::default()),
            writes: AtomicUsize::new(0),
        });
        Self {
            devices: InMemoryDeviceRepository(store.clone()),
            spots: InMemoryParkingSpotRepository(store.clone()),
            links: InMemorySpotDeviceLinkRepository(store.clone()),
            statuses: InMemorySpotStatusRepository(store.clone()),
            aggregates: InMemorySpotAggregateRepository(store.clone()),
            store,
        }
    }

    /// Number of successful write operations so far.
    pub fn write_count(&self) -> usize {
        self.store.writes.load(Ordering::SeqCst)
    }

    /// Stored (spots, devices, links, statuses), retired rows included.
    pub fn record_counts(&self) -> (usize, usize, usize, usize) {
        let tables = self.store.read();
        (
            tables.spots.len(),
            tables.devices.len(),
            tables.links.len(),
            tables.statuses.len(),
        )
    }

    /// Deletion markers of a spot, its statuses, its links and the devices
    /// those links point at, retired rows included.
    pub fn snapshot_for_spot(&self, spot_id: &str) -> Vec<SoftDelete> {
        let tables = self.store.read();
        let mut markers = Vec::new();

        if let Some(spot) = tables.spots.get(spot_id) {
            markers.push(spot.deletion.clone());
        }
        markers.extend(
            tables
                .statuses
                .values()
                .filter(|s| s.spot_id == spot_id)
                .map(|s| s.deletion.clone()),
        );
        for link in tables.links.values().filter(|l| l.spot_id == spot_id) {
            markers.push(link.deletion.clone());
            if let Some(device) = tables.devices.get(&link.device_id) {
                markers.push(device.deletion.clone());
            }
        }
        markers
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
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

// ── Devices ────────────────────────────────────────────────────────

struct InMemoryDeviceRepository(Arc<MemoryStore>);

#[async_trait]
impl DeviceRepository for InMemoryDeviceRepository {
    async fn find_active(&self, id: &str) -> DomainResult<Option<Device>> {
        let tables = self.0.read();
        Ok(tables.devices.get(id).filter(|d| d.is_active()).cloned())
    }

    async fn find_active_untracked(&self, id: &str) -> DomainResult<Option<Device>> {
        self.find_active(id).await
    }

    async fn find_working_page(&self, page: PaginationParams) -> DomainResult<PagedResult<Device>> {
        let tables = self.0.read();
        let listed: Vec<&Device> = tables.devices.values().filter(|d| d.is_listed()).collect();
        let total = listed.len() as u64;
        let items = listed
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .cloned()
            .collect();
        Ok(PagedResult::new(items, total, page))
    }

    async fn insert(&self, device: Device) -> DomainResult<()> {
        self.0.mutate(|t| t.put_device(device))
    }

    async fn insert_many(&self, devices: Vec<Device>) -> DomainResult<()> {
        self.0.mutate(|t| {
            for device in &devices {
                if t.devices.get(&device.id).is_some_and(Device::is_active) {
                    return Err(duplicate("Device", &device.id));
                }
            }
            devices.into_iter().try_for_each(|d| t.put_device(d))
        })
    }

    async fn update(&self, device: Device) -> DomainResult<()> {
        self.0.mutate(|t| match t.devices.get_mut(&device.id) {
            Some(slot) => {
                *slot = device;
                Ok(())
            }
            None => Err(missing("Device", &device.id)),
        })
    }
}

// ── Parking spots ──────────────────────────────────────────────────

struct InMemoryParkingSpotRepository(Arc<MemoryStore>);

#[async_trait]
impl ParkingSpotRepository for InMemoryParkingSpotRepository {
    async fn find_active(&self, id: &str) -> DomainResult<Option<ParkingSpot>> {
        let tables = self.0.read();
        Ok(tables.spots.get(id).filter(|s| s.is_active()).cloned())
    }

    async fn find_active_untracked(&self, id: &str) -> DomainResult<Option<ParkingSpot>> {
        self.find_active(id).await
    }

    async fn find_all_active(&self) -> DomainResult<Vec<ParkingSpot>> {
        let tables = self.0.read();
        Ok(tables
            .spots
            .values()
            .filter(|s| s.is_active())
            .cloned()
            .collect())
    }

    async fn insert(&self, spot: ParkingSpot) -> DomainResult<()> {
        self.0.mutate(|t| t.put_spot(spot))
    }

    async fn insert_many(&self, spots: Vec<ParkingSpot>) -> DomainResult<()> {
        self.0.mutate(|t| {
            for spot in &spots {
                if t.spots.get(&spot.id).is_some_and(ParkingSpot::is_active) {
                    return Err(duplicate("Parking spot", &spot.id));
                }
            }
            spots.into_iter().try_for_each(|s| t.put_spot(s))
        })
    }

    async fn update(&self, spot: ParkingSpot) -> DomainResult<()> {
        self.0.mutate(|t| match t.spots.get_mut(&spot.id) {
            Some(slot) => {
                *slot = spot;
                Ok(())
            }
            None => Err(missing("Parking spot", &spot.id)),
        })
    }
}

// ── Links ──────────────────────────────────────────────────────────

struct InMemorySpotDeviceLinkRepository(Arc<MemoryStore>);

#[async_trait]
impl SpotDeviceLinkRepository for InMemorySpotDeviceLinkRepository {
    async fn find_active_by_device(&self, device_id: &str) -> DomainResult<Option<SpotDeviceLink>> {
        let tables = self.0.read();
        Ok(tables
            .links
            .values()
            .find(|l| l.device_id == device_id && l.is_active())
            .cloned())
    }

    async fn find_active_by_spot(&self, spot_id: &str) -> DomainResult<Option<SpotDeviceLink>> {
        let tables = self.0.read();
        Ok(tables
            .links
            .values()
            .find(|l| l.spot_id == spot_id && l.is_active())
            .cloned())
    }

    async fn insert(&self, link: SpotDeviceLink) -> DomainResult<()> {
        self.0.mutate(|t| t.put_link(link))
    }

    async fn insert_many(&self, links: Vec<SpotDeviceLink>) -> DomainResult<()> {
        self.0.mutate(|t| {
            if let Some(taken) = links.iter().find(|l| t.links.contains_key(&l.id)) {
                return Err(duplicate("Parking spot-device", &taken.id));
            }
            links.into_iter().try_for_each(|l| t.put_link(l))
        })
    }

    async fn update(&self, link: SpotDeviceLink) -> DomainResult<()> {
        self.0.mutate(|t| match t.links.get_mut(&link.id) {
            Some(slot) => {
                *slot = link;
                Ok(())
            }
            None => Err(missing("Parking spot-device", &link.id)),
        })
    }
}

// ── Statuses ───────────────────────────────────────────────────────

struct InMemorySpotStatusRepository(Arc<MemoryStore>);

#[async_trait]
impl SpotStatusRepository for InMemorySpotStatusRepository {
    async fn find_active_by_spot(&self, spot_id: &str) -> DomainResult<Option<SpotStatus>> {
        let tables = self.0.read();
        Ok(tables
            .statuses
            .values()
            .find(|s| s.spot_id == spot_id && s.is_active())
            .cloned())
    }

    async fn insert(&self, status: SpotStatus) -> DomainResult<()> {
        self.0.mutate(|t| t.put_status(status))
    }

    async fn insert_many(&self, statuses: Vec<SpotStatus>) -> DomainResult<()> {
        self.0.mutate(|t| {
            if let Some(taken) = statuses.iter().find(|s| t.statuses.contains_key(&s.id)) {
                return Err(duplicate("Parking spot status", &taken.id));
            }
            statuses.into_iter().try_for_each(|s| t.put_status(s))
        })
    }

    async fn update(&self, status: SpotStatus) -> DomainResult<()> {
        self.0.mutate(|t| match t.statuses.get_mut(&status.id) {
            Some(slot) => {
                *slot = status;
                Ok(())
            }
            None => Err(missing("Parking spot status", &status.id)),
        })
    }

    async fn transition(&self, status_id: &str, target: Occupancy) -> DomainResult<bool> {
        let mut tables = self.0.write();
        let row = tables
            .statuses
            .get_mut(status_id)
            .filter(|s| s.is_active() && s.occupancy() == target.opposite());

        match row {
            Some(status) => {
                status.occupied = target.is_occupied();
                self.0.writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── Aggregates ─────────────────────────────────────────────────────

struct InMemorySpotAggregateRepository(Arc<MemoryStore>);

#[async_trait]
impl SpotAggregateRepository for InMemorySpotAggregateRepository {
    async fn create(&self, aggregate: NewSpotAggregate) -> DomainResult<()> {
        self.0.mutate(|t| {
            t.check_new(&aggregate)?;
            if let Some(spot) = aggregate.spot {
                t.put_spot(spot)?;
            }
            if let Some(device) = aggregate.device {
                t.put_device(device)?;
            }
            if let Some(status) = aggregate.status {
                t.put_status(status)?;
            }
            t.put_link(aggregate.link)
        })
    }

    async fn retire(&self, aggregate: &SpotAggregate) -> DomainResult<()> {
        self.0.mutate(|t| {
            if !t.spots.get(&aggregate.spot.id).is_some_and(ParkingSpot::is_active) {
                return Err(missing("Parking spot", &aggregate.spot.id));
            }
            if !t.statuses.get(&aggregate.status.id).is_some_and(SpotStatus::is_active) {
                return Err(missing("Parking spot status", &aggregate.status.id));
            }
            if !t.links.get(&aggregate.link.id).is_some_and(SpotDeviceLink::is_active) {
                return Err(missing("Parking spot-device", &aggregate.link.id));
            }
            if !t.devices.get(&aggregate.device.id).is_some_and(Device::is_active) {
                return Err(missing("Device", &aggregate.device.id));
            }

            t.spots
                .insert(aggregate.spot.id.clone(), aggregate.spot.clone());
            t.statuses
                .insert(aggregate.status.id.clone(), aggregate.status.clone());
            t.links
                .insert(aggregate.link.id.clone(), aggregate.link.clone());
            t.devices
                .insert(aggregate.device.id.clone(), aggregate.device.clone());
            Ok(())
        })
    }
}
