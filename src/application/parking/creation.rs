//! Spot-creation reconciliation
//!
//! Linking a device to a spot has to cope with either record already being
//! present. The two lookups form a 2×2 presence matrix and each cell has its
//! own strategy with its own uniqueness checks.

use std::sync::Arc;

use tracing::info;

use super::dto::{CreateSpotCommand, CreateSpotOutcome};
use crate::domain::{
    Device, DomainError, DomainResult, NewSpotAggregate, ParkingSpot, RepositoryProvider,
    SpotDeviceLink, SpotStatus,
};

/// Reconciliation strategy selected from the presence matrix
#[derive(Debug, Clone, PartialEq)]
pub enum CreationStrategy {
    /// Neither spot nor device exists
    CreateBoth,
    /// The device exists, the spot does not
    AttachDeviceToNewSpot { device: Device },
    /// The spot exists, the device does not
    AttachNewDeviceToSpot { spot: ParkingSpot },
    /// Both already exist; validation only, never writes
    BothExist,
}

impl CreationStrategy {
    pub fn select(spot: Option<ParkingSpot>, device: Option<Device>) -> Self {
        match (spot, device) {
            (None, None) => Self::CreateBoth,
            (None, Some(device)) => Self::AttachDeviceToNewSpot { device },
            (Some(spot), None) => Self::AttachNewDeviceToSpot { spot },
            (Some(_), Some(_)) => Self::BothExist,
        }
    }

    /// Stable numeric code, 1..=4, as used in audit records.
    pub fn code(&self) -> u8 {
        match self {
            Self::CreateBoth => 1,
            Self::AttachDeviceToNewSpot { .. } => 2,
            Self::AttachNewDeviceToSpot { .. } => 3,
            Self::BothExist => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateBoth => "create_both",
            Self::AttachDeviceToNewSpot { .. } => "attach_device_to_new_spot",
            Self::AttachNewDeviceToSpot { .. } => "attach_new_device_to_spot",
            Self::BothExist => "both_exist",
        }
    }
}

/// Picks and executes a creation strategy against the record store
pub struct SpotCreationResolver {
    repos: Arc<dyn RepositoryProvider>,
}

impl SpotCreationResolver {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn create(&self, command: CreateSpotCommand) -> DomainResult<CreateSpotOutcome> {
        validate_command(&command)?;

        let strategy = self.resolve(&command).await?;
        let code = strategy.code();
        let name = strategy.name();

        let outcome = self.execute(strategy, command).await?;

        info!(
            spot_id = %outcome.spot_id,
            device_id = %outcome.device_id,
            strategy = name,
            strategy_code = code,
            "{}",
            outcome.message
        );
        metrics::counter!("parking_spot_creations_total", "strategy" => name).increment(1);

        Ok(outcome)
    }

    /// Non-mutating lookups that choose the strategy.
    pub async fn resolve(&self, command: &CreateSpotCommand) -> DomainResult<CreationStrategy> {
        let spot = self
            .repos
            .spots()
            .find_active_untracked(&command.spot_id)
            .await?;
        let device = self
            .repos
            .devices()
            .find_active_untracked(&command.device_id)
            .await?;

        Ok(CreationStrategy::select(spot, device))
    }

    async fn execute(
        &self,
        strategy: CreationStrategy,
        command: CreateSpotCommand,
    ) -> DomainResult<CreateSpotOutcome> {
        match strategy {
            CreationStrategy::CreateBoth => self.create_both(command).await,
            CreationStrategy::AttachDeviceToNewSpot { device } => {
                self.attach_device_to_new_spot(device, command).await
            }
            CreationStrategy::AttachNewDeviceToSpot { spot } => {
                self.attach_new_device_to_spot(spot, command).await
            }
            CreationStrategy::BothExist => Err(DomainError::Conflict(
                "Device and parking spot is already in use".to_string(),
            )),
        }
    }

    async fn create_both(&self, command: CreateSpotCommand) -> DomainResult<CreateSpotOutcome> {
        let aggregate =
            NewSpotAggregate::new(SpotDeviceLink::new(&command.spot_id, &command.device_id))
                .with_spot(ParkingSpot::new(&command.spot_id, &command.spot_name))
                .with_device(Device::new(
                    &command.device_id,
                    &command.device_specification,
                ))
                .with_status(SpotStatus::free(&command.spot_id));

        self.repos.aggregates().create(aggregate).await?;

        Ok(CreateSpotOutcome {
            spot_id: command.spot_id,
            device_id: command.device_id,
            message: "Parking spot created successfully with new device".to_string(),
        })
    }

    async fn attach_device_to_new_spot(
        &self,
        device: Device,
        command: CreateSpotCommand,
    ) -> DomainResult<CreateSpotOutcome> {
        if self
            .repos
            .links()
            .find_active_by_device(&device.id)
            .await?
            .is_some()
        {
            return Err(SpotDeviceLink::device_in_use());
        }

        let aggregate = NewSpotAggregate::new(SpotDeviceLink::new(&command.spot_id, &device.id))
            .with_spot(ParkingSpot::new(&command.spot_id, &command.spot_name))
            .with_status(SpotStatus::free(&command.spot_id));

        self.repos.aggregates().create(aggregate).await?;

        Ok(CreateSpotOutcome {
            message: format!(
                "The existing device has already been registered to the new parking spot: '{}'.",
                command.spot_name
            ),
            spot_id: command.spot_id,
            device_id: device.id,
        })
    }

    async fn attach_new_device_to_spot(
        &self,
        spot: ParkingSpot,
        command: CreateSpotCommand,
    ) -> DomainResult<CreateSpotOutcome> {
        if self
            .repos
            .links()
            .find_active_by_spot(&spot.id)
            .await?
            .is_some()
        {
            return Err(SpotDeviceLink::spot_in_use());
        }

        let mut aggregate =
            NewSpotAggregate::new(SpotDeviceLink::new(&spot.id, &command.device_id)).with_device(
                Device::new(&command.device_id, &command.device_specification),
            );

        // One active status per spot: keep an existing one rather than adding a second.
        if self
            .repos
            .statuses()
            .find_active_by_spot(&spot.id)
            .await?
            .is_none()
        {
            aggregate = aggregate.with_status(SpotStatus::free(&spot.id));
        }

        self.repos.aggregates().create(aggregate).await?;

        Ok(CreateSpotOutcome {
            message: format!(
                "The new device '{}' has been registered to the existing parking spot: '{}'.",
                command.device_specification, command.spot_name
            ),
            spot_id: spot.id,
            device_id: command.device_id,
        })
    }
}

fn validate_command(command: &CreateSpotCommand) -> DomainResult<()> {
    if command.spot_id.trim().is_empty() {
        return Err(DomainError::InvalidArgument(
            "Parking spot id cannot be empty".to_string(),
        ));
    }
    if command.device_id.trim().is_empty() {
        return Err(DomainError::InvalidArgument(
            "Device id cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn command(spot_id: &str, device_id: &str) -> CreateSpotCommand {
        CreateSpotCommand {
            spot_id: spot_id.to_string(),
            spot_name: format!("Spot {}", spot_id),
            device_id: device_id.to_string(),
            device_specification: "Raspberry Pi 5".to_string(),
        }
    }

    fn setup() -> (Arc<InMemoryRepositoryProvider>, SpotCreationResolver) {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let resolver = SpotCreationResolver::new(repos.clone());
        (repos, resolver)
    }

    #[test]
    fn selection_covers_the_presence_matrix() {
        let spot = ParkingSpot::new("S1", "Spot 1");
        let device = Device::new("D1", "sensor");

        assert_eq!(CreationStrategy::select(None, None), CreationStrategy::CreateBoth);
        assert_eq!(
            CreationStrategy::select(None, Some(device.clone())).code(),
            2
        );
        assert_eq!(CreationStrategy::select(Some(spot.clone()), None).code(), 3);
        assert_eq!(
            CreationStrategy::select(Some(spot), Some(device)),
            CreationStrategy::BothExist
        );
    }

    #[tokio::test]
    async fn create_both_inserts_the_whole_aggregate() {
        let (repos, resolver) = setup();

        let outcome = resolver.create(command("S1", "D1")).await.unwrap();

        assert_eq!(outcome.spot_id, "S1");
        assert_eq!(outcome.device_id, "D1");
        assert_eq!(outcome.message, "Parking spot created successfully with new device");

        assert!(repos.spots().find_active("S1").await.unwrap().is_some());
        assert!(repos.devices().find_active("D1").await.unwrap().is_some());
        let link = repos.links().find_active_by_device("D1").await.unwrap().unwrap();
        assert_eq!(link.spot_id, "S1");
        let status = repos.statuses().find_active_by_spot("S1").await.unwrap().unwrap();
        assert!(!status.occupied);
        assert_eq!(repos.record_counts(), (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn both_existing_is_a_conflict_without_writes() {
        let (repos, resolver) = setup();
        resolver.create(command("S1", "D1")).await.unwrap();
        let writes = repos.write_count();

        let result = resolver.create(command("S1", "D1")).await;

        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert_eq!(repos.write_count(), writes);
    }

    #[tokio::test]
    async fn linked_device_cannot_take_a_new_spot() {
        let (repos, resolver) = setup();
        resolver.create(command("S1", "D1")).await.unwrap();

        let result = resolver.create(command("S2", "D1")).await;

        match result {
            Err(DomainError::Conflict(msg)) => assert!(msg.contains("Device already in use")),
            other => panic!("expected conflict, got {:?}", other),
        }
        assert!(repos.spots().find_active("S2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unlinked_device_attaches_to_new_spot() {
        let (repos, resolver) = setup();
        repos
            .devices()
            .insert(Device::new("D7", "spare sensor"))
            .await
            .unwrap();

        let outcome = resolver.create(command("S7", "D7")).await.unwrap();

        assert_eq!(
            outcome.message,
            "The existing device has already been registered to the new parking spot: 'Spot S7'."
        );
        let link = repos.links().find_active_by_spot("S7").await.unwrap().unwrap();
        assert_eq!(link.device_id, "D7");
        assert!(repos.statuses().find_active_by_spot("S7").await.unwrap().is_some());
        // The existing device record is reused, not duplicated.
        assert_eq!(repos.record_counts(), (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn linked_spot_cannot_take_a_new_device() {
        let (repos, resolver) = setup();
        resolver.create(command("S1", "D1")).await.unwrap();

        let result = resolver.create(command("S1", "D2")).await;

        match result {
            Err(DomainError::Conflict(msg)) => assert!(msg.contains("Parking spot already in use")),
            other => panic!("expected conflict, got {:?}", other),
        }
        assert!(repos.devices().find_active("D2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn new_device_attaches_to_unlinked_spot() {
        let (repos, resolver) = setup();
        repos
            .spots()
            .insert(ParkingSpot::new("S3", "Spot S3"))
            .await
            .unwrap();

        let outcome = resolver.create(command("S3", "D3")).await.unwrap();

        assert_eq!(
            outcome.message,
            "The new device 'Raspberry Pi 5' has been registered to the existing parking spot: 'Spot S3'."
        );
        assert!(repos.devices().find_active("D3").await.unwrap().is_some());
        let status = repos.statuses().find_active_by_spot("S3").await.unwrap().unwrap();
        assert!(!status.occupied);
    }

    #[tokio::test]
    async fn each_branch_has_a_distinct_message() {
        let (repos, resolver) = setup();
        repos.devices().insert(Device::new("D2", "x")).await.unwrap();
        repos.spots().insert(ParkingSpot::new("S3", "y")).await.unwrap();

        let a = resolver.create(command("S1", "D1")).await.unwrap().message;
        let b = resolver.create(command("S2", "D2")).await.unwrap().message;
        let c = resolver.create(command("S3", "D3")).await.unwrap().message;

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn blank_ids_are_invalid_arguments() {
        let (repos, resolver) = setup();

        let result = resolver.create(command(" ", "D1")).await;

        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
        assert_eq!(repos.write_count(), 0);
    }
}
