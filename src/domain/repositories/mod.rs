//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::device::DeviceRepository;
use super::parking_spot::ParkingSpotRepository;
use super::spot_aggregate::SpotAggregateRepository;
use super::spot_device_link::SpotDeviceLinkRepository;
use super::spot_status::SpotStatusRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let link = repos.links().find_active_by_device("dev-1").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn devices(&self) -> &dyn DeviceRepository;
    fn spots(&self) -> &dyn ParkingSpotRepository;
    fn links(&self) -> &dyn SpotDeviceLinkRepository;
    fn statuses(&self) -> &dyn SpotStatusRepository;
    fn aggregates(&self) -> &dyn SpotAggregateRepository;
}
