//! Spot aggregate repository interface

use async_trait::async_trait;

use super::model::{NewSpotAggregate, SpotAggregate};
use crate::domain::DomainResult;

/// All-or-nothing writes spanning the four parking records.
#[async_trait]
pub trait SpotAggregateRepository: Send + Sync {
    /// Insert every record of `aggregate` or none of them.
    ///
    /// Fails with `Conflict` when the device or the spot of the new link
    /// already has an active link at write time.
    async fn create(&self, aggregate: NewSpotAggregate) -> DomainResult<()>;

    /// Persist the retired state of all four records or none of them.
    ///
    /// Fails with `NotFound`, naming the first such record, when any of the
    /// four is no longer active at write time.
    async fn retire(&self, aggregate: &SpotAggregate) -> DomainResult<()>;
}
