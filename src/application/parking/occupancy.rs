//! Occupancy state machine driven by device signals

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::rate_limiter::RateLimiter;
use crate::domain::{DomainError, DomainResult, Occupancy, RepositoryProvider};

/// Applies Occupy/Free signals coming from devices.
///
/// Every signal walks the same lookup chain (throttle, device, link, status)
/// and stops at the first failure. Only the final status update writes.
pub struct OccupancyService {
    repos: Arc<dyn RepositoryProvider>,
    rate_limiter: Arc<RateLimiter>,
}

impl OccupancyService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            repos,
            rate_limiter,
        }
    }

    pub async fn occupy(&self, device_id: &str) -> DomainResult<()> {
        self.transition(device_id, Occupancy::Occupied).await
    }

    pub async fn free(&self, device_id: &str) -> DomainResult<()> {
        self.transition(device_id, Occupancy::Free).await
    }

    async fn transition(&self, device_id: &str, target: Occupancy) -> DomainResult<()> {
        let result = self.try_transition(device_id, target).await;

        match &result {
            Ok(()) => {
                metrics::counter!(
                    "parking_occupancy_transitions_total",
                    "transition" => target.as_str()
                )
                .increment(1);
            }
            Err(e) => {
                metrics::counter!(
                    "parking_occupancy_rejections_total",
                    "transition" => target.as_str(),
                    "reason" => e.reason()
                )
                .increment(1);
            }
        }

        result
    }

    async fn try_transition(&self, device_id: &str, target: Occupancy) -> DomainResult<()> {
        if !self.rate_limiter.allow(device_id) {
            return Err(DomainError::RateLimited {
                device_id: device_id.to_string(),
            });
        }

        self.repos
            .devices()
            .find_active(device_id)
            .await?
            .ok_or_else(|| DomainError::InvalidDevice {
                device_id: device_id.to_string(),
            })?;

        let link = self
            .repos
            .links()
            .find_active_by_device(device_id)
            .await?
            .ok_or_else(|| DomainError::DeviceNotRegistered {
                device_id: device_id.to_string(),
            })?;

        let status = self
            .repos
            .statuses()
            .find_active_by_spot(&link.spot_id)
            .await?
            .ok_or_else(|| DomainError::StatusNotFound {
                spot_id: link.spot_id.clone(),
            })?;

        status.check_transition(target)?;

        // The conditional update is the serialisation point: if another
        // request flipped the row after our read, nothing matches.
        let applied = self.repos.statuses().transition(&status.id, target).await?;
        if !applied {
            debug!(device_id, spot_id = %link.spot_id, "Lost occupancy race");
            return Err(target.already_in(&link.spot_id));
        }

        info!(
            device_id,
            spot_id = %link.spot_id,
            status = %target,
            "Parking spot status changed"
        );
        Ok(())
    }
}
