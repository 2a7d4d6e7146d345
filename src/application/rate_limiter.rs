//! Per-device request throttle
//!
//! Devices tend to repeat the same occupancy signal in quick bursts. Each
//! device gets one accepted request per cooldown window; everything else is
//! turned away before it reaches the occupancy state machine.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Throttle windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Minimum time between two accepted requests from one device
    pub cooldown: Duration,
    /// Entries idle for longer than this are dropped on the next call
    pub retention: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(10),
            retention: Duration::from_secs(10 * 60),
        }
    }
}

/// Cooldown gate keyed by device id.
///
/// One mutex guards the whole map. The critical section is a linear sweep
/// over tracked devices and never awaits.
pub struct RateLimiter {
    config: RateLimitConfig,
    last_accepted: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` and records the request when the device is outside
    /// its cooldown window.
    pub fn allow(&self, device_id: &str) -> bool {
        self.allow_at(device_id, Instant::now())
    }

    /// Same as [`allow`](Self::allow) with an explicit clock reading.
    pub fn allow_at(&self, device_id: &str, now: Instant) -> bool {
        let mut last_accepted = match self.last_accepted.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // A panic elsewhere cannot leave the map half-updated: every
                // mutation below is a single insert or remove.
                warn!("Rate limiter lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };

        let retention = self.config.retention;
        last_accepted.retain(|_, seen| now.saturating_duration_since(*seen) <= retention);

        if let Some(seen) = last_accepted.get(device_id) {
            if now.saturating_duration_since(*seen) < self.config.cooldown {
                debug!(device_id, "Request inside cooldown window");
                return false;
            }
        }

        last_accepted.insert(device_id.to_string(), now);
        true
    }

    /// Number of devices currently remembered.
    pub fn tracked_devices(&self) -> usize {
        match self.last_accepted.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
