pub mod parking;
pub mod rate_limiter;

// Re-export key types for convenience
pub use parking::{
    CreateSpotCommand, CreateSpotOutcome, DeviceUsage, DeviceUsageView, ParkingService,
    SpotStatusView,
};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
