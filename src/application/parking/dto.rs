//! Parking use-case inputs and read models

/// Request to pair a device with a spot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpotCommand {
    pub spot_id: String,
    pub spot_name: String,
    pub device_id: String,
    pub device_specification: String,
}

/// Confirmation of a successful spot creation.
///
/// `message` differs per reconciliation branch; it is meant for people and
/// audit logs, not for parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpotOutcome {
    pub spot_id: String,
    pub device_id: String,
    pub message: String,
}

/// One row of the spot status listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotStatusView {
    pub spot_id: String,
    pub name: String,
    /// "Occupied" or "Free"
    pub status: String,
}

/// Whether a listed device currently guards a spot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceUsage {
    InUse,
    NotInUse,
}

impl DeviceUsage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InUse => "Registered and in use",
            Self::NotInUse => "Registered but not in use",
        }
    }
}

impl std::fmt::Display for DeviceUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the device listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceUsageView {
    pub device_id: String,
    pub usage: DeviceUsage,
}
