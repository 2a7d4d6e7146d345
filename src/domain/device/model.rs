//! Device domain entity

use chrono::{DateTime, Utc};

use crate::domain::SoftDelete;

/// IoT device bound (or bindable) to a parking spot
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Opaque identifier reported by the device itself
    pub id: String,
    /// Free-text hardware description
    pub specification: String,
    /// Whether the device is considered operational
    pub is_working: bool,
    pub registered_at: DateTime<Utc>,
    pub deletion: SoftDelete,
}

impl Device {
    pub fn new(id: impl Into<String>, specification: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            specification: specification.into(),
            is_working: true,
            registered_at: Utc::now(),
            deletion: SoftDelete::active(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.deletion.is_active()
    }

    /// Working devices that have not been retired show up in device listings.
    pub fn is_listed(&self) -> bool {
        self.is_working && self.is_active()
    }
}
