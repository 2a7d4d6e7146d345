//! Parking spot domain entity

use crate::domain::SoftDelete;

/// Physical parking space tracked by the system
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingSpot {
    pub id: String,
    /// Human-readable name, e.g. "Spot 4"
    pub name: String,
    pub deletion: SoftDelete,
}

impl ParkingSpot {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            deletion: SoftDelete::active(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.deletion.is_active()
    }
}
