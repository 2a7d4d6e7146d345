//! Spot status domain entity

use uuid::Uuid;

use crate::domain::SoftDelete;
use crate::shared::errors::DomainError;

/// Occupancy state of a parking spot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupancy {
    Free,
    Occupied,
}

impl Occupancy {
    pub fn from_flag(occupied: bool) -> Self {
        if occupied {
            Self::Occupied
        } else {
            Self::Free
        }
    }

    pub fn is_occupied(self) -> bool {
        self == Self::Occupied
    }

    /// The state a status row must currently be in for a move to `self`.
    pub fn opposite(self) -> Self {
        match self {
            Self::Free => Self::Occupied,
            Self::Occupied => Self::Free,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Occupied => "Occupied",
        }
    }

    /// Error reported when a spot is asked to enter the state it is already in.
    pub fn already_in(self, spot_id: &str) -> DomainError {
        match self {
            Self::Occupied => DomainError::AlreadyOccupied {
                spot_id: spot_id.to_string(),
            },
            Self::Free => DomainError::AlreadyFree {
                spot_id: spot_id.to_string(),
            },
        }
    }
}

impl std::fmt::Display for Occupancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Occupied/free flag of one spot
#[derive(Debug, Clone, PartialEq)]
pub struct SpotStatus {
    pub id: String,
    pub spot_id: String,
    pub occupied: bool,
    pub deletion: SoftDelete,
}

impl SpotStatus {
    /// New statuses always start free.
    pub fn free(spot_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            spot_id: spot_id.into(),
            occupied: false,
            deletion: SoftDelete::active(),
        }
    }

    pub fn occupancy(&self) -> Occupancy {
        Occupancy::from_flag(self.occupied)
    }

    pub fn is_active(&self) -> bool {
        self.deletion.is_active()
    }

    /// Validate a move to `target`. Same-state moves are conflicts, never no-ops.
    pub fn check_transition(&self, target: Occupancy) -> Result<(), DomainError> {
        if self.occupancy() == target {
            return Err(target.already_in(&self.spot_id));
        }
        Ok(())
    }

    pub fn apply(&mut self, target: Occupancy) -> Result<(), DomainError> {
        self.check_transition(target)?;
        self.occupied = target.is_occupied();
        Ok(())
    }
}
