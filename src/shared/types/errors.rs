use thiserror::Error;

/// How the boundary layer should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    RateLimited,
    InvalidArgument,
    Internal,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Rate limit exceeded for device {device_id}")]
    RateLimited { device_id: String },

    #[error("Invalid device: {device_id}")]
    InvalidDevice { device_id: String },

    #[error("Device not registered: {device_id}")]
    DeviceNotRegistered { device_id: String },

    #[error("Parking spot status not found for spot {spot_id}")]
    StatusNotFound { spot_id: String },

    #[error("{entity} not found with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Parking spot {spot_id} already occupied")]
    AlreadyOccupied { spot_id: String },

    #[error("Parking spot {spot_id} already free")]
    AlreadyFree { spot_id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Storage(#[from] InfraError),
}

impl DomainError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::RateLimited { .. } => ErrorClass::RateLimited,
            Self::InvalidDevice { .. }
            | Self::DeviceNotRegistered { .. }
            | Self::StatusNotFound { .. }
            | Self::NotFound { .. } => ErrorClass::NotFound,
            Self::AlreadyOccupied { .. } | Self::AlreadyFree { .. } | Self::Conflict(_) => {
                ErrorClass::Conflict
            }
            Self::InvalidArgument(_) => ErrorClass::InvalidArgument,
            Self::Storage(_) => ErrorClass::Internal,
        }
    }

    /// Short machine-friendly label, used as a metrics dimension.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::InvalidDevice { .. } => "invalid_device",
            Self::DeviceNotRegistered { .. } => "device_not_registered",
            Self::StatusNotFound { .. } => "status_not_found",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyOccupied { .. } => "already_occupied",
            Self::AlreadyFree { .. } => "already_free",
            Self::Conflict(_) => "conflict",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Storage(_) => "storage",
        }
    }

    /// Whether the failure is one of the expected, caller-recoverable outcomes.
    pub fn is_expected(&self) -> bool {
        self.class() != ErrorClass::Internal
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Storage(InfraError::Database(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_failures_classify_as_not_found() {
        let errors = [
            DomainError::InvalidDevice { device_id: "d".into() },
            DomainError::DeviceNotRegistered { device_id: "d".into() },
            DomainError::StatusNotFound { spot_id: "s".into() },
            DomainError::NotFound {
                entity: "Device",
                field: "id",
                value: "d".into(),
            },
        ];
        for e in errors {
            assert_eq!(e.class(), ErrorClass::NotFound, "{e}");
        }
    }

    #[test]
    fn state_violations_classify_as_conflict() {
        assert_eq!(
            DomainError::AlreadyOccupied { spot_id: "s".into() }.class(),
            ErrorClass::Conflict
        );
        assert_eq!(
            DomainError::AlreadyFree { spot_id: "s".into() }.class(),
            ErrorClass::Conflict
        );
        assert_eq!(
            DomainError::Conflict("spot in use".into()).class(),
            ErrorClass::Conflict
        );
    }

    #[test]
    fn storage_errors_are_internal_and_keep_source() {
        use std::error::Error as _;

        let err: DomainError = sea_orm::DbErr::Custom("disk gone".into()).into();
        assert_eq!(err.class(), ErrorClass::Internal);
        assert!(!err.is_expected());
        assert!(err.to_string().contains("disk gone"));
        assert!(err.source().is_some());
    }
}
