use thiserror::Error;

/// Service layer errors - combines all error types.
///
/// A denied access check is not an error; see `AuthorizationResult`.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Casbin error: {0}")]
    CasbinError(#[from] casbin::Error),

    #[error(transparent)]
    DatabaseError(#[from] roster_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] roster_core::error::CoreError),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ServiceError {
    /// Returns `true` for malformed data or configuration, as opposed to
    /// lookups that simply found nothing.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(
            self,
            Self::CasbinError(_)
                | Self::CoreError(_)
                | Self::InvalidConfiguration(_)
                | Self::InvariantViolation(_)
                | Self::ParseError(_)
        )
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
