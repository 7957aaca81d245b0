use thiserror::Error;

/// Core-level errors.
///
/// Every variant is a fault: malformed data that must never be read as either
/// an allow or a deny.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown visibility: {0}")]
    UnknownVisibility(String),

    #[error("Unknown object type: {0}")]
    UnknownObjectType(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
