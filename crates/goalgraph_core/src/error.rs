//! Resolver-facing error taxonomy.
//!
//! # Responsibility
//! - Give every association, resolution and update operation one error type.
//! - Classify failures for the transport layer without variant matching.
//!
//! # Invariants
//! - Client errors are raised before any store round trip where possible.
//! - Store failures are surfaced, never swallowed or retried here.

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug)]
pub enum CoreError {
    /// Entity kind literal outside `{project, goal, task}`.
    UnknownEntityKind(String),
    /// Field name outside the entity's selectable field set.
    UnknownField(String),
    /// Identifier that is not a positive integer.
    InvalidIdentifier(String),
    /// Target row does not exist.
    NotFound { entity: &'static str, id: String },
    /// Sparse update with nothing to assign.
    EmptyUpdate(&'static str),
    /// Store rejected a write on uniqueness or referential grounds.
    ConstraintViolation(String),
    /// Request was cancelled before or during a round trip.
    Cancelled,
    /// Pool acquisition, busy wait or request deadline ran out.
    StoreTimeout(String),
    /// Any other store failure.
    StoreUnavailable(StoreError),
    /// Persisted row could not be decoded into the domain shape.
    InvalidData(String),
}

impl CoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether the caller supplied something invalid or absent.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownEntityKind(_)
                | Self::UnknownField(_)
                | Self::InvalidIdentifier(_)
                | Self::NotFound { .. }
                | Self::EmptyUpdate(_)
                | Self::ConstraintViolation(_)
        )
    }

    /// Whether the same request may succeed when issued again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreTimeout(_) | Self::StoreUnavailable(_))
    }

    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownEntityKind(_) => "unknown_entity_kind",
            Self::UnknownField(_) => "unknown_field",
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::NotFound { .. } => "not_found",
            Self::EmptyUpdate(_) => "empty_update",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::Cancelled => "cancelled",
            Self::StoreTimeout(_) => "store_timeout",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEntityKind(kind) => {
                write!(f, "unknown entity kind `{kind}`; expected project|goal|task")
            }
            Self::UnknownField(field) => write!(f, "unknown field `{field}`"),
            Self::InvalidIdentifier(raw) => write!(f, "invalid identifier `{raw}`"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::EmptyUpdate(entity) => write!(f, "{entity} update has no fields to assign"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::Cancelled => write!(f, "request cancelled"),
            Self::StoreTimeout(stage) => write!(f, "store timed out during {stage}"),
            Self::StoreUnavailable(err) => write!(f, "store unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid data: {message}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::ConstraintViolation(message) => Self::ConstraintViolation(message),
            StoreError::Cancelled => Self::Cancelled,
            StoreError::Timeout(stage) => Self::StoreTimeout(stage),
            StoreError::InvalidData(message) => Self::InvalidData(message),
            other @ (StoreError::NotFound | StoreError::Unavailable(_)) => {
                Self::StoreUnavailable(other)
            }
        }
    }
}
