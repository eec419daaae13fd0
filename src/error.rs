use std::fmt;

use crate::store::StoreError;

/// Error type for engine operations.
///
/// Every variant is recoverable by the caller (retry, refresh, or surface to
/// the end user); none is fatal to the engine. The engine never retries
/// internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed input (blank ids, inverted availability window, etc).
    Validation(String),
    /// The actor lacks the rights for the requested transition.
    Authorization(String),
    /// The operation is not legal from the entity's current state.
    InvalidState { expected: String, actual: String },
    /// A concurrent mutation violated an exclusivity invariant.
    Conflict(String),
    /// A referenced entity is absent.
    NotFound { collection: String, id: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Validation(msg) => write!(f, "validation failed: {}", msg),
            EngineError::Authorization(msg) => write!(f, "not authorized: {}", msg),
            EngineError::InvalidState { expected, actual } => {
                write!(f, "invalid state: expected {}, found {}", expected, actual)
            }
            EngineError::Conflict(msg) => write!(f, "conflict: {}", msg),
            EngineError::NotFound { collection, id } => {
                write!(f, "not found: {}:{}", collection, id)
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict {
                collection,
                id,
                expected,
                actual,
            } => EngineError::Conflict(format!(
                "concurrent write on {}:{} (expected version {}, got {})",
                collection, id, expected, actual
            )),
            StoreError::NotFound { collection, id } => EngineError::NotFound { collection, id },
            StoreError::Serde(msg) => EngineError::Validation(msg),
            StoreError::Storage(msg) => EngineError::Conflict(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let err = EngineError::InvalidState {
            expected: "Pending".into(),
            actual: "Accepted".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid state: expected Pending, found Accepted"
        );

        let err = EngineError::NotFound {
            collection: "items".into(),
            id: "item-1".into(),
        };
        assert_eq!(err.to_string(), "not found: items:item-1");
    }

    #[test]
    fn store_conflict_maps_to_conflict() {
        let err: EngineError = StoreError::VersionConflict {
            collection: "items".into(),
            id: "item-1".into(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(matches!(err, EngineError::Conflict(_)));
    }
}
