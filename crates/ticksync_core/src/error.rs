//! Error types for the core data model.

use thiserror::Error;

/// Errors produced while encoding or decoding a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Snapshot could not be serialized to JSON.
    #[error("failed to serialize snapshot to JSON")]
    Serialize(#[source] serde_json::Error),

    /// Payload could not be parsed as a snapshot.
    #[error("failed to parse snapshot JSON")]
    Deserialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn deserialize_error_carries_source() {
        let err = crate::Snapshot::from_json("{").unwrap_err();
        assert!(matches!(err, SnapshotError::Deserialize(_)));
        assert!(err.source().is_some());
    }
}
