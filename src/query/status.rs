//! Mapping from engine execution states to lakeq statuses.

use crate::engine::{ExecutionMetadata, RemoteState};
use crate::error::{LakeqError, Result};
use crate::query::ExecutionStatus;

/// Collapses the engine's state vocabulary into Running / Succeeded / Failed.
///
/// The mapping is total over the known vocabulary. Any other value is a
/// protocol defect and yields `LakeqError::UnknownState` carrying the raw value,
/// never a Failed status.
pub fn map_state(raw: &str) -> Result<ExecutionStatus> {
    match RemoteState::parse(raw) {
        Some(RemoteState::Succeeded) => Ok(ExecutionStatus::Succeeded),
        // failure modes
        Some(RemoteState::Failed) | Some(RemoteState::Cancelled) => Ok(ExecutionStatus::Failed),
        // still going
        Some(RemoteState::Running) | Some(RemoteState::Queued) => Ok(ExecutionStatus::Running),
        None => Err(LakeqError::unknown_state(raw)),
    }
}

/// Maps the state carried by a metadata record.
pub fn map_metadata(metadata: &ExecutionMetadata) -> Result<ExecutionStatus> {
    map_state(&metadata.state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_table() {
        let cases = [
            ("SUCCEEDED", ExecutionStatus::Succeeded),
            ("FAILED", ExecutionStatus::Failed),
            ("CANCELLED", ExecutionStatus::Failed),
            ("RUNNING", ExecutionStatus::Running),
            ("QUEUED", ExecutionStatus::Running),
        ];
        for (raw, expected) in cases {
            assert_eq!(map_state(raw).unwrap(), expected, "state {raw}");
        }
    }

    #[test]
    fn test_mapping_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(map_state("QUEUED").unwrap(), ExecutionStatus::Running);
        }
    }

    #[test]
    fn test_unknown_state_is_distinct_error() {
        let err = map_state("PAUSED").unwrap_err();
        assert!(err.is_unknown_state());
        match err {
            LakeqError::UnknownState { raw } => assert_eq!(raw, "PAUSED"),
            other => panic!("Expected UnknownState, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_state_is_unknown() {
        assert!(map_state("").unwrap_err().is_unknown_state());
    }

    #[test]
    fn test_map_metadata() {
        let metadata = ExecutionMetadata::new("q-1", "CANCELLED");
        assert_eq!(map_metadata(&metadata).unwrap(), ExecutionStatus::Failed);
    }
}
