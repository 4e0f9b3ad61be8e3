use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, FlowError};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Count reported by the source before reading (informational).
    pub frames_expected: Option<u64>,
    pub frames_read: u64,
    pub records_decoded: u64,
    pub dropped_unsupported_version: u64,
    pub dropped_truncated: u64,
    pub records_excluded: u64,
    pub connections: u64,
    pub flows_incomplete: u64,
    pub flows_without_handshake: u64,
    pub flows_ambiguous: u64,
    pub connections_extracted: u64,
    pub connections_aborted: u64,
    pub artifacts_opened: u64,
    pub bytes_written: u64,
}

impl RunSummary {
    pub fn note_decode_failure(&mut self, err: &DecodeError) {
        match err {
            DecodeError::UnsupportedVersion(_) => self.dropped_unsupported_version += 1,
            DecodeError::Truncated { .. } => self.dropped_truncated += 1,
        }
    }

    pub fn note_flow_rejection(&mut self, err: &FlowError) {
        match err {
            FlowError::IncompleteFlow(_) => self.flows_incomplete += 1,
            FlowError::NoHandshakeObserved(..) => self.flows_without_handshake += 1,
            FlowError::AmbiguousHandshake(..) => self.flows_ambiguous += 1,
        }
    }

    pub fn frames_dropped(&self) -> u64 {
        self.dropped_unsupported_version + self.dropped_truncated
    }
}
