use serde::{Deserialize, Serialize};

/// Result payload of a finished job.
///
/// Keyed by the terminal status: a Completed job carries `Success`, a Failed
/// job carries `Failure`. Serialized as tagged JSON so polling consumers can
/// handle both shapes exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Success {
        chunk_count: usize,
        processing_time_ms: u64,
        index_reference: String,
    },
    Failure {
        error_type: String,
        error_message: String,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success { .. })
    }
}
