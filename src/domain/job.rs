use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{DocumentId, JobOutcome, JobStatus};

/// An asynchronous unit of work tracked for status polling.
///
/// `correlation_id` is the id of the queue message that carries this job and
/// is unique across jobs, so a redelivered message always resolves to the
/// same row. Progress is non-decreasing while the job is Running; `outcome`
/// is populated exactly when the job leaves Running.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub document_id: DocumentId,
    pub correlation_id: Uuid,
    pub job_type: String,
    pub status: JobStatus,
    pub progress: u8,
    pub outcome: Option<JobOutcome>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const JOB_TYPE_DOCUMENT_INGESTION: &str = "document_ingestion";

impl Job {
    pub fn new(document_id: DocumentId, correlation_id: Uuid, job_type: String) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            document_id,
            correlation_id,
            job_type,
            status: JobStatus::Pending,
            progress: 0,
            outcome: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
