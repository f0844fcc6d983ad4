//! In-memory repositories for tests and local development.
//!
//! Same observable semantics as the Postgres implementations, behind a
//! `std::sync::Mutex`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::application::ports::{DocumentRepository, JobRepository, RepositoryError};
use crate::domain::{
    Document, DocumentId, DocumentStatus, Job, JobId, JobOutcome, JobStatus, SessionId,
};

#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.lock().expect("job repository lock poisoned");
        if jobs
            .values()
            .any(|j| j.correlation_id == job.correlation_id)
        {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate correlation id: {}",
                job.correlation_id
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let jobs = self.jobs.lock().expect("job repository lock poisoned");
        Ok(jobs.get(&id).cloned())
    }

    async fn find_by_correlation_id(
        &self,
        correlation_id: Uuid,
    ) -> Result<Option<Job>, RepositoryError> {
        let jobs = self.jobs.lock().expect("job repository lock poisoned");
        Ok(jobs
            .values()
            .find(|j| j.correlation_id == correlation_id)
            .cloned())
    }

    async fn mark_running(&self, id: JobId, progress: u8) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.lock().expect("job repository lock poisoned");
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        job.status = JobStatus::Running;
        job.progress = progress;
        job.outcome = None;
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn set_progress(&self, id: JobId, progress: u8) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.lock().expect("job repository lock poisoned");
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        if job.status == JobStatus::Running {
            job.progress = job.progress.max(progress.min(100));
            job.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn finish(
        &self,
        id: JobId,
        status: JobStatus,
        outcome: &JobOutcome,
    ) -> Result<(), RepositoryError> {
        if !status.is_terminal() {
            return Err(RepositoryError::ConstraintViolation(format!(
                "finish requires a terminal status, got {}",
                status
            )));
        }
        let mut jobs = self.jobs.lock().expect("job repository lock poisoned");
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        job.status = status;
        job.outcome = Some(outcome.clone());
        if status == JobStatus::Completed {
            job.progress = 100;
        }
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        let jobs = self.jobs.lock().expect("job repository lock poisoned");
        Ok(jobs.values().filter(|j| j.status == status).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<HashMap<DocumentId, Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, document: &Document) -> Result<(), RepositoryError> {
        let mut documents = self
            .documents
            .lock()
            .expect("document repository lock poisoned");
        documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        let documents = self
            .documents
            .lock()
            .expect("document repository lock poisoned");
        Ok(documents.get(&id).cloned())
    }

    async fn list_by_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<Document>, RepositoryError> {
        let documents = self
            .documents
            .lock()
            .expect("document repository lock poisoned");
        Ok(documents
            .values()
            .filter(|d| d.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: DocumentId,
        status: DocumentStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut documents = self
            .documents
            .lock()
            .expect("document repository lock poisoned");
        let document = documents
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        document.status = status;
        document.error_message = error_message.map(String::from);
        document.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: DocumentId) -> Result<(), RepositoryError> {
        let mut documents = self
            .documents
            .lock()
            .expect("document repository lock poisoned");
        documents.remove(&id);
        Ok(())
    }

    async fn delete_by_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<DocumentId>, RepositoryError> {
        let mut documents = self
            .documents
            .lock()
            .expect("document repository lock poisoned");
        let ids: Vec<DocumentId> = documents
            .values()
            .filter(|d| d.session_id == session_id)
            .map(|d| d.id)
            .collect();
        for id in &ids {
            documents.remove(id);
        }
        Ok(ids)
    }
}
