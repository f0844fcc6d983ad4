use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use super::map_sqlx_error;
use crate::application::ports::{DocumentRepository, RepositoryError};
use crate::domain::{ContentType, Document, DocumentId, DocumentStatus, SessionId, StoragePath};

pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str =
    "id, session_id, name, content_type, storage_path, status, error_message, created_at, updated_at";

fn document_from_row(row: &PgRow) -> Result<Document, RepositoryError> {
    let get_err = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());

    let status: String = row.try_get("status").map_err(get_err)?;
    let status = status
        .parse::<DocumentStatus>()
        .map_err(RepositoryError::QueryFailed)?;

    let content_type: String = row.try_get("content_type").map_err(get_err)?;
    let content_type = ContentType::from_mime(&content_type).ok_or_else(|| {
        RepositoryError::QueryFailed(format!("unknown content type: {}", content_type))
    })?;

    let storage_path: String = row.try_get("storage_path").map_err(get_err)?;

    Ok(Document {
        id: DocumentId::from_uuid(row.try_get("id").map_err(get_err)?),
        session_id: SessionId::from_uuid(row.try_get("session_id").map_err(get_err)?),
        name: row.try_get("name").map_err(get_err)?,
        content_type,
        storage_path: StoragePath::from_raw(storage_path),
        status,
        error_message: row.try_get("error_message").map_err(get_err)?,
        created_at: row.try_get("created_at").map_err(get_err)?,
        updated_at: row.try_get("updated_at").map_err(get_err)?,
    })
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    #[instrument(skip(self, document), fields(document_id = %document.id))]
    async fn create(&self, document: &Document) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, session_id, name, content_type, storage_path, status, error_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(document.id.as_uuid())
        .bind(document.session_id.as_uuid())
        .bind(&document.name)
        .bind(document.content_type.as_mime())
        .bind(document.storage_path.as_str())
        .bind(document.status.as_str())
        .bind(&document.error_message)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(document_id = %id))]
    async fn get_by_id(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(document_from_row).transpose()
    }

    #[instrument(skip(self), fields(session_id = %session_id))]
    async fn list_by_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE session_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(document_from_row).collect()
    }

    #[instrument(skip(self, error_message), fields(document_id = %id, status = %status))]
    async fn update_status(
        &self,
        id: DocumentId,
        status: DocumentStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE documents
            SET status = $2, error_message = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(document_id = %id))]
    async fn delete(&self, id: DocumentId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %session_id))]
    async fn delete_by_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<DocumentId>, RepositoryError> {
        let rows = sqlx::query("DELETE FROM documents WHERE session_id = $1 RETURNING id")
            .bind(session_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| {
                row.try_get::<Uuid, _>("id")
                    .map(DocumentId::from_uuid)
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
            })
            .collect()
    }
}
