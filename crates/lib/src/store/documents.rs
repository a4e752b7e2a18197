//! Uploaded study documents and their extracted text.

use super::parse_timestamp;
use crate::errors::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;
use turso::{Database, Row, params};
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str = "id, owner_id, original_name, stored_name, file_path, file_size, \
     mime_type, word_count, text_preview, full_text, topics, subject, status, error_message, \
     uploaded_at, last_accessed_at";

/// Lifecycle of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Ready,
    Error,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "ready" => Ok(Self::Ready),
            "error" => Ok(Self::Error),
            other => Err(StorageError::DataIntegrity(format!(
                "Unknown document status '{other}'"
            ))),
        }
    }
}

/// A fully hydrated document row, including the extracted text.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedDocument {
    pub id: String,
    pub owner_id: String,
    pub original_name: String,
    pub stored_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub word_count: i64,
    pub text_preview: String,
    pub full_text: String,
    pub topics: Vec<String>,
    pub subject: String,
    pub status: DocumentStatus,
    pub error_message: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl TryFrom<&Row> for UploadedDocument {
    type Error = StorageError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let topics_json: String = row.get(10)?;
        let topics: Vec<String> = serde_json::from_str(&topics_json).map_err(|e| {
            StorageError::DataIntegrity(format!("Failed to parse topics '{topics_json}': {e}"))
        })?;
        let status_str: String = row.get(12)?;
        let uploaded_at_str: String = row.get(14)?;
        let last_accessed: Option<String> = row.get(15)?;

        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            original_name: row.get(2)?,
            stored_name: row.get(3)?,
            file_path: row.get(4)?,
            file_size: row.get(5)?,
            mime_type: row.get(6)?,
            word_count: row.get(7)?,
            text_preview: row.get(8)?,
            full_text: row.get(9)?,
            topics,
            subject: row.get(11)?,
            status: status_str.parse()?,
            error_message: row.get(13)?,
            uploaded_at: parse_timestamp(&uploaded_at_str)?,
            last_accessed_at: last_accessed.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

/// The listing projection, without the full extracted text.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub original_name: String,
    pub file_size: i64,
    pub word_count: i64,
    pub subject: String,
    pub topics: Vec<String>,
    pub status: DocumentStatus,
    pub text_preview: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Fields required to record a new upload.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub owner_id: String,
    pub original_name: String,
    pub stored_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub word_count: i64,
    pub text_preview: String,
    pub full_text: String,
    pub topics: Vec<String>,
    pub subject: String,
    pub status: DocumentStatus,
    pub error_message: Option<String>,
}

/// Inserts a document row and returns the hydrated record.
pub async fn insert_document(
    db: &Database,
    new_doc: NewDocument,
) -> Result<UploadedDocument, StorageError> {
    let conn = db.connect()?;
    let id = Uuid::new_v4().to_string();
    let topics_json = serde_json::to_string(&new_doc.topics)
        .map_err(|e| StorageError::DataIntegrity(format!("Failed to serialize topics: {e}")))?;

    conn.execute(
        "INSERT INTO documents (id, owner_id, original_name, stored_name, file_path, file_size, \
         mime_type, word_count, text_preview, full_text, topics, subject, status, error_message) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id.clone(),
            new_doc.owner_id,
            new_doc.original_name,
            new_doc.stored_name,
            new_doc.file_path,
            new_doc.file_size,
            new_doc.mime_type,
            new_doc.word_count,
            new_doc.text_preview,
            new_doc.full_text,
            topics_json,
            new_doc.subject,
            new_doc.status.as_str(),
            new_doc.error_message,
        ],
    )
    .await?;
    debug!(document_id = %id, "Inserted document");

    let mut rows = conn
        .query(
            &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?"),
            params![id.clone()],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| StorageError::DataIntegrity(format!("Document '{id}' vanished")))?;
    UploadedDocument::try_from(&row)
}

/// Finds a document by id, scoped to its owner.
pub async fn find_owned(
    db: &Database,
    document_id: &str,
    owner_id: &str,
) -> Result<Option<UploadedDocument>, StorageError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ? AND owner_id = ?"),
            params![document_id, owner_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(UploadedDocument::try_from(&row)?)),
        None => Ok(None),
    }
}

/// Finds a document that is owned by the user and finished processing.
pub async fn find_owned_ready(
    db: &Database,
    document_id: &str,
    owner_id: &str,
) -> Result<Option<UploadedDocument>, StorageError> {
    Ok(find_owned(db, document_id, owner_id)
        .await?
        .filter(|doc| doc.status == DocumentStatus::Ready))
}

/// Lists the user's documents, newest first, without the full text.
pub async fn list_for_owner(
    db: &Database,
    owner_id: &str,
) -> Result<Vec<DocumentSummary>, StorageError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT id, original_name, file_size, word_count, subject, topics, status, \
             text_preview, uploaded_at FROM documents WHERE owner_id = ? \
             ORDER BY uploaded_at DESC, id DESC",
            params![owner_id],
        )
        .await?;

    let mut summaries = Vec::new();
    while let Some(row) = rows.next().await? {
        let topics_json: String = row.get(5)?;
        let topics: Vec<String> = serde_json::from_str(&topics_json).map_err(|e| {
            StorageError::DataIntegrity(format!("Failed to parse topics '{topics_json}': {e}"))
        })?;
        let status_str: String = row.get(6)?;
        let uploaded_at_str: String = row.get(8)?;
        summaries.push(DocumentSummary {
            id: row.get(0)?,
            original_name: row.get(1)?,
            file_size: row.get(2)?,
            word_count: row.get(3)?,
            subject: row.get(4)?,
            topics,
            status: status_str.parse()?,
            text_preview: row.get(7)?,
            uploaded_at: parse_timestamp(&uploaded_at_str)?,
        });
    }
    Ok(summaries)
}

/// Stamps the document as just used as answer material.
pub async fn touch_last_accessed(db: &Database, document_id: &str) -> Result<(), StorageError> {
    let conn = db.connect()?;
    conn.execute(
        "UPDATE documents SET last_accessed_at = CURRENT_TIMESTAMP WHERE id = ?",
        params![document_id],
    )
    .await?;
    Ok(())
}

/// Deletes an owned document row. Returns false when nothing matched.
pub async fn delete_owned(
    db: &Database,
    document_id: &str,
    owner_id: &str,
) -> Result<bool, StorageError> {
    let conn = db.connect()?;
    let affected = conn
        .execute(
            "DELETE FROM documents WHERE id = ? AND owner_id = ?",
            params![document_id, owner_id],
        )
        .await?;
    Ok(affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::db::sqlite::SqliteProvider;

    fn sample_doc(owner_id: &str) -> NewDocument {
        NewDocument {
            owner_id: owner_id.to_string(),
            original_name: "lecture-notes.pdf".to_string(),
            stored_name: format!("{owner_id}_1700000000000_lecture-notes.pdf"),
            file_path: format!("uploads/{owner_id}_1700000000000_lecture-notes.pdf"),
            file_size: 2048,
            mime_type: "application/pdf".to_string(),
            word_count: 120,
            text_preview: "Neural networks are...".to_string(),
            full_text: "Neural networks are computing systems.".to_string(),
            topics: vec!["machine learning".to_string()],
            subject: "machine learning".to_string(),
            status: DocumentStatus::Ready,
            error_message: None,
        }
    }

    async fn memory_db() -> SqliteProvider {
        let provider = SqliteProvider::new(":memory:").await.unwrap();
        provider.initialize_schema().await.unwrap();
        provider
    }

    #[tokio::test]
    async fn test_insert_and_find_owned() {
        let provider = memory_db().await;
        let doc = insert_document(&provider.db, sample_doc("user-1"))
            .await
            .unwrap();
        assert_eq!(doc.status, DocumentStatus::Ready);
        assert_eq!(doc.topics, vec!["machine learning".to_string()]);

        let found = find_owned(&provider.db, &doc.id, "user-1").await.unwrap();
        assert!(found.is_some());

        // Another owner cannot see it.
        let hidden = find_owned(&provider.db, &doc.id, "user-2").await.unwrap();
        assert!(hidden.is_none());
    }

    #[tokio::test]
    async fn test_find_owned_ready_filters_status() {
        let provider = memory_db().await;
        let mut pending = sample_doc("user-1");
        pending.status = DocumentStatus::Processing;
        pending.stored_name = "user-1_1700000000001_pending.pdf".to_string();
        let doc = insert_document(&provider.db, pending).await.unwrap();

        let ready = find_owned_ready(&provider.db, &doc.id, "user-1")
            .await
            .unwrap();
        assert!(ready.is_none());
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let provider = memory_db().await;
        let doc = insert_document(&provider.db, sample_doc("user-1"))
            .await
            .unwrap();

        let listed = list_for_owner(&provider.db, "user-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].original_name, "lecture-notes.pdf");

        assert!(delete_owned(&provider.db, &doc.id, "user-1").await.unwrap());
        assert!(!delete_owned(&provider.db, &doc.id, "user-1").await.unwrap());
        assert!(list_for_owner(&provider.db, "user-1").await.unwrap().is_empty());
    }
}
