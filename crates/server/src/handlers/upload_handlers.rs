//! Handlers for PDF upload and document management.

use crate::{auth::middleware::AuthenticatedUser, errors::AppError, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Multipart;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{info, warn};
use voxtutor::{
    pdf_text,
    store::{documents, DocumentStatus, NewDocument},
    subject,
};
use voxtutor_access::{increment_stat, StatField};

/// Keeps stored filenames shell- and URL-safe.
fn sanitize_filename(original: &str) -> String {
    original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn is_pdf(file_name: &str, content_type: Option<&str>) -> bool {
    content_type == Some("application/pdf") || file_name.to_lowercase().ends_with(".pdf")
}

fn document_json(doc: &documents::UploadedDocument) -> Value {
    json!({
        "id": doc.id,
        "original_name": doc.original_name,
        "file_size": doc.file_size,
        "word_count": doc.word_count,
        "subject": doc.subject,
        "topics": doc.topics,
        "status": doc.status,
        "error_message": doc.error_message,
        "text_preview": doc.text_preview,
        "uploaded_at": doc.uploaded_at,
        "last_accessed_at": doc.last_accessed_at,
    })
}

/// Handler for `POST /api/upload`.
///
/// Accepts a single `file` multipart field, stores the PDF on disk under a
/// name unique to the user and upload instant, and extracts its text. An
/// unreadable PDF is still stored with status `error` and placeholder text.
pub async fn upload_handler(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut file_name = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(anyhow::Error::from)? {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let original = field.file_name().unwrap_or("document.pdf").to_string();
            let content_type = field.content_type().map(str::to_string);
            if !is_pdf(&original, content_type.as_deref()) {
                return Err(AppError::validation("Only PDF files are allowed"));
            }
            file_name = Some(original);
            file_bytes = Some(field.bytes().await.map_err(anyhow::Error::from)?.to_vec());
        } else {
            warn!("Ignoring unknown multipart field: {}", name);
        }
    }

    let (original_name, bytes) = match (file_name, file_bytes) {
        (Some(name), Some(bytes)) if !bytes.is_empty() => (name, bytes),
        _ => return Err(AppError::validation("No file uploaded")),
    };

    let stored_name = format!(
        "{}_{}_{}",
        user.id,
        Utc::now().timestamp_millis(),
        sanitize_filename(&original_name)
    );
    let file_path = PathBuf::from(&app_state.config.uploads_dir).join(&stored_name);
    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    let extraction = pdf_text::extract_text(&bytes);
    let (extracted, status, error_message) = match extraction {
        Ok(extracted) => (extracted, DocumentStatus::Ready, None),
        Err(e) => {
            warn!(file = %original_name, "Text extraction failed: {e}");
            (
                pdf_text::ExtractedText {
                    full_text: pdf_text::EXTRACTION_FAILED_TEXT.to_string(),
                    preview: pdf_text::EXTRACTION_FAILED_TEXT.to_string(),
                    word_count: 0,
                },
                DocumentStatus::Error,
                Some(e.to_string()),
            )
        }
    };

    let detected_subject = subject::document_subject(&extracted.full_text);
    let topics = subject::extract_topics(&extracted.full_text);

    let insert_result = documents::insert_document(
        &app_state.sqlite_provider.db,
        NewDocument {
            owner_id: user.id.clone(),
            original_name: original_name.clone(),
            stored_name: stored_name.clone(),
            file_path: file_path.to_string_lossy().to_string(),
            file_size: bytes.len() as i64,
            mime_type: "application/pdf".to_string(),
            word_count: extracted.word_count,
            text_preview: extracted.preview,
            full_text: extracted.full_text,
            topics,
            subject: detected_subject.to_string(),
            status,
            error_message,
        },
    )
    .await;

    let document = match insert_result {
        Ok(doc) => doc,
        Err(e) => {
            // Don't leave an orphan file behind when the record failed.
            if let Err(cleanup_err) = tokio::fs::remove_file(&file_path).await {
                warn!(path = %file_path.display(), "Orphan cleanup failed: {cleanup_err}");
            }
            return Err(e.into());
        }
    };

    increment_stat(&app_state.sqlite_provider.db, &user.id, StatField::Uploads).await?;
    info!(
        document_id = %document.id,
        size = document.file_size,
        words = document.word_count,
        "Document uploaded"
    );

    Ok(Json(json!({
        "success": true,
        "message": "File uploaded and processed successfully",
        "data": {
            "document": document_json(&document),
            "user": { "total_uploads": user.total_uploads + 1 },
        }
    })))
}

/// Handler for `GET /api/upload/my-files`.
pub async fn list_documents_handler(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let summaries = documents::list_for_owner(&app_state.sqlite_provider.db, &user.id).await?;
    let count = summaries.len();
    Ok(Json(json!({
        "success": true,
        "data": {
            "documents": summaries,
            "count": count,
        }
    })))
}

/// Handler for `GET /api/upload/{file_id}`.
pub async fn get_document_handler(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(file_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let db = &app_state.sqlite_provider.db;
    let document = documents::find_owned(db, &file_id, &user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;
    documents::touch_last_accessed(db, &document.id).await?;
    let document = documents::find_owned(db, &document.id, &user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": { "document": document_json(&document) }
    })))
}

/// Handler for `DELETE /api/upload/{file_id}`.
///
/// Removes the database record first, then the file on disk. A file that is
/// already gone is not an error.
pub async fn delete_document_handler(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(file_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let db = &app_state.sqlite_provider.db;
    let document = documents::find_owned(db, &file_id, &user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    documents::delete_owned(db, &file_id, &user.id).await?;
    if let Err(e) = tokio::fs::remove_file(&document.file_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %document.file_path, "Failed to remove stored file: {e}");
        }
    }
    info!(document_id = %file_id, "Document deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Document deleted successfully",
    })))
}
