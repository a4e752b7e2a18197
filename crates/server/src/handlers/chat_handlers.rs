//! Handlers for the tutoring chat: asking questions and browsing history.

use crate::{
    auth::middleware::AuthenticatedUser, errors::AppError, state::AppState, types::Pagination,
};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use voxtutor::{
    prompts::DEFAULT_STUDY_TEXT,
    store::{conversations, documents, NewConversation, VoiceFileMeta},
    subject,
    tutor::{self, StudentContext},
};
use voxtutor_access::{increment_stat, StatField};

const MAX_QUESTION_LENGTH: usize = 2000;
const DEFAULT_HISTORY_LIMIT: u32 = 10;
const MAX_HISTORY_LIMIT: u32 = 50;

fn default_include_voice() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskPayload {
    #[serde(default)]
    pub question: String,
    pub file_id: Option<String>,
    #[serde(default = "default_include_voice")]
    pub include_voice: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct HistoryParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Handler for `POST /api/chat/ask`.
///
/// Answers the question against the referenced document (or built-in study
/// text), optionally synthesizes a voice reading, and records the exchange
/// in the user's history. Voice synthesis never fails the request.
pub async fn ask_handler(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<AskPayload>,
) -> Result<Json<Value>, AppError> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Err(AppError::validation_with_code(
            "Question is required",
            "INVALID_QUESTION",
        ));
    }
    if question.chars().count() > MAX_QUESTION_LENGTH {
        return Err(AppError::validation_with_code(
            "Question is too long (max 2000 characters)",
            "INVALID_QUESTION",
        ));
    }

    let db = &app_state.sqlite_provider.db;

    // Resolve the reference material. A missing, foreign, or unprocessed
    // document silently falls back to the built-in study text.
    let mut source_document_id = None;
    let reference = if let Some(file_id) = payload.file_id.as_deref() {
        match documents::find_owned_ready(db, file_id, &user.id).await? {
            Some(doc) => {
                documents::touch_last_accessed(db, &doc.id).await?;
                source_document_id = Some(doc.id);
                doc.full_text
            }
            None => {
                warn!(file_id, "Requested document unavailable, using default material");
                DEFAULT_STUDY_TEXT.to_string()
            }
        }
    } else {
        DEFAULT_STUDY_TEXT.to_string()
    };

    let context = StudentContext {
        university: user.university.clone(),
        course: user.course.clone(),
    };
    let answer = tutor::generate_explanation(
        app_state.ai_provider.as_ref(),
        &app_state.model_name,
        question,
        Some(&reference),
        &context,
    )
    .await?;

    let detected_subject = subject::detect_subject(question, &answer.answer);

    // Voice synthesis is best-effort: a provider outage yields a fallback
    // descriptor instead of an error.
    let voice_artifact = if payload.include_voice && user.voice_enabled {
        Some(app_state.voice.synthesize(&answer.answer, detected_subject).await)
    } else {
        None
    };

    let voice_meta = voice_artifact.as_ref().map(|artifact| VoiceFileMeta {
        filename: artifact.filename.clone(),
        duration_secs: artifact.duration_secs as i64,
        size: artifact.size as i64,
        provider: artifact.provider.clone(),
        fallback: artifact.fallback,
    });

    let conversation_id = conversations::insert_conversation(
        db,
        NewConversation {
            owner_id: user.id.clone(),
            document_id: source_document_id.clone(),
            question: question.to_string(),
            answer: answer.answer.clone(),
            ai_model: answer.model.clone(),
            voice: voice_meta,
            quality: answer.quality.to_string(),
            subject: detected_subject.to_string(),
            tokens_used: answer.tokens_used as i64,
        },
    )
    .await?;

    // Dashboard counters. These are read-modify-write and may undercount
    // under concurrent requests for the same user.
    increment_stat(db, &user.id, StatField::Questions).await?;
    increment_stat(db, &user.id, StatField::Conversations).await?;
    if voice_artifact.as_ref().is_some_and(|a| !a.fallback) {
        increment_stat(db, &user.id, StatField::VoiceGenerated).await?;
    }

    info!(
        conversation_id = %conversation_id,
        subject = detected_subject,
        voice = voice_artifact.is_some(),
        "Question answered"
    );

    let voice_json = voice_artifact.map(|artifact| {
        json!({
            "filename": artifact.filename,
            "duration": artifact.duration_secs,
            "size": artifact.size,
            "voice_id": artifact.voice_id,
            "provider": artifact.provider,
            "fallback": artifact.fallback,
            "download_url": format!("/api/voice/download/{}", artifact.filename),
        })
    });

    Ok(Json(json!({
        "success": true,
        "message": "Question processed successfully",
        "data": {
            "question": question,
            "answer": answer.answer,
            "metadata": {
                "subject": detected_subject,
                "quality": answer.quality,
                "personalized": answer.personalized,
                "tokens_used": answer.tokens_used,
                "model": answer.model,
                "document_id": source_document_id,
            },
            "voice": voice_json,
        },
        "session": {
            "conversation_id": conversation_id,
            "timestamp": Utc::now().to_rfc3339(),
        }
    })))
}

/// Handler for `GET /api/chat/history`.
pub async fn history_handler(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Value>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let db = &app_state.sqlite_provider.db;
    let total = conversations::count_for_owner(db, &user.id).await?;
    let page_items = conversations::list_for_owner(db, &user.id, page, limit).await?;

    let conversations_json: Vec<Value> = page_items
        .iter()
        .map(|conv| {
            json!({
                "id": conv.id,
                "question": conv.question,
                "answer": conv.answer,
                "subject": conv.subject,
                "quality": conv.quality,
                "ai_model": conv.ai_model,
                "tokens_used": conv.tokens_used,
                "document_id": conv.document_id,
                "voice": conv.voice.as_ref().map(|v| json!({
                    "filename": v.filename,
                    "duration": v.duration_secs,
                    "size": v.size,
                    "provider": v.provider,
                    "fallback": v.fallback,
                    "download_url": format!("/api/voice/download/{}", v.filename),
                })),
                "created_at": conv.created_at,
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "message": "Conversation history retrieved",
        "history": {
            "conversations": conversations_json,
            "pagination": Pagination::new(page, limit, total),
        }
    })))
}
