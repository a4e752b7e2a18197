//! Question/answer history, including voice artifact metadata.

use super::parse_timestamp;
use crate::errors::StorageError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use turso::{Database, Row, params};
use uuid::Uuid;

const CONVERSATION_COLUMNS: &str = "id, owner_id, document_id, question, answer, ai_model, \
     voice_generated, voice_filename, voice_duration, voice_size, voice_provider, \
     voice_fallback, quality, subject, tokens_used, created_at";

/// Voice artifact details stored with a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceFileMeta {
    pub filename: String,
    pub duration_secs: i64,
    pub size: i64,
    pub provider: String,
    pub fallback: bool,
}

/// One answered question in the user's history.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: String,
    pub owner_id: String,
    pub document_id: Option<String>,
    pub question: String,
    pub answer: String,
    pub ai_model: String,
    pub voice: Option<VoiceFileMeta>,
    pub quality: String,
    pub subject: String,
    pub tokens_used: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Row> for Conversation {
    type Error = StorageError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let voice_generated: i64 = row.get(6)?;
        let voice = if voice_generated != 0 {
            let filename: Option<String> = row.get(7)?;
            let filename = filename.ok_or_else(|| {
                StorageError::DataIntegrity(
                    "Conversation marked voice_generated without a filename".to_string(),
                )
            })?;
            let fallback: i64 = row.get(11)?;
            Some(VoiceFileMeta {
                filename,
                duration_secs: row.get::<Option<i64>>(8)?.unwrap_or(0),
                size: row.get::<Option<i64>>(9)?.unwrap_or(0),
                provider: row.get::<Option<String>>(10)?.unwrap_or_default(),
                fallback: fallback != 0,
            })
        } else {
            None
        };
        let created_at_str: String = row.get(15)?;

        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            document_id: row.get(2)?,
            question: row.get(3)?,
            answer: row.get(4)?,
            ai_model: row.get(5)?,
            voice,
            quality: row.get(12)?,
            subject: row.get(13)?,
            tokens_used: row.get(14)?,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }
}

/// Fields required to record a newly answered question.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub owner_id: String,
    pub document_id: Option<String>,
    pub question: String,
    pub answer: String,
    pub ai_model: String,
    pub voice: Option<VoiceFileMeta>,
    pub quality: String,
    pub subject: String,
    pub tokens_used: i64,
}

/// Inserts a conversation row and returns its generated id.
pub async fn insert_conversation(
    db: &Database,
    new_conv: NewConversation,
) -> Result<String, StorageError> {
    let conn = db.connect()?;
    let id = Uuid::new_v4().to_string();
    let (voice_generated, filename, duration, size, provider, fallback) = match &new_conv.voice {
        Some(meta) => (
            1i64,
            Some(meta.filename.clone()),
            Some(meta.duration_secs),
            Some(meta.size),
            Some(meta.provider.clone()),
            i64::from(meta.fallback),
        ),
        None => (0, None, None, None, None, 0),
    };

    conn.execute(
        "INSERT INTO conversations (id, owner_id, document_id, question, answer, ai_model, \
         voice_generated, voice_filename, voice_duration, voice_size, voice_provider, \
         voice_fallback, quality, subject, tokens_used) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id.clone(),
            new_conv.owner_id,
            new_conv.document_id,
            new_conv.question,
            new_conv.answer,
            new_conv.ai_model,
            voice_generated,
            filename,
            duration,
            size,
            provider,
            fallback,
            new_conv.quality,
            new_conv.subject,
            new_conv.tokens_used,
        ],
    )
    .await?;
    debug!(conversation_id = %id, "Recorded conversation");
    Ok(id)
}

/// Returns one page of the user's history, newest first.
///
/// `page` is 1-based; callers clamp it before getting here.
pub async fn list_for_owner(
    db: &Database,
    owner_id: &str,
    page: u32,
    limit: u32,
) -> Result<Vec<Conversation>, StorageError> {
    let conn = db.connect()?;
    let offset = (page.saturating_sub(1) as i64) * limit as i64;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE owner_id = ? \
                 ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
            ),
            params![owner_id, limit as i64, offset],
        )
        .await?;

    let mut conversations = Vec::new();
    while let Some(row) = rows.next().await? {
        conversations.push(Conversation::try_from(&row)?);
    }
    Ok(conversations)
}

/// Total history entries for the user, for pagination math.
pub async fn count_for_owner(db: &Database, owner_id: &str) -> Result<i64, StorageError> {
    let conn = db.connect()?;
    let mut rows = conn
        .query(
            "SELECT COUNT(*) FROM conversations WHERE owner_id = ?",
            params![owner_id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| StorageError::DataIntegrity("COUNT returned no rows".to_string()))?;
    Ok(row.get(0)?)
}
