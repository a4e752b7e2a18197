//! Handler for quiz generation from study material.

use crate::{auth::middleware::AuthenticatedUser, errors::AppError, state::AppState};
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use voxtutor_access::{increment_stat, StatField};
use voxtutor::{
    prompts::DEFAULT_STUDY_TEXT,
    quiz::{self, Difficulty, MAX_QUESTIONS, MIN_QUESTIONS},
    store::documents,
    subject,
};

fn default_num_questions() -> usize {
    3
}

fn default_difficulty() -> String {
    "mixed".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPayload {
    pub file_id: Option<String>,
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

/// Handler for `POST /api/chat/quiz`.
///
/// The returned quiz always has exactly the requested number of questions;
/// when the model reply parses short, placeholders fill the gap and the
/// payload is marked `degraded`.
pub async fn quiz_handler(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<QuizPayload>,
) -> Result<Json<Value>, AppError> {
    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&payload.num_questions) {
        return Err(AppError::validation_with_code(
            "Number of questions must be between 1 and 10",
            "INVALID_QUESTION_COUNT",
        ));
    }
    let difficulty: Difficulty = payload.difficulty.parse().map_err(|_| {
        AppError::validation_with_code(
            "Difficulty must be one of: easy, medium, hard, mixed",
            "INVALID_DIFFICULTY",
        )
    })?;

    let db = &app_state.sqlite_provider.db;
    let mut source_file_id = None;
    let content = if let Some(file_id) = payload.file_id.as_deref() {
        match documents::find_owned_ready(db, file_id, &user.id).await? {
            Some(doc) => {
                source_file_id = Some(doc.id);
                doc.full_text
            }
            None => DEFAULT_STUDY_TEXT.to_string(),
        }
    } else {
        DEFAULT_STUDY_TEXT.to_string()
    };

    let quiz = quiz::generate_quiz(
        app_state.ai_provider.as_ref(),
        &app_state.model_name,
        &content,
        payload.num_questions,
        difficulty,
    )
    .await?;

    increment_stat(db, &user.id, StatField::Questions).await?;

    info!(
        user_id = %user.id,
        questions = quiz.questions.len(),
        degraded = quiz.degraded,
        "Quiz generated"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Quiz generated successfully",
        "data": {
            "quiz": quiz,
            "fileId": source_file_id,
            "settings": {
                "numQuestions": payload.num_questions,
                "difficulty": difficulty.as_str(),
                "subject": subject::detect_subject("", &content),
            },
        }
    })))
}
