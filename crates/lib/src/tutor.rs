//! # Generative-answer orchestrator
//!
//! Builds the tutoring prompt from the question, optional reference material
//! and student context, calls the configured [`AiProvider`] once (no retry),
//! and post-processes the reply so it reads well when spoken aloud.

use crate::{errors::AiError, prompts, providers::ai::AiProvider};
use regex::Regex;
use serde::Serialize;
use tracing::info;

/// Reference material is capped before being embedded in the prompt.
const REFERENCE_CHAR_LIMIT: usize = 1200;

/// Contextual information about the student asking the question.
#[derive(Debug, Clone, Default)]
pub struct StudentContext {
    pub university: String,
    pub course: String,
}

/// A finalized tutoring answer.
#[derive(Debug, Clone, Serialize)]
pub struct TutorAnswer {
    pub answer: String,
    pub model: String,
    pub quality: &'static str,
    pub personalized: bool,
    pub tokens_used: usize,
}

/// Generates a spoken-delivery tutoring answer.
///
/// Any provider failure is surfaced as-is; callers decide how to report it.
pub async fn generate_explanation(
    provider: &dyn AiProvider,
    model_label: &str,
    question: &str,
    reference: Option<&str>,
    context: &StudentContext,
) -> Result<TutorAnswer, AiError> {
    let user_prompt = build_user_prompt(question, reference, context);
    info!(model = model_label, "Generating tutoring answer");

    let raw = provider
        .generate(prompts::TUTOR_SYSTEM_PROMPT, &user_prompt)
        .await?;
    let answer = polish_for_speech(&raw);
    let tokens_used = estimate_tokens(&answer);

    Ok(TutorAnswer {
        answer,
        model: model_label.to_string(),
        quality: "high",
        personalized: true,
        tokens_used,
    })
}

fn build_user_prompt(question: &str, reference: Option<&str>, context: &StudentContext) -> String {
    let reference_block = match reference {
        Some(material) if !material.trim().is_empty() => {
            let capped: String = material.chars().take(REFERENCE_CHAR_LIMIT).collect();
            prompts::TUTOR_REFERENCE_BLOCK.replace("{material}", &capped)
        }
        _ => String::new(),
    };

    let university = if context.university.is_empty() {
        "Not specified"
    } else {
        &context.university
    };
    let course = if context.course.is_empty() {
        "General studies"
    } else {
        &context.course
    };

    prompts::TUTOR_USER_PROMPT
        .replace("{university}", university)
        .replace("{course}", course)
        .replace("{reference}", &reference_block)
        .replace("{question}", question)
}

/// Deterministic post-processing for spoken delivery.
///
/// Strips markdown emphasis and heading markers, collapses newlines into
/// sentence breaks, injects an opening enthusiasm phrase and a closing
/// encouragement if absent, and ensures terminal punctuation.
pub fn polish_for_speech(raw: &str) -> String {
    let mut answer = raw.trim().to_string();

    let lower = answer.to_lowercase();
    if !lower.contains("great question")
        && !lower.contains("excellent")
        && !lower.contains("fantastic")
    {
        answer = format!("Great question! {answer}");
    }

    answer = answer.replace("\n\n", ". ");
    answer = answer.replace('\n', ". ");
    answer = answer.replace("**", "");
    answer = answer.replace('*', "");
    let heading_re = Regex::new(r"#{1,6}\s").expect("valid heading regex");
    answer = heading_re.replace_all(&answer, "").into_owned();

    let lower = answer.to_lowercase();
    if !lower.contains("feel free") && !lower.contains("let me know") && !lower.contains("ask me") {
        answer.push_str(" Feel free to ask if you'd like me to dive deeper into any part of this!");
    }

    if !answer.ends_with('.') && !answer.ends_with('!') && !answer.ends_with('?') {
        answer.push('.');
    }

    answer
}

/// Coarse token estimate: one token per four characters, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}
