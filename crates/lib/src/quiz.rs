//! # Quiz orchestrator
//!
//! Prompts the model for `QUESTION n:` / `ANSWER n:` pairs, parses the
//! semi-structured reply, and pads any shortfall with placeholder pairs so
//! the caller always receives exactly the requested count. Padding marks the
//! quiz as `degraded` so a masked generation or parse failure stays visible.

use crate::{errors::AiError, prompts, providers::ai::AiProvider, subject};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Quiz content is capped before being embedded in the prompt.
const CONTENT_CHAR_LIMIT: usize = 1000;

/// Allowed question counts, inclusive. Enforced by the HTTP handler; kept
/// here so library callers share the same bounds.
pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Mixed,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "mixed" => Ok(Difficulty::Mixed),
            _ => Err(()),
        }
    }
}

/// A single parsed (or placeholder) question/answer pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
    pub topic: String,
}

/// A complete generated quiz.
#[derive(Debug, Clone, Serialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
    pub difficulty: Difficulty,
    /// True when placeholder padding had to fill a parse shortfall.
    pub degraded: bool,
    pub generated_at: DateTime<Utc>,
    pub model: String,
}

/// Generates a quiz with exactly `num_questions` pairs.
pub async fn generate_quiz(
    provider: &dyn AiProvider,
    model_label: &str,
    content: &str,
    num_questions: usize,
    difficulty: Difficulty,
) -> Result<Quiz, AiError> {
    let capped: String = content.chars().take(CONTENT_CHAR_LIMIT).collect();
    let user_prompt = prompts::QUIZ_USER_PROMPT
        .replace("{count}", &num_questions.to_string())
        .replace("{difficulty}", difficulty.as_str())
        .replace("{content}", &capped);

    info!(count = num_questions, %difficulty, "Generating quiz questions");
    let raw = provider
        .generate(prompts::QUIZ_SYSTEM_PROMPT, &user_prompt)
        .await?;

    let (questions, parsed) = parse_quiz_response(&raw, num_questions, difficulty);
    let degraded = parsed < num_questions;
    if degraded {
        warn!(
            parsed,
            requested = num_questions,
            "Quiz parse shortfall, padding with placeholders"
        );
    }

    Ok(Quiz {
        questions,
        difficulty,
        degraded,
        generated_at: Utc::now(),
        model: model_label.to_string(),
    })
}

/// Parses the raw model reply into question/answer pairs.
///
/// Returns the final list (padded and truncated to `num_questions`) and the
/// number of pairs that were actually parsed from the reply.
pub fn parse_quiz_response(
    raw: &str,
    num_questions: usize,
    difficulty: Difficulty,
) -> (Vec<QuizQuestion>, usize) {
    let question_re = Regex::new(r"(?i)QUESTION \d+:").expect("valid question regex");
    let answer_re = Regex::new(r"(?is)ANSWER \d+:\s*(.*)").expect("valid answer regex");

    let mut questions = Vec::new();
    // The first split segment is everything before "QUESTION 1:"; skip it.
    for segment in question_re.split(raw).skip(1) {
        if questions.len() >= num_questions {
            break;
        }

        let (question_text, answer_text) = match answer_re.captures(segment) {
            Some(caps) => {
                let marker = caps.get(0).map(|m| m.start()).unwrap_or(segment.len());
                let answer = caps
                    .get(1)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
                (segment[..marker].trim(), answer)
            }
            None => (segment.trim(), "Answer not found.".to_string()),
        };

        if question_text.is_empty() {
            continue;
        }

        questions.push(QuizQuestion {
            question: question_text.to_string(),
            answer: answer_text,
            difficulty,
            topic: subject::quiz_topic(question_text).to_string(),
        });
    }

    let parsed = questions.len();

    while questions.len() < num_questions {
        questions.push(QuizQuestion {
            question: format!(
                "What are the key concepts from the study material? (Question {})",
                questions.len() + 1
            ),
            answer: "Based on the uploaded content, identify and explain the main concepts, \
                     definitions, and relationships between different ideas. Focus on \
                     understanding the fundamental principles rather than memorizing details."
                .to_string(),
            difficulty,
            topic: "general concepts".to_string(),
        });
    }
    questions.truncate(num_questions);

    (questions, parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "Here you go!\n\
        QUESTION 1: What is supervised learning?\n\
        ANSWER 1: Learning from labeled training examples.\n\n\
        QUESTION 2: What is a neural network?\n\
        ANSWER 2: A computational model inspired by biological neurons.\n";

    #[test]
    fn test_parse_well_formed_response() {
        let (questions, parsed) = parse_quiz_response(WELL_FORMED, 2, Difficulty::Easy);
        assert_eq!(parsed, 2);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "What is supervised learning?");
        assert_eq!(
            questions[0].answer,
            "Learning from labeled training examples."
        );
        assert_eq!(questions[0].topic, "machine learning");
        assert_eq!(questions[1].question, "What is a neural network?");
    }

    #[test]
    fn test_shortfall_is_padded_to_requested_count() {
        let (questions, parsed) = parse_quiz_response(WELL_FORMED, 5, Difficulty::Mixed);
        assert_eq!(parsed, 2);
        assert_eq!(questions.len(), 5);
        assert!(questions[2].question.contains("(Question 3)"));
        assert_eq!(questions[4].topic, "general concepts");
    }

    #[test]
    fn test_surplus_is_truncated() {
        let (questions, parsed) = parse_quiz_response(WELL_FORMED, 1, Difficulty::Hard);
        assert_eq!(parsed, 1);
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn test_segment_without_question_text_is_dropped() {
        let raw = "QUESTION 1: \nANSWER 1: An orphaned answer.\n\
                   QUESTION 2: What is an algorithm?\nANSWER 2: A procedure.";
        let (questions, parsed) = parse_quiz_response(raw, 2, Difficulty::Medium);
        assert_eq!(parsed, 1);
        assert_eq!(questions[0].question, "What is an algorithm?");
        // The second slot is placeholder padding.
        assert!(questions[1].question.contains("key concepts"));
    }

    #[test]
    fn test_missing_answer_marker() {
        let raw = "QUESTION 1: A question with no answer block";
        let (questions, parsed) = parse_quiz_response(raw, 1, Difficulty::Easy);
        assert_eq!(parsed, 1);
        assert_eq!(questions[0].answer, "Answer not found.");
    }

    #[test]
    fn test_garbage_response_yields_all_placeholders() {
        let (questions, parsed) = parse_quiz_response("I refuse to comply.", 3, Difficulty::Mixed);
        assert_eq!(parsed, 0);
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.topic == "general concepts"));
    }

    #[test]
    fn test_difficulty_round_trip() {
        assert_eq!("mixed".parse::<Difficulty>(), Ok(Difficulty::Mixed));
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Hard.to_string(), "hard");
    }
}
