//! Keyword-based subject and topic detection.
//!
//! These are intentionally simple rule tables. They drive voice selection,
//! conversation metadata, and quiz topic tags; nothing here calls a model.

/// Detects the broad subject of a question/answer exchange.
pub fn detect_subject(question: &str, answer: &str) -> &'static str {
    const SUBJECTS: &[(&str, &[&str])] = &[
        (
            "machine learning",
            &["machine learning", "ml", "neural network", "algorithm"],
        ),
        ("programming", &["programming", "code", "coding", "software"]),
        ("mathematics", &["math", "calculation", "equation", "formula"]),
        ("science", &["science", "physics", "chemistry", "biology"]),
    ];

    let text = format!("{question} {answer}").to_lowercase();
    for (subject, keywords) in SUBJECTS {
        if keywords.iter().any(|k| text.contains(k)) {
            return subject;
        }
    }
    "general"
}

/// Guesses the academic subject of an uploaded document from its text.
pub fn document_subject(text: &str) -> &'static str {
    const SUBJECTS: &[(&str, &[&str])] = &[
        (
            "computer science",
            &["programming", "algorithm", "software", "computer"],
        ),
        (
            "artificial intelligence",
            &["ai", "machine learning", "neural network", "deep learning"],
        ),
        (
            "mathematics",
            &["equation", "formula", "calculation", "theorem"],
        ),
        ("engineering", &["design", "system", "technical", "engineering"]),
    ];

    let lower = text.to_lowercase();
    for (subject, keywords) in SUBJECTS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return subject;
        }
    }
    "general studies"
}

/// Extracts topic tags from a document's text.
pub fn extract_topics(text: &str) -> Vec<String> {
    const TOPICS: &[(&str, &[&str])] = &[
        (
            "machine learning",
            &["machine learning", "ml", "supervised", "unsupervised"],
        ),
        (
            "neural networks",
            &["neural network", "neuron", "deep learning", "layer"],
        ),
        (
            "algorithms",
            &["algorithm", "sorting", "searching", "optimization"],
        ),
        (
            "programming",
            &["code", "programming", "software", "development"],
        ),
        ("mathematics", &["math", "equation", "formula", "calculation"]),
    ];

    let lower = text.to_lowercase();
    let found: Vec<String> = TOPICS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(topic, _)| topic.to_string())
        .collect();

    if found.is_empty() {
        vec!["general".to_string()]
    } else {
        found
    }
}

/// Tags a single quiz question with a topic.
pub fn quiz_topic(question: &str) -> &'static str {
    const TOPICS: &[(&str, &[&str])] = &[
        (
            "machine learning",
            &["machine learning", "ml", "algorithm", "model", "training", "data"],
        ),
        (
            "neural networks",
            &["neural", "network", "neuron", "deep learning", "layer"],
        ),
        (
            "programming",
            &["code", "programming", "software", "function", "variable"],
        ),
        (
            "computer science",
            &["computer", "software", "system", "technology"],
        ),
        (
            "mathematics",
            &["math", "equation", "formula", "calculation", "number"],
        ),
        (
            "data science",
            &["data", "analysis", "statistics", "dataset", "visualization"],
        ),
    ];

    let lower = question.to_lowercase();
    for (topic, keywords) in TOPICS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return topic;
        }
    }
    "general concepts"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_subject_matches_on_question_or_answer() {
        assert_eq!(
            detect_subject("What is a neural network?", ""),
            "machine learning"
        );
        assert_eq!(
            detect_subject("Help me", "Physics is the science of matter."),
            "science"
        );
        assert_eq!(detect_subject("Tell me about history", "Sure."), "general");
    }

    #[test]
    fn test_document_subject_priority_order() {
        // "programming" hits the computer science table before the AI table.
        assert_eq!(
            document_subject("programming neural networks"),
            "computer science"
        );
        assert_eq!(document_subject("deep learning basics"), "artificial intelligence");
        assert_eq!(document_subject("a poem about rivers"), "general studies");
    }

    #[test]
    fn test_extract_topics_defaults_to_general() {
        assert_eq!(extract_topics("nothing relevant here"), vec!["general"]);
        let topics = extract_topics("supervised learning with neural networks");
        assert!(topics.contains(&"machine learning".to_string()));
        assert!(topics.contains(&"neural networks".to_string()));
    }

    #[test]
    fn test_quiz_topic() {
        assert_eq!(quiz_topic("Explain the training data pipeline"), "machine learning");
        assert_eq!(quiz_topic("What rhymes with orange?"), "general concepts");
    }
}
