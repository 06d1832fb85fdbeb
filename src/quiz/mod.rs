//! Fixed-template quiz composition from a summary.
//!
//! The question always asks about the summary's first sentence and the correct
//! option is always "A". Answer checking relies on that key, so the template
//! must not change.

use crate::summarization::Summary;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Question used for the legacy "too short" record.
pub const TOO_SHORT_QUESTION: &str = "Summary too short for quiz.";

const SENTENCE_DELIMITER: &str = ". ";
const DISTRACTORS: [&str; 3] = [
    "Something unrelated.",
    "Another wrong answer.",
    "None of the above.",
];
const CORRECT_LABEL: char = 'A';

/// A single four-option multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizItem {
    pub question: String,
    /// Exactly four entries, labeled "A) " through "D) ".
    pub options: Vec<String>,
    pub correct_label: char,
}

/// Outcome of quiz composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "QuizRecord", try_from = "QuizRecord")]
pub enum QuizOutcome {
    Composed(QuizItem),
    /// The summary had fewer than two sentences.
    TooShort,
}

/// Result of comparing a user's selection against the answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AnswerCheck {
    Correct,
    Wrong { correct: char },
    NotApplicable,
}

impl std::fmt::Display for AnswerCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerCheck::Correct => write!(f, "Correct!"),
            AnswerCheck::Wrong { correct } => write!(f, "Wrong! Correct answer: {}", correct),
            AnswerCheck::NotApplicable => write!(f, "No quiz to answer."),
        }
    }
}

/// Derive one question from the first sentence of `summary`.
///
/// Sentences are split on the literal `". "`, so a trailing period stays attached
/// to the last sentence and abbreviations split early.
pub fn compose_quiz(summary: &str) -> QuizOutcome {
    let sentences: Vec<&str> = summary.split(SENTENCE_DELIMITER).collect();
    if sentences.len() < 2 {
        debug!("Summary has a single sentence, no quiz");
        return QuizOutcome::TooShort;
    }

    let first = sentences[0];
    let mut options = Vec::with_capacity(4);
    options.push(format!("A) {}", first));
    for (label, text) in ['B', 'C', 'D'].into_iter().zip(DISTRACTORS) {
        options.push(format!("{}) {}", label, text));
    }

    QuizOutcome::Composed(QuizItem {
        question: format!("What is the main idea of: '{}'?", first),
        options,
        correct_label: CORRECT_LABEL,
    })
}

/// Compose from a summarization outcome. Failed summaries are quizzed on their
/// failure text, matching what the user sees.
pub fn compose_from_summary(summary: &Summary) -> QuizOutcome {
    compose_quiz(&summary.to_string())
}

impl QuizOutcome {
    pub fn item(&self) -> Option<&QuizItem> {
        match self {
            QuizOutcome::Composed(item) => Some(item),
            QuizOutcome::TooShort => None,
        }
    }

    /// Question text, or the "too short" marker.
    pub fn question(&self) -> &str {
        match self {
            QuizOutcome::Composed(item) => &item.question,
            QuizOutcome::TooShort => TOO_SHORT_QUESTION,
        }
    }

    /// Four options, or none for the degenerate outcome.
    pub fn options(&self) -> &[String] {
        match self {
            QuizOutcome::Composed(item) => &item.options,
            QuizOutcome::TooShort => &[],
        }
    }

    /// Compare the first letter of `selection` (an option string or bare letter).
    pub fn check_answer(&self, selection: &str) -> AnswerCheck {
        let item = match self {
            QuizOutcome::Composed(item) => item,
            QuizOutcome::TooShort => return AnswerCheck::NotApplicable,
        };

        let chosen = selection
            .trim_start()
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase());

        if chosen == Some(item.correct_label) {
            AnswerCheck::Correct
        } else {
            AnswerCheck::Wrong {
                correct: item.correct_label,
            }
        }
    }
}

/// Legacy serialized shape: `{question, options, answer}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub answer: String,
}

impl From<QuizOutcome> for QuizRecord {
    fn from(outcome: QuizOutcome) -> Self {
        match outcome {
            QuizOutcome::Composed(item) => QuizRecord {
                question: item.question,
                options: item.options,
                answer: item.correct_label.to_string(),
            },
            QuizOutcome::TooShort => QuizRecord {
                question: TOO_SHORT_QUESTION.to_string(),
                options: Vec::new(),
                answer: String::new(),
            },
        }
    }
}

/// Only records this module could have produced are accepted: four options with
/// answer "A", or the empty "too short" record.
impl TryFrom<QuizRecord> for QuizOutcome {
    type Error = String;

    fn try_from(record: QuizRecord) -> Result<Self, Self::Error> {
        if record.options.is_empty() {
            return Ok(QuizOutcome::TooShort);
        }
        if record.options.len() != 4 {
            return Err(format!(
                "quiz must have 4 options, got {}",
                record.options.len()
            ));
        }
        if record.answer != CORRECT_LABEL.to_string() {
            return Err(format!(
                "quiz answer must be '{}', got '{}'",
                CORRECT_LABEL, record.answer
            ));
        }

        Ok(QuizOutcome::Composed(QuizItem {
            question: record.question,
            options: record.options,
            correct_label: CORRECT_LABEL,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SummarizationError;

    #[test]
    fn test_three_sentences() {
        let quiz = compose_quiz("First idea. Second idea. Third idea.");
        assert_eq!(quiz.question(), "What is the main idea of: 'First idea'?");
        assert_eq!(
            quiz.options(),
            [
                "A) First idea",
                "B) Something unrelated.",
                "C) Another wrong answer.",
                "D) None of the above."
            ]
        );
        assert_eq!(quiz.item().unwrap().correct_label, 'A');
    }

    #[test]
    fn test_single_sentence_is_too_short() {
        assert_eq!(compose_quiz("One sentence only"), QuizOutcome::TooShort);
        assert_eq!(compose_quiz("One sentence only."), QuizOutcome::TooShort);
        assert_eq!(compose_quiz(""), QuizOutcome::TooShort);
    }

    #[test]
    fn test_split_requires_space_after_period() {
        assert_eq!(compose_quiz("First.Second.Third."), QuizOutcome::TooShort);
        let quiz = compose_quiz("Dr. Smith explains. More.");
        assert_eq!(quiz.options()[0], "A) Dr");
    }

    #[test]
    fn test_options_length_is_four_or_zero() {
        for text in ["a", "a. b", "a. b. c. d. e. f", ". ", "x. "] {
            let n = compose_quiz(text).options().len();
            assert!(n == 4 || n == 0, "{text:?} gave {n} options");
        }
    }

    #[test]
    fn test_degenerate_accessors() {
        let quiz = QuizOutcome::TooShort;
        assert_eq!(quiz.question(), "Summary too short for quiz.");
        assert!(quiz.options().is_empty());
        assert!(quiz.item().is_none());
    }

    #[test]
    fn test_check_answer() {
        let quiz = compose_quiz("First idea. Second idea.");
        assert_eq!(quiz.check_answer("A) First idea"), AnswerCheck::Correct);
        assert_eq!(quiz.check_answer("a"), AnswerCheck::Correct);
        assert_eq!(
            quiz.check_answer("C) Another wrong answer."),
            AnswerCheck::Wrong { correct: 'A' }
        );
        assert_eq!(quiz.check_answer(""), AnswerCheck::Wrong { correct: 'A' });
        assert_eq!(
            QuizOutcome::TooShort.check_answer("A"),
            AnswerCheck::NotApplicable
        );
    }

    #[test]
    fn test_answer_check_display() {
        assert_eq!(AnswerCheck::Correct.to_string(), "Correct!");
        assert_eq!(
            AnswerCheck::Wrong { correct: 'A' }.to_string(),
            "Wrong! Correct answer: A"
        );
    }

    #[test]
    fn test_legacy_record_shape() {
        let json = serde_json::to_value(compose_quiz("First idea. Second idea.")).unwrap();
        assert_eq!(json["question"], "What is the main idea of: 'First idea'?");
        assert_eq!(json["answer"], "A");
        assert_eq!(json["options"].as_array().unwrap().len(), 4);

        let json = serde_json::to_value(QuizOutcome::TooShort).unwrap();
        assert_eq!(json["question"], "Summary too short for quiz.");
        assert_eq!(json["answer"], "");
        assert!(json["options"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_record_parses_back() {
        let quiz = compose_quiz("First idea. Second idea.");
        let json = serde_json::to_string(&quiz).unwrap();
        let parsed: QuizOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, quiz);

        let parsed: QuizOutcome =
            serde_json::from_str(r#"{"question": "Summary too short for quiz."}"#).unwrap();
        assert_eq!(parsed, QuizOutcome::TooShort);
    }

    #[test]
    fn test_record_with_wrong_shape_is_rejected() {
        let one_option = r#"{"question": "q", "options": ["only one"], "answer": "z"}"#;
        assert!(serde_json::from_str::<QuizOutcome>(one_option).is_err());

        let other_key = r#"{"question": "q", "options": ["a", "b", "c", "d"], "answer": "C"}"#;
        assert!(serde_json::from_str::<QuizOutcome>(other_key).is_err());

        let no_answer = r#"{"question": "q", "options": ["a", "b", "c", "d"]}"#;
        assert!(serde_json::from_str::<QuizOutcome>(no_answer).is_err());
    }

    #[test]
    fn test_failed_summary_is_quizzed_on_its_text() {
        let failed = Summary::Failed(SummarizationError::Inference("timeout".into()));
        assert_eq!(compose_from_summary(&failed), QuizOutcome::TooShort);
        let ok = Summary::Generated("Rust is fast. It is safe.".into());
        assert_eq!(
            compose_from_summary(&ok).question(),
            "What is the main idea of: 'Rust is fast'?"
        );
    }
}
