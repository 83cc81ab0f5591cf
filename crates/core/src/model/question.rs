use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::{LevelId, QuestionId, TopicId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text must not be empty")]
    EmptyText,

    #[error("correct answer must not be empty")]
    EmptyAnswer,

    #[error("multiple choice question needs at least one incorrect answer")]
    MissingIncorrectAnswers,

    #[error("incorrect answer {text:?} duplicates the correct answer")]
    IncorrectMatchesCorrect { text: String },

    #[error("incorrect answer {text:?} appears more than once")]
    DuplicateIncorrect { text: String },

    #[error("open question cannot carry incorrect answers")]
    UnexpectedIncorrectAnswers,
}

/// Question form: a fixed choice set, or free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    Open,
}

/// Canonical answer comparison form: trimmed and lowercased.
///
/// Every correctness and duplicate check in the engine goes through this;
/// case and surrounding whitespace never affect a verdict.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// An authored question within one topic and level.
///
/// Constructible only through [`Question::new`]; the wire layer maps its
/// DTOs through it so nothing can carry an unvalidated answer set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    topic_id: TopicId,
    level_id: LevelId,
    text: String,
    kind: QuestionKind,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    created_at: DateTime<Utc>,
}

impl Question {
    /// Creates a question, enforcing the kind-dependent answer invariants.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or correct answer is blank, an
    /// open question carries incorrect answers, or a multiple-choice
    /// question has no incorrect answers, one that duplicates the correct
    /// answer, or duplicates among themselves (all under normalized
    /// comparison). These are data-integrity errors: content that fails
    /// here must be rejected at load, never repaired.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QuestionId,
        topic_id: TopicId,
        level_id: LevelId,
        text: impl Into<String>,
        kind: QuestionKind,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        let correct_answer = correct_answer.into();
        if correct_answer.trim().is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }

        match kind {
            QuestionKind::Open => {
                if !incorrect_answers.is_empty() {
                    return Err(QuestionError::UnexpectedIncorrectAnswers);
                }
            }
            QuestionKind::MultipleChoice => {
                if incorrect_answers.is_empty() {
                    return Err(QuestionError::MissingIncorrectAnswers);
                }
                let correct_norm = normalize(&correct_answer);
                let mut seen = HashSet::with_capacity(incorrect_answers.len());
                for answer in &incorrect_answers {
                    let norm = normalize(answer);
                    if norm == correct_norm {
                        return Err(QuestionError::IncorrectMatchesCorrect {
                            text: answer.clone(),
                        });
                    }
                    if !seen.insert(norm) {
                        return Err(QuestionError::DuplicateIncorrect {
                            text: answer.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            id,
            topic_id,
            level_id,
            text,
            kind,
            correct_answer,
            incorrect_answers,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    #[must_use]
    pub fn level_id(&self) -> LevelId {
        self.level_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Incorrect options in authored order. Empty for open questions.
    #[must_use]
    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Decides whether a submitted answer is correct.
    ///
    /// Normalized exact equality against the canonical answer for both
    /// kinds; no fuzzy matching, no partial credit. For multiple choice the
    /// caller constrains input to the presented option set; membership is
    /// not validated here.
    #[must_use]
    pub fn accepts(&self, submitted: &str) -> bool {
        normalize(submitted) == normalize(&self.correct_answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn open_question(correct: &str) -> Question {
        Question::new(
            QuestionId::random(),
            TopicId::random(),
            LevelId::random(),
            "Capital of France?",
            QuestionKind::Open,
            correct,
            Vec::new(),
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn accepts_ignores_case_and_whitespace() {
        let q = open_question("paris");
        assert!(q.accepts(" Paris "));
        assert!(q.accepts("PARIS"));
        assert!(!q.accepts("London"));
    }

    #[test]
    fn accepts_requires_exact_normalized_match() {
        let q = open_question("paris");
        assert!(!q.accepts("pari"));
        assert!(!q.accepts("paris france"));
    }

    #[test]
    fn multiple_choice_requires_incorrect_answers() {
        let err = Question::new(
            QuestionId::random(),
            TopicId::random(),
            LevelId::random(),
            "Pick one",
            QuestionKind::MultipleChoice,
            "A",
            Vec::new(),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::MissingIncorrectAnswers));
    }

    #[test]
    fn incorrect_answer_may_not_shadow_correct_answer() {
        let err = Question::new(
            QuestionId::random(),
            TopicId::random(),
            LevelId::random(),
            "Pick one",
            QuestionKind::MultipleChoice,
            "Mercury",
            vec!["Venus".into(), " mercury ".into()],
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::IncorrectMatchesCorrect { .. }));
    }

    #[test]
    fn duplicate_incorrect_answers_are_rejected() {
        let err = Question::new(
            QuestionId::random(),
            TopicId::random(),
            LevelId::random(),
            "Pick one",
            QuestionKind::MultipleChoice,
            "Mercury",
            vec!["Venus".into(), "VENUS".into()],
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::DuplicateIncorrect { .. }));
    }

    #[test]
    fn open_question_may_not_carry_incorrect_answers() {
        let err = Question::new(
            QuestionId::random(),
            TopicId::random(),
            LevelId::random(),
            "Capital of France?",
            QuestionKind::Open,
            "Paris",
            vec!["London".into()],
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::UnexpectedIncorrectAnswers));
    }
}
