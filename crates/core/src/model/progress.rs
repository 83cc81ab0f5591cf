use chrono::{DateTime, Utc};

use crate::model::{QuestionId, UserId};

/// An immutable ledger record asserting one user solved one question.
///
/// The ledger is append-only and conceptually keyed by (user, question). A
/// retried append after a lost response may leave duplicates server-side;
/// session assembly de-duplicates by question id so they never double-count
/// toward level completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressFact {
    user_id: UserId,
    question_id: QuestionId,
    created_at: DateTime<Utc>,
}

impl ProgressFact {
    #[must_use]
    pub fn new(user_id: UserId, question_id: QuestionId, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            question_id,
            created_at,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
