use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use trivia_client::ProgressLedger;
use trivia_core::model::{LevelNumber, ProgressFact, QuestionId, TopicId, UserId};

use crate::error::SyncError;

/// Mediates between in-memory quiz state and the progress ledger.
///
/// Owns the optimistic-update contract: the write path persists *before*
/// any derived state changes, so a failed append leaves nothing to roll
/// back. Reads materialize solved flags and the unlock seed when a session
/// is built.
#[derive(Clone)]
pub struct ProgressSynchronizer {
    ledger: Arc<dyn ProgressLedger>,
}

impl ProgressSynchronizer {
    #[must_use]
    pub fn new(ledger: Arc<dyn ProgressLedger>) -> Self {
        Self { ledger }
    }

    /// Appends a fact for a correctly answered question.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::PersistenceFailed` when the append does not
    /// reach the ledger. No local state is mutated on failure; the caller
    /// must treat the answer as not yet recorded and may retry.
    pub async fn record_correct_answer(
        &self,
        user_id: UserId,
        question_id: QuestionId,
    ) -> Result<ProgressFact, SyncError> {
        self.ledger
            .append_fact(user_id, question_id)
            .await
            .map_err(|source| {
                warn!(%question_id, error = %source, "progress append failed");
                SyncError::PersistenceFailed(source)
            })
    }

    /// De-duplicated solved question ids for the user, optionally scoped
    /// to one level.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Store` on ledger read failures.
    pub async fn load_solved(
        &self,
        user_id: UserId,
        topic_id: TopicId,
        level: Option<LevelNumber>,
    ) -> Result<HashSet<QuestionId>, SyncError> {
        Ok(self.ledger.solved_questions(user_id, topic_id, level).await?)
    }

    /// The ledger's highest unlocked level number for (user, topic).
    ///
    /// This is the authoritative seed; the progression engine may advance
    /// past it in memory ahead of the next full reload.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Store` on ledger read failures.
    pub async fn load_max_unlocked_level(
        &self,
        user_id: UserId,
        topic_id: TopicId,
    ) -> Result<u32, SyncError> {
        Ok(self.ledger.max_unlocked_level(user_id, topic_id).await?)
    }
}
