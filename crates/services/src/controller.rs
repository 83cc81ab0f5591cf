use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use trivia_client::{ContentStore, StoreError};
use trivia_core::model::{
    LevelNumber, LevelView, ProgressFact, QuestionId, QuestionView, QuizSession, TopicId, UserId,
};

use crate::error::{SessionError, SyncError};
use crate::synchronizer::ProgressSynchronizer;

/// Result of submitting an answer.
///
/// `session` is the snapshot to adopt. On a persistence failure the
/// original snapshot comes back with `correct = true` and
/// `sync_failed = true`: correctness feedback is never withheld by a
/// transient backend failure, but durable state is. The solved flag stays
/// false until a retry succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub session: QuizSession,
    pub correct: bool,
    pub sync_failed: bool,
    pub fact: Option<ProgressFact>,
}

impl SubmitOutcome {
    fn unchanged(session: &QuizSession, correct: bool) -> Self {
        Self {
            session: session.clone(),
            correct,
            sync_failed: false,
            fact: None,
        }
    }
}

/// Orchestrates content loading, answer evaluation, persistence and level
/// progression into per-(user, topic) quiz sessions.
///
/// Sessions are immutable snapshots owned by the caller. The controller
/// holds the in-flight submission guard plus the set of solves it has
/// recorded, so snapshots built after an append observe every sibling
/// solve recorded so far, even from a stale snapshot argument.
#[derive(Clone)]
pub struct QuizSessionController {
    content: Arc<dyn ContentStore>,
    sync: ProgressSynchronizer,
    in_flight: Arc<Mutex<HashSet<QuestionId>>>,
    recorded: Arc<Mutex<HashSet<(UserId, QuestionId)>>>,
}

impl QuizSessionController {
    #[must_use]
    pub fn new(content: Arc<dyn ContentStore>, sync: ProgressSynchronizer) -> Self {
        Self {
            content,
            sync,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            recorded: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Builds a fresh session: full content reload merged with the ledger's
    /// solved facts and unlock seed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::TopicNotFound` if the topic does not exist,
    /// `SessionError::NoContent` if no level holds a question,
    /// `SessionError::Integrity` on content integrity violations, and
    /// store/ledger errors otherwise. No partial session is ever returned.
    pub async fn start_session(
        &self,
        user_id: UserId,
        topic_id: TopicId,
    ) -> Result<QuizSession, SessionError> {
        self.load(user_id, topic_id, false).await
    }

    /// Like [`Self::start_session`] but with level gating disabled, for
    /// content authors previewing their own topics.
    ///
    /// # Errors
    ///
    /// Same as [`Self::start_session`].
    pub async fn start_authoring_session(
        &self,
        user_id: UserId,
        topic_id: TopicId,
    ) -> Result<QuizSession, SessionError> {
        self.load(user_id, topic_id, true).await
    }

    async fn load(
        &self,
        user_id: UserId,
        topic_id: TopicId,
        authoring: bool,
    ) -> Result<QuizSession, SessionError> {
        let content = self
            .content
            .fetch_topic_content(user_id, topic_id)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => SessionError::TopicNotFound,
                other => SessionError::Store(other),
            })?;
        let solved = self.sync.load_solved(user_id, topic_id, None).await?;
        let ledger_level = self.sync.load_max_unlocked_level(user_id, topic_id).await?;

        let session = QuizSession::assemble(
            content.topic,
            content.levels,
            content.questions,
            &solved,
            ledger_level,
            authoring,
        )?;
        if session.is_empty() {
            return Err(SessionError::NoContent);
        }

        debug!(
            %topic_id,
            levels = session.levels().len(),
            max_unlocked = %session.max_unlocked_level(),
            authoring,
            "session assembled"
        );
        Ok(session)
    }

    /// Evaluates a submission and, when correct, persists it and advances
    /// the session.
    ///
    /// Two-phase on a correct answer: the ledger append must succeed before
    /// any derived state changes. Submissions for a question already in
    /// flight are rejected; submissions for different questions may run
    /// concurrently. The returned snapshot carries every solve this
    /// controller has recorded for the user, not just the one submitted
    /// here, so the frontier recompute observes sibling questions completed
    /// while this round-trip was outstanding even if the passed snapshot
    /// predates them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Progression` if the question is unknown or
    /// its level locked, and `SessionError::SubmissionInFlight` on a
    /// duplicate concurrent submission. A failed ledger append is *not* an
    /// error: see [`SubmitOutcome`].
    pub async fn submit_answer(
        &self,
        user_id: UserId,
        session: &QuizSession,
        question_id: QuestionId,
        submitted: &str,
    ) -> Result<SubmitOutcome, SessionError> {
        let view = session.select_question(question_id)?;
        let correct = view.question().accepts(submitted);
        if !correct {
            return Ok(SubmitOutcome::unchanged(session, false));
        }
        if view.solved() {
            // Replaying an already-solved question: correct feedback, but
            // nothing to persist or advance.
            return Ok(SubmitOutcome::unchanged(session, true));
        }

        let _guard = self.begin_submission(question_id)?;
        match self.sync.record_correct_answer(user_id, question_id).await {
            Ok(fact) => {
                // Insert and snapshot under one lock acquisition: of two
                // concurrent sibling submissions, the later one is
                // guaranteed to see both solves.
                let recorded = {
                    let mut recorded = self
                        .recorded
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    recorded.insert((user_id, question_id));
                    recorded.clone()
                };
                let next = Self::apply_recorded(session, user_id, &recorded)?;
                Ok(SubmitOutcome {
                    session: next,
                    correct: true,
                    sync_failed: false,
                    fact: Some(fact),
                })
            }
            Err(SyncError::PersistenceFailed(source)) => {
                warn!(%question_id, error = %source, "answer correct but not recorded");
                Ok(SubmitOutcome {
                    session: session.clone(),
                    correct: true,
                    sync_failed: true,
                    fact: None,
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Pure navigation: resolves a level, enforcing the lock check.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Progression` for locked or unknown levels;
    /// the session is untouched.
    pub fn select_level<'s>(
        &self,
        session: &'s QuizSession,
        number: LevelNumber,
    ) -> Result<&'s LevelView, SessionError> {
        Ok(session.select_level(number)?)
    }

    /// Pure navigation: resolves a question, enforcing its level's lock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Progression` for unknown questions or locked
    /// levels.
    pub fn select_question<'s>(
        &self,
        session: &'s QuizSession,
        question_id: QuestionId,
    ) -> Result<&'s QuestionView, SessionError> {
        Ok(session.select_question(question_id)?)
    }

    /// Applies every recorded solve present in the session to a fresh
    /// snapshot, in ascending level order so each frontier completion is
    /// recomputed against its predecessors.
    fn apply_recorded(
        session: &QuizSession,
        user_id: UserId,
        recorded: &HashSet<(UserId, QuestionId)>,
    ) -> Result<QuizSession, SessionError> {
        let ids: Vec<QuestionId> = session
            .levels()
            .iter()
            .flat_map(|view| view.questions().iter().map(QuestionView::id))
            .filter(|id| recorded.contains(&(user_id, *id)))
            .collect();
        let mut next = session.clone();
        for id in ids {
            next = next.mark_solved(id)?;
        }
        Ok(next)
    }

    fn begin_submission(&self, question_id: QuestionId) -> Result<InFlightGuard, SessionError> {
        let mut outstanding = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !outstanding.insert(question_id) {
            return Err(SessionError::SubmissionInFlight {
                question: question_id,
            });
        }
        Ok(InFlightGuard {
            set: Arc::clone(&self.in_flight),
            question_id,
        })
    }
}

/// Releases the per-question submission slot on every exit path.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<QuestionId>>>,
    question_id: QuestionId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.question_id);
    }
}
