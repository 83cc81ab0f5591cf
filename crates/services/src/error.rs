//! Shared error types for the services crate.
//!
//! The controller is the single place where the error taxonomy is decided
//! and exposed: pure core transitions never perform I/O, and all store and
//! ledger failures funnel through here.

use thiserror::Error;

use trivia_client::StoreError;
use trivia_core::model::{QuestionId, SessionIntegrityError};
use trivia_core::progression::ProgressionError;

/// Errors emitted by `ProgressSynchronizer`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// The append did not reach the ledger; no local state was mutated.
    /// Safe to retry; a lost-response duplicate cannot double-count.
    #[error("failed to persist progress")]
    PersistenceFailed(#[source] StoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted by `QuizSessionController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("topic not found")]
    TopicNotFound,

    #[error("topic has no playable content")]
    NoContent,

    #[error(transparent)]
    Integrity(#[from] SessionIntegrityError),

    #[error(transparent)]
    Progression(#[from] ProgressionError),

    #[error("a submission for question {question} is already in flight")]
    SubmissionInFlight { question: QuestionId },

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
