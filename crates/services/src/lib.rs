#![forbid(unsafe_code)]

pub mod controller;
pub mod error;
pub mod synchronizer;

pub use controller::{QuizSessionController, SubmitOutcome};
pub use error::{SessionError, SyncError};
pub use synchronizer::ProgressSynchronizer;
