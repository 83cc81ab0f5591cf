//! Level lock/unlock state machine over [`QuizSession`] snapshots.
//!
//! Transitions are pure: they take a snapshot by reference and return a new
//! one, so callers (and their event loops) decide when observed state is
//! replaced. Unlock checks compare against `max_unlocked_level` strictly:
//! already-earned levels are playable, the next one is reachable only once
//! the frontier level is fully solved.

use thiserror::Error;

use crate::model::{LevelNumber, LevelView, QuestionId, QuestionView, QuizSession};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressionError {
    #[error("level {number} is locked (highest unlocked is {max_unlocked})")]
    LevelLocked {
        number: LevelNumber,
        max_unlocked: LevelNumber,
    },

    #[error("no playable level is numbered {number}")]
    UnknownLevel { number: LevelNumber },

    #[error("question {id} is not part of this session")]
    UnknownQuestion { id: QuestionId },
}

impl QuizSession {
    /// Whether a level may be entered.
    ///
    /// Authoring sessions bypass gating entirely.
    #[must_use]
    pub fn is_unlocked(&self, number: LevelNumber) -> bool {
        self.authoring || number <= self.max_unlocked_level
    }

    /// Resolves a level for navigation, enforcing the lock check.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::UnknownLevel` if no playable level carries
    /// the number, or `ProgressionError::LevelLocked` if it is beyond the
    /// unlock frontier. Rejection has no state effect.
    pub fn select_level(&self, number: LevelNumber) -> Result<&LevelView, ProgressionError> {
        let view = self
            .level(number)
            .ok_or(ProgressionError::UnknownLevel { number })?;
        if !self.is_unlocked(number) {
            return Err(ProgressionError::LevelLocked {
                number,
                max_unlocked: self.max_unlocked_level,
            });
        }
        Ok(view)
    }

    /// Resolves a question for navigation, enforcing its level's lock check.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::UnknownQuestion` if the question is not in
    /// the session, or `ProgressionError::LevelLocked` if its level is.
    pub fn select_question(&self, id: QuestionId) -> Result<&QuestionView, ProgressionError> {
        let (number, view) = self
            .find_question(id)
            .ok_or(ProgressionError::UnknownQuestion { id })?;
        if !self.is_unlocked(number) {
            return Err(ProgressionError::LevelLocked {
                number,
                max_unlocked: self.max_unlocked_level,
            });
        }
        Ok(view)
    }

    /// Marks a question solved and recomputes the unlock frontier.
    ///
    /// Idempotent: marking an already-solved question returns an identical
    /// snapshot and never advances the frontier again. Recomputation reads
    /// the full question list of the affected level at call time, so
    /// sibling questions completed through other snapshots are observed as
    /// long as the caller passes its latest snapshot.
    ///
    /// The frontier only moves when the completed level *is* the frontier
    /// (`number == max_unlocked_level`); completing a level already behind
    /// it is a revisit and has no gating effect. On advance, the frontier
    /// jumps to the next authored level number, which is `number + 1`
    /// whenever levels are contiguous.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::UnknownQuestion` if the question is not
    /// part of this session.
    pub fn mark_solved(&self, id: QuestionId) -> Result<QuizSession, ProgressionError> {
        let Some((level_idx, question_idx)) = self.position_of(id) else {
            return Err(ProgressionError::UnknownQuestion { id });
        };

        let mut next = self.clone();
        {
            let question = &mut next.levels[level_idx].questions[question_idx];
            if question.solved {
                return Ok(next);
            }
            question.solved = true;
        }

        let completed = &next.levels[level_idx];
        if completed.is_complete() && completed.number() == next.max_unlocked_level {
            next.max_unlocked_level = next.frontier_after(completed.number());
        }
        Ok(next)
    }

    /// Next authored level number after `completed`, or `completed + 1`
    /// when nothing further is authored (terminal frontier value).
    fn frontier_after(&self, completed: LevelNumber) -> LevelNumber {
        self.levels
            .iter()
            .map(LevelView::number)
            .find(|number| *number > completed)
            .unwrap_or_else(|| completed.next())
    }
}
