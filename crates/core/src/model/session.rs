use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::model::{Level, LevelId, LevelNumber, Question, QuestionId, Topic};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionIntegrityError {
    #[error("two levels share number {number}")]
    DuplicateLevelNumber { number: LevelNumber },

    #[error("question {question} references unknown level {level}")]
    UnknownLevel { question: QuestionId, level: LevelId },

    #[error("question {question} belongs to a different topic")]
    ForeignQuestion { question: QuestionId },
}

/// A question merged with the user's solved flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub(crate) question: Question,
    pub(crate) solved: bool,
}

impl QuestionView {
    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.question.id()
    }

    /// True iff a progress fact exists for this question and user.
    #[must_use]
    pub fn solved(&self) -> bool {
        self.solved
    }
}

/// A level with its questions in authored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelView {
    pub(crate) level: Level,
    pub(crate) questions: Vec<QuestionView>,
}

impl LevelView {
    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[must_use]
    pub fn number(&self) -> LevelNumber {
        self.level.number()
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionView] {
        &self.questions
    }

    #[must_use]
    pub fn solved_count(&self) -> usize {
        self.questions.iter().filter(|q| q.solved).count()
    }

    /// True when every question in the level is solved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.questions.iter().all(|q| q.solved)
    }
}

/// The per-(user, topic) merged view of content and progress.
///
/// An immutable snapshot: it is rebuilt in full on session start and only
/// replaced through the transition methods in [`crate::progression`], which
/// return new snapshots. Levels are held sorted ascending by number; levels
/// with no authored questions are excluded entirely (they can never be
/// played or gate anything).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    pub(crate) topic: Topic,
    pub(crate) max_unlocked_level: LevelNumber,
    pub(crate) levels: Vec<LevelView>,
    pub(crate) authoring: bool,
}

impl QuizSession {
    /// Builds a session snapshot from content-store records and ledger state.
    ///
    /// `solved` is the de-duplicated set of question ids the ledger holds
    /// facts for; `ledger_level` is the authoritative highest unlocked level
    /// number (0 meaning "no progress"). The seed is clamped up to the
    /// lowest playable level so the first level is never gated.
    ///
    /// # Errors
    ///
    /// Returns `SessionIntegrityError` when two levels share a number or a
    /// question references a level or topic outside this session. Integrity
    /// failures abort assembly; they are never silently repaired.
    pub fn assemble(
        topic: Topic,
        mut levels: Vec<Level>,
        questions: Vec<Question>,
        solved: &HashSet<QuestionId>,
        ledger_level: u32,
        authoring: bool,
    ) -> Result<Self, SessionIntegrityError> {
        levels.sort_by_key(Level::number);
        for pair in levels.windows(2) {
            if pair[0].number() == pair[1].number() {
                return Err(SessionIntegrityError::DuplicateLevelNumber {
                    number: pair[0].number(),
                });
            }
        }

        let index_by_id: HashMap<LevelId, usize> = levels
            .iter()
            .enumerate()
            .map(|(idx, level)| (level.id(), idx))
            .collect();

        let mut views: Vec<LevelView> = levels
            .into_iter()
            .map(|level| LevelView {
                level,
                questions: Vec::new(),
            })
            .collect();

        for question in questions {
            if question.topic_id() != topic.id() {
                return Err(SessionIntegrityError::ForeignQuestion {
                    question: question.id(),
                });
            }
            let Some(&idx) = index_by_id.get(&question.level_id()) else {
                return Err(SessionIntegrityError::UnknownLevel {
                    question: question.id(),
                    level: question.level_id(),
                });
            };
            let is_solved = solved.contains(&question.id());
            views[idx].questions.push(QuestionView {
                question,
                solved: is_solved,
            });
        }

        views.retain(|view| !view.questions.is_empty());

        let lowest = views
            .first()
            .map_or_else(|| LevelNumber::clamped(1), LevelView::number);
        let max_unlocked_level = LevelNumber::clamped(ledger_level).max(lowest);

        Ok(Self {
            topic,
            max_unlocked_level,
            levels: views,
            authoring,
        })
    }

    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Highest level number currently unlocked for the user.
    ///
    /// Monotonically non-decreasing within a session: seeded from the
    /// ledger, advanced in memory as frontier levels complete.
    #[must_use]
    pub fn max_unlocked_level(&self) -> LevelNumber {
        self.max_unlocked_level
    }

    /// Playable levels, ascending by number.
    #[must_use]
    pub fn levels(&self) -> &[LevelView] {
        &self.levels
    }

    /// True when the session bypasses level gating for content authoring.
    #[must_use]
    pub fn is_authoring(&self) -> bool {
        self.authoring
    }

    /// True when no level holds any question.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Looks up a level view by number.
    #[must_use]
    pub fn level(&self, number: LevelNumber) -> Option<&LevelView> {
        self.levels
            .binary_search_by_key(&number, LevelView::number)
            .ok()
            .map(|idx| &self.levels[idx])
    }

    /// Locates a question anywhere in the session.
    #[must_use]
    pub fn find_question(&self, id: QuestionId) -> Option<(LevelNumber, &QuestionView)> {
        self.levels.iter().find_map(|view| {
            view.questions
                .iter()
                .find(|q| q.id() == id)
                .map(|q| (view.number(), q))
        })
    }

    pub(crate) fn position_of(&self, id: QuestionId) -> Option<(usize, usize)> {
        self.levels.iter().enumerate().find_map(|(li, view)| {
            view.questions
                .iter()
                .position(|q| q.id() == id)
                .map(|qi| (li, qi))
        })
    }
}
