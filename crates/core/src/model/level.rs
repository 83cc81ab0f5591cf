use std::fmt;
use thiserror::Error;

use crate::model::{LevelId, TopicId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level number must be positive")]
    ZeroNumber,

    #[error("level name must not be empty")]
    EmptyName,
}

/// Position of a level in its topic's gating order.
///
/// Always positive; defines the strict total order used for unlock checks.
/// Numbers need not be contiguous within a topic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelNumber(u32);

impl LevelNumber {
    /// Creates a level number.
    ///
    /// # Errors
    ///
    /// Returns `LevelError::ZeroNumber` for 0.
    pub fn new(number: u32) -> Result<Self, LevelError> {
        if number == 0 {
            return Err(LevelError::ZeroNumber);
        }
        Ok(Self(number))
    }

    /// Creates a level number, clamping 0 up to 1.
    ///
    /// The progress API reports 0 for "no progress yet"; callers seeding
    /// unlock state from it use this instead of `new`.
    #[must_use]
    pub fn clamped(number: u32) -> Self {
        Self(number.max(1))
    }

    /// Returns the underlying number
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The number immediately after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Debug for LevelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevelNumber({})", self.0)
    }
}

impl fmt::Display for LevelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A difficulty level within a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    id: LevelId,
    topic_id: TopicId,
    number: LevelNumber,
    name: String,
    color_tag: Option<String>,
}

impl Level {
    /// Creates a level with a validated display name.
    ///
    /// # Errors
    ///
    /// Returns `LevelError::EmptyName` if the name is blank after trimming.
    pub fn new(
        id: LevelId,
        topic_id: TopicId,
        number: LevelNumber,
        name: impl Into<String>,
        color_tag: Option<String>,
    ) -> Result<Self, LevelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LevelError::EmptyName);
        }
        Ok(Self {
            id,
            topic_id,
            number,
            name,
            color_tag,
        })
    }

    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    #[must_use]
    pub fn number(&self) -> LevelNumber {
        self.number
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional display color tag authored for this level.
    #[must_use]
    pub fn color_tag(&self) -> Option<&str> {
        self.color_tag.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_level_number_is_rejected() {
        assert!(matches!(LevelNumber::new(0), Err(LevelError::ZeroNumber)));
        assert_eq!(LevelNumber::new(1).unwrap().value(), 1);
    }

    #[test]
    fn clamped_maps_zero_to_one() {
        assert_eq!(LevelNumber::clamped(0).value(), 1);
        assert_eq!(LevelNumber::clamped(4).value(), 4);
    }

    #[test]
    fn next_advances_by_one() {
        let n = LevelNumber::new(2).unwrap();
        assert_eq!(n.next().value(), 3);
    }

    #[test]
    fn level_numbers_order_by_value() {
        let low = LevelNumber::new(1).unwrap();
        let high = LevelNumber::new(7).unwrap();
        assert!(low < high);
    }

    #[test]
    fn rejects_blank_level_name() {
        let err = Level::new(
            LevelId::random(),
            TopicId::random(),
            LevelNumber::new(1).unwrap(),
            "",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, LevelError::EmptyName));
    }
}
