use thiserror::Error;

use crate::model::{TopicId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic name must not be empty")]
    EmptyName,
}

/// A trivia topic. Owned by the content store; immutable from the engine's
/// perspective. Constructible only through [`Topic::new`]; the wire layer
/// maps its DTOs through the validated constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    name: String,
    owner_id: UserId,
}

impl Topic {
    /// Creates a topic with a validated display name.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::EmptyName` if the name is blank after trimming.
    pub fn new(id: TopicId, name: impl Into<String>, owner_id: UserId) -> Result<Self, TopicError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TopicError::EmptyName);
        }
        Ok(Self { id, name, owner_id })
    }

    #[must_use]
    pub fn id(&self) -> TopicId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }
}
