//! Wire shapes for the trivia REST API, plus fallible mapping into domain
//! types. Field names mirror the backend JSON (`answer_text`,
//! `question_type`, levels keyed by number string).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use uuid::Uuid;

use trivia_core::model::{
    Level, LevelId, LevelNumber, ProgressFact, Question, QuestionId, QuestionKind, Topic, TopicId,
    UserId,
};

use crate::error::StoreError;
use crate::store::TopicContent;

fn decode<E: Display>(err: E) -> StoreError {
    StoreError::Decode(err.to_string())
}

/// `GET /quiz/user/{userId}/{topicId}` payload.
///
/// The endpoint also embeds per-user progress (`maxUserLevel`, per-question
/// `answered`); those fields are not modeled here. The ledger
/// read paths are authoritative for progress, the content fetch only for
/// authored content.
#[derive(Debug, Deserialize)]
pub(crate) struct QuizDataDto {
    pub topic: TopicDto,
    pub levels: HashMap<String, LevelWithQuestionsDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopicDto {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LevelWithQuestionsDto {
    pub id: Uuid,
    pub level_number: u32,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionDto {
    pub id: Uuid,
    pub text: String,
    pub question_type: QuestionKind,
    pub answer_text: String,
    #[serde(default)]
    pub answers: Vec<AnswerDto>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerDto {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserProgressDto {
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateUserProgressDto {
    pub user_id: Uuid,
    pub question_id: Uuid,
}

impl QuizDataDto {
    /// Maps the payload into validated domain records.
    ///
    /// Domain invariant violations in authored content (zero level numbers,
    /// malformed answer sets) surface as `StoreError::Decode`; content that
    /// fails validation is rejected wholesale, never partially loaded.
    pub(crate) fn into_content(self) -> Result<TopicContent, StoreError> {
        let topic = Topic::new(
            TopicId::new(self.topic.id),
            self.topic.name,
            UserId::new(self.topic.owner_id),
        )
        .map_err(decode)?;

        let mut levels = Vec::with_capacity(self.levels.len());
        let mut questions = Vec::new();
        for dto in self.levels.into_values() {
            let number = LevelNumber::new(dto.level_number).map_err(decode)?;
            let level = Level::new(LevelId::new(dto.id), topic.id(), number, dto.name, dto.color)
                .map_err(decode)?;
            for q in dto.questions {
                questions.push(
                    Question::new(
                        QuestionId::new(q.id),
                        topic.id(),
                        level.id(),
                        q.text,
                        q.question_type,
                        q.answer_text,
                        q.answers.into_iter().map(|a| a.text).collect(),
                        q.created_at,
                    )
                    .map_err(decode)?,
                );
            }
            levels.push(level);
        }

        Ok(TopicContent {
            topic,
            levels,
            questions,
        })
    }
}

impl UserProgressDto {
    pub(crate) fn into_fact(self) -> ProgressFact {
        ProgressFact::new(
            UserId::new(self.user_id),
            QuestionId::new(self.question_id),
            self.created_at,
        )
    }
}
