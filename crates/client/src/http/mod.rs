//! HTTP/JSON adapter implementing [`ContentStore`] and [`ProgressLedger`]
//! against the trivia REST backend.

mod dto;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::env;
use tracing::debug;

use trivia_core::model::{LevelNumber, ProgressFact, QuestionId, TopicId, UserId};

use crate::error::StoreError;
use crate::store::{ContentStore, ProgressLedger, TopicContent};
use dto::{CreateUserProgressDto, QuizDataDto, UserProgressDto};

#[derive(Clone, Debug)]
pub struct HttpStoreConfig {
    pub base_url: String,
    /// Bearer token attached to mutating requests. Reads are public; the
    /// backend requires auth only for appends.
    pub bearer_token: Option<String>,
}

impl HttpStoreConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
        }
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Reads `TRIVIA_API_BASE_URL` and optionally `TRIVIA_API_TOKEN`.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("TRIVIA_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let bearer_token = env::var("TRIVIA_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        Some(Self {
            base_url,
            bearer_token,
        })
    }
}

/// Thin client over the backend's quiz and user-progress endpoints.
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    config: HttpStoreConfig,
}

impl HttpStore {
    #[must_use]
    pub fn new(config: HttpStoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn check(status: StatusCode) -> Result<(), StoreError> {
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        if !status.is_success() {
            return Err(StoreError::Status(status));
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::check(response.status())?;
        Ok(response.json().await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let token = self
            .config
            .bearer_token
            .as_ref()
            .ok_or(StoreError::Unauthorized)?;
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::check(response.status())?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ContentStore for HttpStore {
    async fn fetch_topic_content(
        &self,
        user_id: UserId,
        topic_id: TopicId,
    ) -> Result<TopicContent, StoreError> {
        let payload: QuizDataDto = self
            .get_json(&format!("/quiz/user/{user_id}/{topic_id}"))
            .await?;
        debug!(%topic_id, "fetched topic content");
        payload.into_content()
    }
}

#[async_trait]
impl ProgressLedger for HttpStore {
    async fn append_fact(
        &self,
        user_id: UserId,
        question_id: QuestionId,
    ) -> Result<ProgressFact, StoreError> {
        let body = CreateUserProgressDto {
            user_id: user_id.value(),
            question_id: question_id.value(),
        };
        let created: UserProgressDto = self.post_json("/user-progress", &body).await?;
        Ok(created.into_fact())
    }

    async fn solved_questions(
        &self,
        user_id: UserId,
        topic_id: TopicId,
        level: Option<LevelNumber>,
    ) -> Result<HashSet<QuestionId>, StoreError> {
        let facts: Vec<UserProgressDto> = match level {
            Some(number) => {
                self.get_json(&format!(
                    "/user-progress/topic/level/{user_id}/{topic_id}/{number}"
                ))
                .await?
            }
            // No per-topic unscoped endpoint exists; fetch all of the
            // user's facts. Foreign question ids are inert in the merge.
            None => self.get_json(&format!("/user-progress/user/{user_id}")).await?,
        };
        Ok(facts
            .into_iter()
            .map(|fact| QuestionId::new(fact.question_id))
            .collect())
    }

    async fn facts_for_user(&self, user_id: UserId) -> Result<Vec<ProgressFact>, StoreError> {
        let facts: Vec<UserProgressDto> = self
            .get_json(&format!("/user-progress/user/{user_id}"))
            .await?;
        Ok(facts.into_iter().map(UserProgressDto::into_fact).collect())
    }

    async fn max_unlocked_level(
        &self,
        user_id: UserId,
        topic_id: TopicId,
    ) -> Result<u32, StoreError> {
        self.get_json(&format!("/user-progress/topics-level/{user_id}/{topic_id}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_doubled_slashes() {
        let store = HttpStore::new(HttpStoreConfig::new("https://api.example.test/"));
        assert_eq!(
            store.url("/user-progress"),
            "https://api.example.test/user-progress"
        );
    }

    #[tokio::test]
    async fn append_without_token_is_unauthorized() {
        let store = HttpStore::new(HttpStoreConfig::new("https://api.example.test"));
        let err = store
            .append_fact(UserId::random(), QuestionId::random())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
    }

    #[test]
    fn config_from_env_requires_base_url() {
        // Env-dependent path is covered by the explicit constructors; here
        // just pin the builder surface.
        let config = HttpStoreConfig::new("http://localhost:3000").with_bearer_token("jwt");
        assert_eq!(config.bearer_token.as_deref(), Some("jwt"));
    }
}
