use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use trivia_core::Clock;
use trivia_core::model::{
    Level, LevelNumber, ProgressFact, Question, QuestionId, Topic, TopicId, UserId,
};

use crate::error::StoreError;

/// Everything the content store holds for one topic.
///
/// Raw authored records; merging in per-user progress is the services
/// layer's job.
#[derive(Debug, Clone)]
pub struct TopicContent {
    pub topic: Topic,
    pub levels: Vec<Level>,
    pub questions: Vec<Question>,
}

/// Read-only source of authored topics, levels and questions.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a topic with all of its levels and questions.
    ///
    /// `user_id` addresses the transport (the REST content endpoint is
    /// per-user); implementations that hold content globally may ignore it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the topic does not exist, or other
    /// store errors.
    async fn fetch_topic_content(
        &self,
        user_id: UserId,
        topic_id: TopicId,
    ) -> Result<TopicContent, StoreError>;
}

/// Append-only store of "user solved question" facts.
#[async_trait]
pub trait ProgressLedger: Send + Sync {
    /// Append a fact for (user, question), returning the created record.
    ///
    /// Must be safe to retry: a duplicate append after a lost response is
    /// tolerated because readers de-duplicate by question id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the fact cannot be appended.
    async fn append_fact(
        &self,
        user_id: UserId,
        question_id: QuestionId,
    ) -> Result<ProgressFact, StoreError>;

    /// Solved question ids for a user, optionally scoped to one level of
    /// the topic.
    ///
    /// The unscoped form may over-return ids from other topics; callers
    /// merge by membership, so foreign ids are inert.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on read failures.
    async fn solved_questions(
        &self,
        user_id: UserId,
        topic_id: TopicId,
        level: Option<LevelNumber>,
    ) -> Result<HashSet<QuestionId>, StoreError>;

    /// All facts recorded for a user, across topics.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on read failures.
    async fn facts_for_user(&self, user_id: UserId) -> Result<Vec<ProgressFact>, StoreError>;

    /// The ledger's authoritative highest unlocked level number for
    /// (user, topic); 0 means no recorded progress.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on read failures.
    async fn max_unlocked_level(
        &self,
        user_id: UserId,
        topic_id: TopicId,
    ) -> Result<u32, StoreError>;
}

#[derive(Default)]
struct InMemoryInner {
    topics: HashMap<TopicId, Topic>,
    levels: Vec<Level>,
    questions: Vec<Question>,
    facts: Vec<ProgressFact>,
    unlocked: HashMap<(UserId, TopicId), u32>,
}

/// In-memory content store + progress ledger for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    clock: Clock,
    inner: Arc<Mutex<InMemoryInner>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the clock used to stamp appended facts.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn insert_topic(&self, topic: Topic) {
        self.lock().topics.insert(topic.id(), topic);
    }

    pub fn insert_level(&self, level: Level) {
        self.lock().levels.push(level);
    }

    pub fn insert_question(&self, question: Question) {
        self.lock().questions.push(question);
    }

    pub fn set_max_unlocked_level(&self, user_id: UserId, topic_id: TopicId, level: u32) {
        self.lock().unlocked.insert((user_id, topic_id), level);
    }

    /// Number of facts recorded for (user, question); lets tests assert
    /// that retries or double-submissions did not double-append.
    #[must_use]
    pub fn fact_count(&self, user_id: UserId, question_id: QuestionId) -> usize {
        self.lock()
            .facts
            .iter()
            .filter(|f| f.user_id() == user_id && f.question_id() == question_id)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn level_number_of(inner: &InMemoryInner, question_id: QuestionId) -> Option<LevelNumber> {
        let question = inner.questions.iter().find(|q| q.id() == question_id)?;
        inner
            .levels
            .iter()
            .find(|l| l.id() == question.level_id())
            .map(Level::number)
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn fetch_topic_content(
        &self,
        _user_id: UserId,
        topic_id: TopicId,
    ) -> Result<TopicContent, StoreError> {
        let inner = self.lock();
        let topic = inner
            .topics
            .get(&topic_id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        let levels = inner
            .levels
            .iter()
            .filter(|l| l.topic_id() == topic_id)
            .cloned()
            .collect();
        let questions = inner
            .questions
            .iter()
            .filter(|q| q.topic_id() == topic_id)
            .cloned()
            .collect();
        Ok(TopicContent {
            topic,
            levels,
            questions,
        })
    }
}

#[async_trait]
impl ProgressLedger for InMemoryStore {
    async fn append_fact(
        &self,
        user_id: UserId,
        question_id: QuestionId,
    ) -> Result<ProgressFact, StoreError> {
        let fact = ProgressFact::new(user_id, question_id, self.clock.now());
        self.lock().facts.push(fact.clone());
        Ok(fact)
    }

    async fn solved_questions(
        &self,
        user_id: UserId,
        topic_id: TopicId,
        level: Option<LevelNumber>,
    ) -> Result<HashSet<QuestionId>, StoreError> {
        let inner = self.lock();
        let mut solved = HashSet::new();
        for fact in inner.facts.iter().filter(|f| f.user_id() == user_id) {
            let in_topic = inner
                .questions
                .iter()
                .any(|q| q.id() == fact.question_id() && q.topic_id() == topic_id);
            if !in_topic {
                continue;
            }
            if let Some(wanted) = level {
                if Self::level_number_of(&inner, fact.question_id()) != Some(wanted) {
                    continue;
                }
            }
            solved.insert(fact.question_id());
        }
        Ok(solved)
    }

    async fn facts_for_user(&self, user_id: UserId) -> Result<Vec<ProgressFact>, StoreError> {
        Ok(self
            .lock()
            .facts
            .iter()
            .filter(|f| f.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn max_unlocked_level(
        &self,
        user_id: UserId,
        topic_id: TopicId,
    ) -> Result<u32, StoreError> {
        Ok(self
            .lock()
            .unlocked
            .get(&(user_id, topic_id))
            .copied()
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::model::{LevelId, QuestionKind};
    use trivia_core::time::{fixed_clock, fixed_now};

    fn seed(store: &InMemoryStore) -> (Topic, Level, Question) {
        let topic = Topic::new(TopicId::random(), "Science", UserId::random()).unwrap();
        let level = Level::new(
            LevelId::random(),
            topic.id(),
            LevelNumber::new(1).unwrap(),
            "Basics",
            None,
        )
        .unwrap();
        let question = Question::new(
            QuestionId::random(),
            topic.id(),
            level.id(),
            "2 + 2?",
            QuestionKind::Open,
            "4",
            Vec::new(),
            fixed_now(),
        )
        .unwrap();
        store.insert_topic(topic.clone());
        store.insert_level(level.clone());
        store.insert_question(question.clone());
        (topic, level, question)
    }

    #[tokio::test]
    async fn fetch_topic_content_scopes_to_topic() {
        let store = InMemoryStore::new();
        let (topic, _level, question) = seed(&store);
        let (_other, _, _) = seed(&store);

        let content = store
            .fetch_topic_content(UserId::random(), topic.id())
            .await
            .unwrap();
        assert_eq!(content.topic.id(), topic.id());
        assert_eq!(content.levels.len(), 1);
        assert_eq!(content.questions.len(), 1);
        assert_eq!(content.questions[0].id(), question.id());
    }

    #[tokio::test]
    async fn missing_topic_is_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .fetch_topic_content(UserId::random(), TopicId::random())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn appended_facts_come_back_from_the_read_paths() {
        let store = InMemoryStore::new().with_clock(fixed_clock());
        let (topic, _level, question) = seed(&store);
        let user = UserId::random();

        let fact = store.append_fact(user, question.id()).await.unwrap();
        assert_eq!(fact.created_at(), fixed_now());

        let solved = store
            .solved_questions(user, topic.id(), None)
            .await
            .unwrap();
        assert_eq!(solved, HashSet::from([question.id()]));

        let scoped = store
            .solved_questions(user, topic.id(), Some(LevelNumber::new(1).unwrap()))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);

        let other_level = store
            .solved_questions(user, topic.id(), Some(LevelNumber::new(2).unwrap()))
            .await
            .unwrap();
        assert!(other_level.is_empty());
    }

    #[tokio::test]
    async fn duplicate_appends_are_kept_but_read_as_one_solved_id() {
        let store = InMemoryStore::new();
        let (topic, _level, question) = seed(&store);
        let user = UserId::random();

        store.append_fact(user, question.id()).await.unwrap();
        store.append_fact(user, question.id()).await.unwrap();

        assert_eq!(store.fact_count(user, question.id()), 2);
        let solved = store
            .solved_questions(user, topic.id(), None)
            .await
            .unwrap();
        assert_eq!(solved.len(), 1);
    }

    #[tokio::test]
    async fn max_unlocked_level_defaults_to_zero() {
        let store = InMemoryStore::new();
        let (topic, _, _) = seed(&store);
        let user = UserId::random();

        assert_eq!(store.max_unlocked_level(user, topic.id()).await.unwrap(), 0);
        store.set_max_unlocked_level(user, topic.id(), 3);
        assert_eq!(store.max_unlocked_level(user, topic.id()).await.unwrap(), 3);
    }
}
