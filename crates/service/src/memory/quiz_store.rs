use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::quiz::domain::{NewQuiz, Quiz, QuizDocument};
use crate::quiz::repository::QuizRepository;

/// Quizzes kept in a vector, in insertion order.
#[derive(Clone, Default)]
pub struct MemoryQuizStore {
    inner: Arc<RwLock<Vec<QuizDocument>>>,
}

impl MemoryQuizStore {
    pub fn new() -> Self { Self::default() }

    /// Start from pre-existing documents, as if they had been read from disk.
    pub fn with_documents(docs: Vec<QuizDocument>) -> Self {
        Self { inner: Arc::new(RwLock::new(docs)) }
    }
}

#[async_trait]
impl QuizRepository for MemoryQuizStore {
    async fn create(&self, quiz: NewQuiz) -> Result<Quiz, ServiceError> {
        let mut docs = self.inner.write().await;
        let mut id = docs.len() as u64 + 1;
        // same rule as the directory store: never reuse an id already present
        while docs.iter().any(|d| d.id().ok() == Some(id)) {
            id += 1;
        }
        let quiz = Quiz::assign(id, quiz);
        docs.push(QuizDocument::from(&quiz));
        Ok(quiz)
    }

    async fn list(&self) -> Result<Vec<QuizDocument>, ServiceError> {
        Ok(self.inner.read().await.clone())
    }
}
