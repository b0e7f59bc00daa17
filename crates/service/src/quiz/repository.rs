use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::quiz::domain::{NewQuiz, Quiz, QuizDocument};

/// Storage seam for quizzes. Implementations can be file-backed or in-memory.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Assign the next id (current count + 1) and persist.
    async fn create(&self, quiz: NewQuiz) -> Result<Quiz, ServiceError>;

    /// Every stored quiz, in the store's enumeration order.
    async fn list(&self) -> Result<Vec<QuizDocument>, ServiceError>;

    /// Linear scan for the document whose `id` key equals `id`.
    async fn get_by_id(&self, id: u64) -> Result<Option<QuizDocument>, ServiceError> {
        for doc in self.list().await? {
            if doc.id()? == id {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }
}
