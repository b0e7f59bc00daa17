use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tracing::warn;

use crate::errors::ServiceError;
use crate::quiz::domain::{NewQuiz, Quiz, QuizDocument};
use crate::quiz::repository::QuizRepository;
use crate::storage::json_dir_store::JsonDirStore;

/// File storage: every quiz lives in `<dir>/<id>.json`.
pub struct FileQuizStore {
    store: JsonDirStore,
}

impl FileQuizStore {
    /// The directory itself is only created on first use.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Arc<Self> {
        Arc::new(Self { store: JsonDirStore::new(dir) })
    }
}

#[async_trait]
impl QuizRepository for FileQuizStore {
    /// Next id is the number of files plus one. Creation is serialized, and a
    /// taken file name moves the id forward instead of overwriting it.
    async fn create(&self, quiz: NewQuiz) -> Result<Quiz, ServiceError> {
        let _guard = self.store.lock().await;
        let mut quiz = Quiz::assign(self.store.count().await? as u64 + 1, quiz);
        loop {
            if self.store.write_new(&format!("{}.json", quiz.id), &quiz).await? {
                return Ok(quiz);
            }
            warn!(quiz_id = quiz.id, dir = %self.store.dir().display(), "quiz file already exists; trying next id");
            quiz.id += 1;
        }
    }

    async fn list(&self) -> Result<Vec<QuizDocument>, ServiceError> {
        self.store.read_all().await
    }
}
