//! Runtime environment helpers
//!
//! Builds the configured quiz repository and makes sure its directory exists,
//! so binary crates only depend on `service` and `configs`.

use std::sync::Arc;

use configs::{StorageBackend, StorageConfig};
use tracing::info;

use crate::file::quiz_store::FileQuizStore;
use crate::memory::quiz_store::MemoryQuizStore;
use crate::quiz::QuizRepository;

/// Ensure the data directory exists; creates it when missing.
pub async fn ensure_env(data_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_env(data_dir).await
}

/// Repository selected by `storage.backend`.
pub async fn build_repository(cfg: &StorageConfig) -> anyhow::Result<Arc<dyn QuizRepository>> {
    match cfg.backend {
        StorageBackend::File => {
            ensure_env(&cfg.dir).await?;
            info!(dir = %cfg.dir, "using file quiz store");
            Ok(FileQuizStore::new(&cfg.dir))
        }
        StorageBackend::Memory => {
            info!("using in-memory quiz store; quizzes are lost on restart");
            Ok(Arc::new(MemoryQuizStore::new()))
        }
    }
}
