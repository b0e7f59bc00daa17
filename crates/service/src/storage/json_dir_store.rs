use std::{cmp::Ordering, io::ErrorKind, path::{Path, PathBuf}};
use tokio::{fs, io::AsyncWriteExt, sync::{Mutex, MutexGuard}};
use tracing::debug;

use crate::errors::ServiceError;

/// Directory of JSON documents, one file per record.
///
/// The directory is created lazily on first access. Listing returns regular
/// files only, numeric stems first in ascending order, then the rest by name.
pub struct JsonDirStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonDirStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into(), write_lock: Mutex::new(()) }
    }

    pub fn dir(&self) -> &Path { &self.dir }

    /// Serialize writers that derive a file name from the current contents.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Names of the regular files in the directory.
    pub async fn file_names(&self) -> Result<Vec<String>, ServiceError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir).await?;
                debug!(dir = %self.dir.display(), "created storage directory");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            // follow symlinks like a plain `is_file` check would
            let is_file = fs::metadata(entry.path()).await.map(|m| m.is_file()).unwrap_or(false);
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort_by(|a, b| listing_order(a, b));
        Ok(names)
    }

    pub async fn count(&self) -> Result<usize, ServiceError> {
        Ok(self.file_names().await?.len())
    }

    pub async fn read<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T, ServiceError> {
        let bytes = fs::read(self.dir.join(name)).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::Storage(format!("{}: {e}", self.dir.join(name).display())))
    }

    /// Read every document; one unreadable file fails the whole listing.
    pub async fn read_all<T: serde::de::DeserializeOwned>(&self) -> Result<Vec<T>, ServiceError> {
        let mut out = Vec::new();
        for name in self.file_names().await? {
            out.push(self.read(&name).await?);
        }
        Ok(out)
    }

    /// Write `value` to `name` unless that file already exists.
    /// Returns `false` when the name is taken.
    ///
    /// The document is written under `.staging/` first and hard-linked into
    /// place, so readers never see a partial file and a failed write leaves
    /// nothing in the listing. Linking fails if `name` exists, which keeps
    /// create-new semantics.
    pub async fn write_new<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<bool, ServiceError> {
        let data = serde_json::to_vec(value)?;
        let staging = self.dir.join(STAGING_DIR);
        fs::create_dir_all(&staging).await?;
        let tmp = staging.join(format!("{name}.{}", std::process::id()));

        let linked = match stage(&tmp, &data).await {
            Ok(()) => fs::hard_link(&tmp, self.dir.join(name)).await,
            Err(e) => Err(e),
        };
        // the staged copy is never needed once linking was attempted
        let _ = fs::remove_file(&tmp).await;
        match linked {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Subdirectory for documents still being written; never listed.
const STAGING_DIR: &str = ".staging";

async fn stage(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

fn listing_order(a: &str, b: &str) -> Ordering {
    fn numeric_stem(name: &str) -> Option<u64> {
        Path::new(name).file_stem()?.to_str()?.parse().ok()
    }
    match (numeric_stem(a), numeric_stem(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
