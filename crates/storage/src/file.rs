//! One JSON file per key under a data directory.
//!
//! Writes go to a sibling temp file which is synced and then renamed over the
//! target, so readers see either the old blob or the new one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt as _;

use crate::error::{Result, StorageError};
use crate::traits::KeyValueStore;

const FILE_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileKvStore {
    root: PathBuf,
}

/// Maps a key to a portable file name. Unreserved ASCII is kept, every other
/// byte becomes `%XX`, so distinct keys never collide.
pub(crate) fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + FILE_EXTENSION.len() + 1);
    for (i, byte) in key.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric()
            || byte == b'_'
            || byte == b'-'
            || (byte == b'.' && i > 0);
        if keep {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out.push('.');
    out.push_str(FILE_EXTENSION);
    out
}

impl FileKvStore {
    /// Opens (and creates if needed) the directory holding the key files.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub fn new(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)
            .map_err(|e| StorageError::io(format!("creating {}", root.display()), e))?;
        tracing::info!(root = %root.display(), "File key-value store initialized");
        Ok(Self { root: root.to_path_buf() })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(encode_key(key))
    }

    async fn write_atomically(&self, target: &Path, value: &str) -> Result<()> {
        let tmp = self.root.join(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
        let write = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(value.as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, target).await
        };
        if let Err(e) = write.await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!(
                        path = %tmp.display(),
                        "Failed to remove temp file: {}",
                        cleanup
                    );
                }
            }
            return Err(StorageError::io(format!("writing {}", target.display()), e));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(format!("reading {}", path.display()), e)),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        self.write_atomically(&path, value).await?;
        tracing::debug!(key, bytes = value.len(), "Wrote key file");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(format!("removing {}", path.display()), e)),
        }
    }
}
