//! Unified key-value backend with enum dispatch.

use std::path::Path;

use async_trait::async_trait;
use wildlog_core::{BackendKind, Settings};

use crate::error::Result;
#[cfg(not(feature = "sqlite"))]
use crate::error::StorageError;
use crate::traits::KeyValueStore;
use crate::{FileKvStore, MemoryKvStore};

const KV_DIR_NAME: &str = "kv";
const SQLITE_FILE_NAME: &str = "wildlog.db";

macro_rules! dispatch {
    ($self:expr, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            KvBackend::Memory(s) => <MemoryKvStore as KeyValueStore>::$method(s, $($arg),*).await,
            KvBackend::File(s) => <FileKvStore as KeyValueStore>::$method(s, $($arg),*).await,
            #[cfg(feature = "sqlite")]
            KvBackend::Sqlite(s) => {
                <crate::SqliteKvStore as KeyValueStore>::$method(s, $($arg),*).await
            },
        }
    };
}

#[derive(Debug)]
pub enum KvBackend {
    Memory(MemoryKvStore),
    File(FileKvStore),
    #[cfg(feature = "sqlite")]
    Sqlite(crate::SqliteKvStore),
}

impl KvBackend {
    #[must_use]
    pub fn new_memory() -> Self {
        Self::Memory(MemoryKvStore::new())
    }

    /// # Errors
    /// Returns error if the directory cannot be created.
    pub fn new_file(root: &Path) -> Result<Self> {
        Ok(Self::File(FileKvStore::new(root)?))
    }

    /// # Errors
    /// Returns error if the database cannot be opened or migrated.
    #[cfg(feature = "sqlite")]
    pub fn new_sqlite(db_path: &Path) -> Result<Self> {
        Ok(Self::Sqlite(crate::SqliteKvStore::new(db_path)?))
    }

    /// Open the backend selected in `settings` under its data directory.
    ///
    /// # Errors
    /// Returns error if the backend cannot be opened or is not compiled in.
    pub fn open(settings: &Settings) -> Result<Self> {
        let backend = match settings.backend {
            BackendKind::Memory => Self::new_memory(),
            BackendKind::File => Self::new_file(&settings.data_dir.join(KV_DIR_NAME))?,
            #[cfg(feature = "sqlite")]
            BackendKind::Sqlite => Self::new_sqlite(&settings.data_dir.join(SQLITE_FILE_NAME))?,
            #[cfg(not(feature = "sqlite"))]
            BackendKind::Sqlite => {
                return Err(StorageError::Unsupported(format!(
                    "{} (built without the sqlite feature, wanted {})",
                    settings.backend, SQLITE_FILE_NAME
                )));
            },
        };
        tracing::info!(
            backend = %settings.backend,
            data_dir = %settings.data_dir.display(),
            "Opened storage backend"
        );
        Ok(backend)
    }

    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        match self {
            Self::Memory(_) => BackendKind::Memory,
            Self::File(_) => BackendKind::File,
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => BackendKind::Sqlite,
        }
    }
}

#[async_trait]
impl KeyValueStore for KvBackend {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        dispatch!(self, get_item(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        dispatch!(self, set_item(key, value))
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        dispatch!(self, remove_item(key))
    }
}
