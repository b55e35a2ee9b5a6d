//! Storage layer for wildlog
//!
//! A small async key-value abstraction with memory, file and `SQLite` backends,
//! and the [`ObservationStore`] that keeps the observation list as one JSON blob
//! under a single key.

mod backend;
mod error;
mod file;
mod memory;
#[cfg(feature = "sqlite")]
mod migrations;
mod observation_store;
#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(test)]
mod tests;
pub mod traits;

pub use backend::KvBackend;
pub use error::{Result, StorageError};
pub use file::FileKvStore;
pub use memory::MemoryKvStore;
pub use observation_store::{CorruptionHook, ObservationStore};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteKvStore;
pub use traits::KeyValueStore;
