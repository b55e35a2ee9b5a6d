//! Storage backend trait abstraction
//!
//! A string-keyed, string-valued async store: the whole persistence contract
//! the observation list needs. Each `set_item` replaces the value atomically.

use async_trait::async_trait;

use crate::error::Result;

/// Async key-value persistence primitive.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`. `None` if the key was never written or was removed.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key` as one write.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Removing a missing key succeeds.
    async fn remove_item(&self, key: &str) -> Result<()>;
}
