use std::time::Duration;

use async_trait::async_trait;

use crate::error::KvError;

/// Opaque byte storage keyed by string.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// Keys must be non-empty.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get the value for a key. Returns `None` if not found or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    /// Set a value with an optional TTL, overwriting any previous value.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), KvError>;

    /// Delete a key. Returns `true` if a live value was removed.
    async fn delete(&self, key: &str) -> Result<bool, KvError>;
}
