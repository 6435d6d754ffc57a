//! Cache abstractions shared by the stores and the rate providers

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A TTL key-value collection holding opaque byte values.
///
/// An expired entry reads exactly like a missing one.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>);

    async fn remove(&self, key: &[u8]);

    async fn clear(&self);
}

/// A set of named collections, either in memory or persisted.
pub trait Store: Send + Sync {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;

    fn remove_collection(&self, name: &str) -> bool;
}
