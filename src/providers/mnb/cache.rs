use crate::core::cache::KeyValueCollection;
use crate::core::{DayQuote, RateTable};
use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub const CACHE_NAMESPACE: &str = "mnb";
const CURRENT_KEY: &str = "mnb|current";

pub fn day_key(currency: &str, date: NaiveDate) -> String {
    format!("{CACHE_NAMESPACE}|{currency}|{}", date.format("%Y-%m-%d"))
}

/// Typed view over the `mnb` collection.
///
/// Entries are serde_json encoded, so a stored `DayQuote::NoQuotation` always
/// reads back as a value and never as a miss.
#[derive(Clone)]
pub struct RateCache {
    collection: Arc<dyn KeyValueCollection>,
    ttl: Duration,
}

impl RateCache {
    pub fn new(collection: Arc<dyn KeyValueCollection>, ttl: Duration) -> Self {
        Self { collection, ttl }
    }

    pub async fn day(&self, currency: &str, date: NaiveDate) -> Option<DayQuote> {
        self.read(&day_key(currency, date)).await
    }

    pub async fn store_day(&self, currency: &str, date: NaiveDate, quote: &DayQuote) {
        self.write(&day_key(currency, date), quote).await;
    }

    pub async fn current(&self) -> Option<RateTable> {
        self.read(CURRENT_KEY).await
    }

    pub async fn store_current(&self, table: &RateTable) {
        self.write(CURRENT_KEY, table).await;
    }

    pub async fn clear(&self) {
        self.collection.clear().await;
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.collection.get(key.as_bytes()).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                // Unreadable entries are refetched.
                warn!("Ignoring corrupt cache entry {}: {}", key, e);
                None
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.collection
                    .put(key.as_bytes(), &bytes, Some(self.ttl))
                    .await
            }
            Err(e) => warn!("Failed to encode cache entry {}: {}", key, e),
        }
    }
}
