use super::cache::RateCache;
use super::feed::RateFeed;
use crate::core::{DayQuote, RateError};
use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use tracing::debug;

/// Cache-first lookup of single days, backed by windowed range fetches.
///
/// One instance serves one resolution call. A miss fetches the whole window
/// ending at the missed day, writes every day of it to the cache (published
/// days as `Quoted`, the rest as `NoQuotation`) and keeps the batch in memory,
/// so walking backwards through the window never calls the feed again.
pub struct CacheGapFiller<'a> {
    feed: &'a dyn RateFeed,
    cache: &'a RateCache,
    window_days: u32,
    batch: HashMap<(String, NaiveDate), DayQuote>,
}

impl<'a> CacheGapFiller<'a> {
    pub fn new(feed: &'a dyn RateFeed, cache: &'a RateCache, window_days: u32) -> Self {
        Self {
            feed,
            cache,
            window_days: window_days.max(1),
            batch: HashMap::new(),
        }
    }

    pub async fn fetch_or_fill(
        &mut self,
        date: NaiveDate,
        currency: &str,
    ) -> Result<DayQuote, RateError> {
        let key = (currency.to_string(), date);
        if let Some(quote) = self.batch.get(&key) {
            return Ok(quote.clone());
        }
        if let Some(quote) = self.cache.day(currency, date).await {
            return Ok(quote);
        }

        self.fill(date, currency).await?;
        Ok(self
            .batch
            .get(&key)
            .cloned()
            .unwrap_or(DayQuote::NoQuotation))
    }

    async fn fill(&mut self, end: NaiveDate, currency: &str) -> Result<(), RateError> {
        let start = end
            .checked_sub_days(Days::new(u64::from(self.window_days - 1)))
            .unwrap_or(NaiveDate::MIN);
        debug!(%start, %end, currency, "Filling rate cache from feed");

        // Failures propagate before anything is written.
        let table = self.feed.range(start, end, currency).await?;

        let mut batch = HashMap::with_capacity(self.window_days as usize);
        let days = (0..self.window_days)
            .filter_map(|offset| end.checked_sub_days(Days::new(u64::from(offset))));
        for day in days {
            let quote = table
                .quotation(day, currency)
                .cloned()
                .map_or(DayQuote::NoQuotation, DayQuote::Quoted);
            self.cache.store_day(currency, day, &quote).await;
            batch.insert((currency.to_string(), day), quote);
        }
        self.batch = batch;
        Ok(())
    }
}
