//! Hungarian National Bank (Magyar Nemzeti Bank) rate service.
//!
//! Resolves `XXX/HUF` rates, either current or for a past day. The feed
//! publishes nothing on weekends and holidays, so a historical request walks
//! back day by day until it finds a published quotation and answers with that
//! quotation's own date.

pub mod cache;
pub mod feed;
pub mod gap_fill;
pub mod parser;

use crate::core::cache::{KeyValueCollection, Store};
use crate::core::config::AppConfig;
use crate::core::decimal;
use crate::core::{
    Clock, CurrencyPair, DayQuote, ExchangeRate, QUOTE_CURRENCY, Quotation, RateError,
    RateRequest, RateService, SystemClock,
};
use async_trait::async_trait;
use cache::{CACHE_NAMESPACE, RateCache};
use chrono::NaiveDate;
use feed::{MnbSoapClient, RateFeed};
use gap_fill::CacheGapFiller;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 5;
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// First day the MNB has records for.
pub fn earliest_record_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1949, 1, 3).unwrap_or(NaiveDate::MIN)
}

pub struct MnbService {
    feed: Arc<dyn RateFeed>,
    cache: RateCache,
    clock: Arc<dyn Clock>,
    lookback_days: u32,
    fetch_window_days: u32,
}

impl MnbService {
    pub fn new(
        feed: Arc<dyn RateFeed>,
        collection: Arc<dyn KeyValueCollection>,
        ttl: Duration,
    ) -> Self {
        Self {
            feed,
            cache: RateCache::new(collection, ttl),
            clock: Arc::new(SystemClock),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            fetch_window_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    /// Builds the service against the live SOAP endpoint and the `mnb` cache collection.
    pub fn from_config(config: &AppConfig, store: &dyn Store) -> anyhow::Result<Self> {
        let feed = MnbSoapClient::new(&config.providers.mnb)?;
        let collection = store
            .get_collection(CACHE_NAMESPACE, config.cache.persist, true)
            .or_else(|| store.get_collection(CACHE_NAMESPACE, false, true))
            .ok_or_else(|| {
                RateError::Cache(format!("Unable to open the {CACHE_NAMESPACE} collection"))
            })?;

        Ok(Self::new(
            Arc::new(feed),
            collection,
            Duration::from_secs(config.cache.ttl_secs),
        )
        .with_window(config.cache.lookback_days, config.cache.fetch_window_days))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets how far back to probe and how wide each remote fetch is.
    ///
    /// The fetch window is widened to the probe depth if needed, which keeps a
    /// historical resolution at one remote call at most.
    pub fn with_window(mut self, lookback_days: u32, fetch_window_days: u32) -> Self {
        self.lookback_days = lookback_days.max(1);
        self.fetch_window_days = fetch_window_days.max(self.lookback_days);
        self
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    #[instrument(name = "MnbCurrent", skip(self, pair), fields(pair = %pair))]
    pub async fn resolve_current(&self, pair: &CurrencyPair) -> Result<ExchangeRate, RateError> {
        let not_found = || RateError::NotFound(RateRequest::Current(pair.clone()));
        if !is_quotable(pair) {
            return Err(not_found());
        }

        let table = match self.cache.current().await {
            Some(table) => table,
            None => {
                debug!("Current rates not cached, fetching from feed");
                let table = self.feed.current().await?;
                self.cache.store_current(&table).await;
                table
            }
        };

        let day = table.first_day().ok_or_else(not_found)?;
        let quotation = day.rates.get(&pair.base).ok_or_else(not_found)?;
        exchange_rate(quotation, day.date, pair)
    }

    #[instrument(name = "MnbHistorical", skip(self, pair, requested), fields(pair = %pair, date = %requested))]
    pub async fn resolve_historical(
        &self,
        pair: &CurrencyPair,
        requested: NaiveDate,
    ) -> Result<ExchangeRate, RateError> {
        let not_found = || RateError::NotFound(RateRequest::Historical(pair.clone(), requested));
        if requested > self.clock.today() || requested < earliest_record_date() {
            return Err(not_found());
        }
        if !is_quotable(pair) {
            return Err(not_found());
        }

        let mut filler = CacheGapFiller::new(self.feed.as_ref(), &self.cache, self.fetch_window_days);
        let mut date = requested;
        for _ in 0..self.lookback_days {
            match filler.fetch_or_fill(date, &pair.base).await? {
                DayQuote::Quoted(quotation) => return exchange_rate(&quotation, date, pair),
                DayQuote::NoQuotation => {
                    debug!(%date, "No quotation published, trying the day before");
                    date = match date.pred_opt() {
                        Some(previous) => previous,
                        None => break,
                    };
                }
            }
        }

        Err(not_found())
    }
}

#[async_trait]
impl RateService for MnbService {
    fn supports(&self, request: &RateRequest) -> bool {
        request.pair().quote == QUOTE_CURRENCY
    }

    async fn resolve(&self, request: &RateRequest) -> Result<ExchangeRate, RateError> {
        match request {
            RateRequest::Current(pair) => self.resolve_current(pair).await,
            RateRequest::Historical(pair, date) => self.resolve_historical(pair, *date).await,
        }
    }
}

fn is_quotable(pair: &CurrencyPair) -> bool {
    pair.quote == QUOTE_CURRENCY && !pair.is_self_pair()
}

fn exchange_rate(
    quotation: &Quotation,
    date: NaiveDate,
    pair: &CurrencyPair,
) -> Result<ExchangeRate, RateError> {
    let rate = decimal::normalize(quotation).ok_or_else(|| {
        RateError::transport(format!(
            "Unusable quotation {}/{} for {pair} on {date}",
            quotation.amount, quotation.unit
        ))
    })?;
    Ok(ExchangeRate { rate, date })
}
