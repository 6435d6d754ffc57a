//! Exchange rate abstractions and core types

use crate::core::error::RateError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// The only currency the MNB feed quotes against.
pub const QUOTE_CURRENCY: &str = "HUF";

/// A feed-published price: `amount` HUF for `unit` units of the base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotation {
    pub amount: Decimal,
    pub unit: Decimal,
}

impl Quotation {
    pub fn new(amount: Decimal, unit: Decimal) -> Self {
        Self { amount, unit }
    }
}

/// Cached state of one (currency, day) slot.
///
/// `NoQuotation` records that the feed was asked and published nothing for that
/// day. It must stay distinct from a cache miss, which means "never asked".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayQuote {
    Quoted(Quotation),
    NoQuotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateDay {
    pub date: NaiveDate,
    pub rates: HashMap<String, Quotation>,
}

/// Parsed form of one feed response. Days keep the feed's publication order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    days: Vec<RateDay>,
}

impl RateTable {
    pub fn new(days: Vec<RateDay>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[RateDay] {
        &self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// The first day the feed listed, which is the latest one for current rates.
    pub fn first_day(&self) -> Option<&RateDay> {
        self.days.first()
    }

    pub fn quotation(&self, date: NaiveDate, currency: &str) -> Option<&Quotation> {
        self.days
            .iter()
            .find(|day| day.date == date)
            .and_then(|day| day.rates.get(currency))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.trim().to_uppercase(),
            quote: quote.trim().to_uppercase(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
        }
    }

    pub fn is_self_pair(&self) -> bool {
        self.base == self.quote
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateRequest {
    Current(CurrencyPair),
    Historical(CurrencyPair, NaiveDate),
}

impl RateRequest {
    pub fn current(base: &str, quote: &str) -> Self {
        RateRequest::Current(CurrencyPair::new(base, quote))
    }

    pub fn historical(base: &str, quote: &str, date: NaiveDate) -> Self {
        RateRequest::Historical(CurrencyPair::new(base, quote), date)
    }

    pub fn pair(&self) -> &CurrencyPair {
        match self {
            RateRequest::Current(pair) | RateRequest::Historical(pair, _) => pair,
        }
    }

    /// Same kind of request for the opposite direction.
    pub fn reversed(&self) -> Self {
        match self {
            RateRequest::Current(pair) => RateRequest::Current(pair.reversed()),
            RateRequest::Historical(pair, date) => RateRequest::Historical(pair.reversed(), *date),
        }
    }
}

impl Display for RateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateRequest::Current(pair) => write!(f, "{pair}"),
            RateRequest::Historical(pair, date) => {
                write!(f, "{pair} on {}", date.format("%Y-%m-%d"))
            }
        }
    }
}

/// A resolved rate: HUF per one unit of base currency, and the day it was quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub rate: Decimal,
    pub date: NaiveDate,
}

#[async_trait]
pub trait RateService: Send + Sync {
    fn supports(&self, request: &RateRequest) -> bool;

    async fn resolve(&self, request: &RateRequest) -> Result<ExchangeRate, RateError>;
}
