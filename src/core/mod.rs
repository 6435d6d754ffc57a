//! Core business logic abstractions

pub mod cache;
pub mod clock;
pub mod conversion;
pub mod config;
pub mod decimal;
pub mod error;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use clock::{Clock, FixedClock, SystemClock};
pub use conversion::{Conversion, convert};
pub use error::RateError;
pub use rates::{
    CurrencyPair, DayQuote, ExchangeRate, QUOTE_CURRENCY, Quotation, RateDay, RateRequest,
    RateService, RateTable,
};
