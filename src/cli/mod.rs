//! Terminal front end: rate tables, conversions and config setup

pub mod convert;
pub mod rates;
pub mod setup;
pub mod ui;
