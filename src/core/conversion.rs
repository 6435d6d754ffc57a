//! Amount conversion on top of a rate service

use crate::core::decimal;
use crate::core::error::RateError;
use crate::core::rates::{RateRequest, RateService};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub amount: Decimal,
    pub converted: Decimal,
    pub rate: Decimal,
    /// Quotation date of the rate used.
    pub date: NaiveDate,
}

/// Converts `amount` of the request's base currency into its quote currency.
pub async fn convert(
    service: &dyn RateService,
    amount: Decimal,
    request: &RateRequest,
) -> Result<Conversion, RateError> {
    let rate = service.resolve(request).await?;
    let converted = decimal::multiply(amount, rate.rate)
        .ok_or_else(|| RateError::NotFound(request.clone()))?;

    Ok(Conversion {
        amount,
        converted,
        rate: rate.rate,
        date: rate.date,
    })
}
