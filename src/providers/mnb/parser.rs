//! Decoding of MNB web service payloads.
//!
//! A SOAP response carries the actual rate document as escaped text inside the
//! `<Get...Result>` element. That inner document lists days with their rates:
//!
//! ```xml
//! <MNBCurrentExchangeRates>
//!   <Day date="2025-11-24">
//!     <Rate unit="1" curr="EUR">383,04000</Rate>
//!     <Rate unit="100" curr="JPY">211,92000</Rate>
//!   </Day>
//! </MNBCurrentExchangeRates>
//! ```

use crate::core::{Quotation, RateDay, RateError, RateTable};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Deserialize, Debug)]
struct XmlRates {
    #[serde(rename = "Day", default)]
    days: Vec<XmlDay>,
}

#[derive(Deserialize, Debug)]
struct XmlDay {
    date: String,
    #[serde(rename = "Rate", default)]
    rates: Vec<XmlRate>,
}

#[derive(Deserialize, Debug)]
struct XmlRate {
    unit: String,
    curr: String,
    #[serde(rename = "$value", default)]
    value: String,
}

#[derive(Deserialize, Debug)]
struct XmlEnvelope {
    #[serde(rename = "Body")]
    body: XmlBody,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct XmlBody {
    #[serde(rename = "GetCurrentExchangeRatesResponse")]
    current: Option<XmlCurrentResponse>,
    #[serde(rename = "GetExchangeRatesResponse")]
    range: Option<XmlRangeResponse>,
    #[serde(rename = "Fault")]
    fault: Option<XmlFault>,
}

#[derive(Deserialize, Debug)]
struct XmlCurrentResponse {
    #[serde(rename = "GetCurrentExchangeRatesResult", default)]
    result: Option<String>,
}

#[derive(Deserialize, Debug)]
struct XmlRangeResponse {
    #[serde(rename = "GetExchangeRatesResult", default)]
    result: Option<String>,
}

#[derive(Deserialize, Debug)]
struct XmlFault {
    #[serde(rename = "faultstring")]
    fault_string: XmlText,
}

#[derive(Deserialize, Debug)]
struct XmlText {
    #[serde(rename = "$value", default)]
    text: String,
}

/// The decoded body of a SOAP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapPayload {
    Current(String),
    Range(String),
    Fault(String),
    Empty,
}

pub fn parse_envelope(xml: &str) -> Result<SoapPayload, RateError> {
    let envelope: XmlEnvelope = serde_xml_rs::from_str(xml)
        .map_err(|e| RateError::transport(format!("Malformed SOAP response: {e}")))?;

    let body = envelope.body;
    if let Some(fault) = body.fault {
        return Ok(SoapPayload::Fault(fault.fault_string.text.trim().to_string()));
    }
    if let Some(result) = body.current.and_then(|r| r.result) {
        return Ok(SoapPayload::Current(result));
    }
    if let Some(result) = body.range.and_then(|r| r.result) {
        return Ok(SoapPayload::Range(result));
    }
    Ok(SoapPayload::Empty)
}

/// Parses a rate document into a table, keeping the feed's day order.
pub fn parse_rates(xml: &str) -> Result<RateTable, RateError> {
    if xml.trim().is_empty() {
        return Ok(RateTable::default());
    }

    let data: XmlRates = serde_xml_rs::from_str(xml)
        .map_err(|e| RateError::transport(format!("Malformed rates payload: {e}")))?;

    let days = data
        .days
        .into_iter()
        .map(parse_day)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RateTable::new(days))
}

fn parse_day(day: XmlDay) -> Result<RateDay, RateError> {
    let date = NaiveDate::parse_from_str(day.date.trim(), "%Y-%m-%d")
        .map_err(|e| RateError::transport(format!("Invalid day '{}': {e}", day.date)))?;

    let mut rates = HashMap::with_capacity(day.rates.len());
    for rate in day.rates {
        let currency = rate.curr.trim().to_uppercase();
        let amount = parse_decimal(&rate.value).ok_or_else(|| {
            RateError::transport(format!(
                "Invalid rate '{}' for {currency} on {date}",
                rate.value
            ))
        })?;
        let unit = parse_decimal(&rate.unit).ok_or_else(|| {
            RateError::transport(format!(
                "Invalid unit '{}' for {currency} on {date}",
                rate.unit
            ))
        })?;
        if unit.is_zero() {
            return Err(RateError::transport(format!(
                "Zero unit for {currency} on {date}"
            )));
        }
        rates.insert(currency, Quotation::new(amount, unit));
    }

    Ok(RateDay { date, rates })
}

// The feed uses a decimal comma.
fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(&text.trim().replace(',', ".")).ok()
}
