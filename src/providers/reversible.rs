use crate::core::decimal;
use crate::core::{ExchangeRate, RateError, RateRequest, RateService};
use async_trait::async_trait;
use tracing::debug;

/// Serves `HUF/XXX` requests from a service that only quotes `XXX/HUF`.
///
/// Requests the inner service supports pass straight through. For the reverse
/// direction the inner rate is inverted and keeps its quotation date.
#[derive(Clone)]
pub struct ReversibleService<S: RateService> {
    inner: S,
}

impl<S: RateService> ReversibleService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: RateService> RateService for ReversibleService<S> {
    fn supports(&self, request: &RateRequest) -> bool {
        self.inner.supports(request) || self.inner.supports(&request.reversed())
    }

    async fn resolve(&self, request: &RateRequest) -> Result<ExchangeRate, RateError> {
        if self.inner.supports(request) {
            return self.inner.resolve(request).await;
        }

        let reversed = request.reversed();
        if !self.inner.supports(&reversed) {
            return Err(RateError::Unsupported(request.clone()));
        }

        debug!("Resolving {} through {}", request, reversed);
        let rate = self.inner.resolve(&reversed).await.map_err(|e| match e {
            RateError::NotFound(_) => RateError::NotFound(request.clone()),
            other => other,
        })?;

        let inverted = decimal::invert(rate.rate)
            .map(decimal::trim_zeros)
            .ok_or_else(|| RateError::NotFound(request.clone()))?;
        Ok(ExchangeRate {
            rate: inverted,
            date: rate.date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::QUOTE_CURRENCY;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Quotes fixed `XXX/HUF` rates dated 2025-11-24.
    struct FixedRates(HashMap<&'static str, Decimal>);

    #[async_trait]
    impl RateService for FixedRates {
        fn supports(&self, request: &RateRequest) -> bool {
            request.pair().quote == QUOTE_CURRENCY
        }

        async fn resolve(&self, request: &RateRequest) -> Result<ExchangeRate, RateError> {
            self.0
                .get(request.pair().base.as_str())
                .map(|rate| ExchangeRate {
                    rate: *rate,
                    date: date("2025-11-24"),
                })
                .ok_or_else(|| RateError::NotFound(request.clone()))
        }
    }

    fn service() -> ReversibleService<FixedRates> {
        ReversibleService::new(FixedRates(HashMap::from([
            ("USD", dec!(400)),
            ("EUR", dec!(383.04000)),
            ("XAU", Decimal::ZERO),
        ])))
    }

    #[tokio::test]
    async fn test_direct_request_passes_through() {
        let rate = service()
            .resolve(&RateRequest::current("EUR", "HUF"))
            .await
            .unwrap();
        assert_eq!(rate.rate.to_string(), "383.04000");
        assert_eq!(rate.date, date("2025-11-24"));
    }

    #[tokio::test]
    async fn test_reverse_request_is_inverted() {
        let service = service();
        let request = RateRequest::historical("HUF", "USD", date("2025-11-26"));
        assert!(service.supports(&request));

        let rate = service.resolve(&request).await.unwrap();
        assert_eq!(rate.rate, dec!(0.0025));
        assert_eq!(rate.date, date("2025-11-24"));
    }

    #[tokio::test]
    async fn test_reverse_not_found_names_original_request() {
        let err = service()
            .resolve(&RateRequest::current("HUF", "KZT"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to find exchange rate for HUF/KZT");

        let err = service()
            .resolve(&RateRequest::current("HUF", "XAU"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_cross_pair_is_unsupported() {
        let service = service();
        let request = RateRequest::current("EUR", "USD");
        assert!(!service.supports(&request));

        let err = service.resolve(&request).await.unwrap_err();
        assert_eq!(err, RateError::Unsupported(request));
        assert_eq!(err.to_string(), "Unsupported request: EUR/USD");
    }
}
