use super::parser::{self, SoapPayload};
use crate::core::config::MnbProviderConfig;
use crate::core::{RateError, RateTable};
use crate::providers::util::{escape_xml, with_retry};
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, instrument};

const SOAP_NAMESPACE: &str = "http://www.mnb.hu/webservices/";
const RETRY_DELAY_MS: u64 = 500;

/// Remote source of MNB rate tables.
#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Rates of the latest publication day.
    async fn current(&self) -> Result<RateTable, RateError>;

    /// Rates of one currency for every published day in `[start, end]`.
    async fn range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        currency: &str,
    ) -> Result<RateTable, RateError>;
}

/// SOAP 1.1 client for the MNB `arfolyamok.asmx` service.
pub struct MnbSoapClient {
    endpoint: String,
    client: reqwest::Client,
    retries: usize,
}

impl MnbSoapClient {
    pub fn new(config: &MnbProviderConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mnb-rates/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            endpoint: config.base_url.clone(),
            client,
            retries: config.retries,
        })
    }

    async fn call(&self, operation: &str, params: &str) -> Result<SoapPayload, RateError> {
        let envelope = format!(
            r#"<?xml version="1.0" encoding="utf-8"?><soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:web="{SOAP_NAMESPACE}"><soap:Body><web:{operation}>{params}</web:{operation}></soap:Body></soap:Envelope>"#
        );
        let action = format!("\"{SOAP_NAMESPACE}MNBArfolyamServiceSoap/{operation}\"");
        debug!("Calling {} at {}", operation, self.endpoint);

        let response = with_retry(
            || async {
                self.client
                    .post(&self.endpoint)
                    .header(CONTENT_TYPE, "text/xml; charset=utf-8")
                    .header("SOAPAction", action.as_str())
                    .body(envelope.clone())
                    .send()
                    .await
            },
            self.retries,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| RateError::transport(format!("SOAP error: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RateError::transport(format!("SOAP error: {e}")))?;
        debug!(%status, "Received {} response", operation);

        match parser::parse_envelope(&body) {
            Ok(SoapPayload::Fault(message)) => {
                Err(RateError::transport(format!("SOAP error: {message}")))
            }
            Ok(_) | Err(_) if !status.is_success() => Err(RateError::transport(format!(
                "HTTP error: {status} for {operation}"
            ))),
            other => other,
        }
    }
}

#[async_trait]
impl RateFeed for MnbSoapClient {
    #[instrument(name = "MnbCurrentRates", skip(self))]
    async fn current(&self) -> Result<RateTable, RateError> {
        match self.call("GetCurrentExchangeRates", "").await? {
            SoapPayload::Current(xml) => parser::parse_rates(&xml),
            other => Err(unexpected_payload("GetCurrentExchangeRates", &other)),
        }
    }

    #[instrument(name = "MnbRangeRates", skip(self))]
    async fn range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        currency: &str,
    ) -> Result<RateTable, RateError> {
        let params = format!(
            "<web:startDate>{}</web:startDate><web:endDate>{}</web:endDate><web:currencyNames>{}</web:currencyNames>",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            escape_xml(currency)
        );
        match self.call("GetExchangeRates", &params).await? {
            SoapPayload::Range(xml) => parser::parse_rates(&xml),
            other => Err(unexpected_payload("GetExchangeRates", &other)),
        }
    }
}

fn unexpected_payload(operation: &str, payload: &SoapPayload) -> RateError {
    RateError::transport(format!(
        "SOAP error: unexpected {operation} response: {payload:?}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn soap_response(operation: &str, inner: &str) -> String {
        let escaped = escape_xml(inner);
        format!(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><{operation}Response xmlns="http://www.mnb.hu/webservices/"><{operation}Result>{escaped}</{operation}Result></{operation}Response></s:Body></s:Envelope>"#
        )
    }

    fn config(uri: &str) -> MnbProviderConfig {
        MnbProviderConfig {
            base_url: format!("{uri}/arfolyamok.asmx"),
            timeout_secs: 5,
            retries: 0,
        }
    }

    #[tokio::test]
    async fn test_fetch_current_rates() {
        let mock_server = MockServer::start().await;
        let body = soap_response(
            "GetCurrentExchangeRates",
            r#"<MNBCurrentExchangeRates><Day date="2025-11-24"><Rate unit="1" curr="EUR">383,04000</Rate></Day></MNBCurrentExchangeRates>"#,
        );
        Mock::given(method("POST"))
            .and(path("/arfolyamok.asmx"))
            .and(header(
                "SOAPAction",
                "\"http://www.mnb.hu/webservices/MNBArfolyamServiceSoap/GetCurrentExchangeRates\"",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = MnbSoapClient::new(&config(&mock_server.uri())).unwrap();
        let table = client.current().await.unwrap();
        assert_eq!(
            table.quotation(date("2025-11-24"), "EUR").unwrap().amount,
            dec!(383.04000)
        );
    }

    #[tokio::test]
    async fn test_fetch_range_sends_parameters() {
        let mock_server = MockServer::start().await;
        let body = soap_response(
            "GetExchangeRates",
            r#"<MNBExchangeRates><Day date="2025-11-26"><Rate unit="1" curr="EUR">382,06</Rate></Day><Day date="2025-11-25"><Rate unit="1" curr="EUR">382,08</Rate></Day></MNBExchangeRates>"#,
        );
        Mock::given(method("POST"))
            .and(path("/arfolyamok.asmx"))
            .and(body_string_contains(
                "<web:startDate>2025-11-22</web:startDate>",
            ))
            .and(body_string_contains("<web:endDate>2025-11-26</web:endDate>"))
            .and(body_string_contains(
                "<web:currencyNames>EUR</web:currencyNames>",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = MnbSoapClient::new(&config(&mock_server.uri())).unwrap();
        let table = client
            .range(date("2025-11-22"), date("2025-11-26"), "EUR")
            .await
            .unwrap();
        assert_eq!(table.days().len(), 2);
        assert_eq!(
            table.quotation(date("2025-11-25"), "EUR").unwrap().amount,
            dec!(382.08)
        );
    }

    #[tokio::test]
    async fn test_soap_fault_is_transport_error() {
        let mock_server = MockServer::start().await;
        let body = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault><faultcode>s:Client</faultcode><faultstring xml:lang="en">Some SOAP fault in GetExchangeRates</faultstring></s:Fault></s:Body></s:Envelope>"#;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string(body))
            .mount(&mock_server)
            .await;

        let client = MnbSoapClient::new(&config(&mock_server.uri())).unwrap();
        let err = client
            .range(date("2025-11-22"), date("2025-11-26"), "EUR")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RateError::Transport("SOAP error: Some SOAP fault in GetExchangeRates".to_string())
        );
    }

    #[tokio::test]
    async fn test_http_error_without_fault() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = MnbSoapClient::new(&config(&mock_server.uri())).unwrap();
        let err = client.current().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "HTTP error: 503 Service Unavailable for GetCurrentExchangeRates"
        );
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>oops"))
            .mount(&mock_server)
            .await;

        let client = MnbSoapClient::new(&config(&mock_server.uri())).unwrap();
        let err = client.current().await.unwrap_err();
        assert!(matches!(err, RateError::Transport(_)));
        assert!(err.to_string().starts_with("Malformed SOAP response"));
    }
}
