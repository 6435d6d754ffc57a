use mnb_rates::core::cache::Store;
use mnb_rates::core::config::AppConfig;
use mnb_rates::core::{RateRequest, RateService};
use mnb_rates::providers::{MnbService, ReversibleService};
use mnb_rates::store::KeyValueStore;
use rust_decimal_macros::dec;
use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ACTION_PREFIX: &str = "\"http://www.mnb.hu/webservices/MNBArfolyamServiceSoap/";

    pub const CURRENT_RATES: &str = r#"<MNBCurrentExchangeRates><Day date="2025-11-24"><Rate unit="1" curr="EUR">383,04000</Rate><Rate unit="100" curr="JPY">211,92000</Rate><Rate unit="1" curr="PHP">5,64000</Rate><Rate unit="1" curr="USD">332,21000</Rate></Day></MNBCurrentExchangeRates>"#;

    pub const EUR_RANGE: &str = r#"<MNBExchangeRates><Day date="2023-12-22"><Rate unit="1" curr="EUR">382,20</Rate></Day></MNBExchangeRates>"#;

    pub fn soap_response(operation: &str, inner: &str) -> String {
        let escaped = inner
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;");
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><{operation}Response xmlns="http://www.mnb.hu/webservices/"><{operation}Result>{escaped}</{operation}Result></{operation}Response></s:Body></s:Envelope>"#
        )
    }

    pub async fn mount_current(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/arfolyamok.asmx"))
            .and(header(
                "SOAPAction",
                format!("{ACTION_PREFIX}GetCurrentExchangeRates\"").as_str(),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(soap_response("GetCurrentExchangeRates", CURRENT_RATES)),
            )
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    pub async fn mount_range(server: &MockServer, currency: &str, inner: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/arfolyamok.asmx"))
            .and(header(
                "SOAPAction",
                format!("{ACTION_PREFIX}GetExchangeRates\"").as_str(),
            ))
            .and(body_string_contains(format!(
                "<web:currencyNames>{currency}</web:currencyNames>"
            )))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(soap_response("GetExchangeRates", inner)),
            )
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    pub async fn mount_fault(server: &MockServer) {
        let body = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault><faultcode>s:Client</faultcode><faultstring xml:lang="en">Some SOAP fault in GetExchangeRates</faultstring></s:Fault></s:Body></s:Envelope>"#;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string(body))
            .mount(server)
            .await;
    }

    pub fn write_config(file: &tempfile::NamedTempFile, server: &MockServer) {
        let config_content = format!(
            r#"
        providers:
          mnb:
            base_url: "{}/arfolyamok.asmx"
            timeout_secs: 5
            retries: 0
        cache:
          ttl_secs: 60
          persist: false
    "#,
            server.uri()
        );
        std::fs::write(file.path(), config_content).expect("Failed to write config file");
    }
}

fn date(s: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test_log::test(tokio::test)]
async fn test_current_command_with_mock() {
    let mock_server = wiremock::MockServer::start().await;
    // Three currencies, one remote call.
    test_utils::mount_current(&mock_server, 1).await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, &mock_server);

    let result = mnb_rates::run_command(
        mnb_rates::AppCommand::Current {
            currencies: vec!["EUR".into(), "jpy".into(), "KZT".into()],
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Current command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_historical_command_with_mock() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_range(&mock_server, "EUR", test_utils::EUR_RANGE, 1).await;
    test_utils::mount_range(&mock_server, "PHP", "<MNBExchangeRates />", 1).await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, &mock_server);

    let result = mnb_rates::run_command(
        mnb_rates::AppCommand::Historical {
            date: date("2023-12-26"),
            currencies: vec!["EUR".into(), "PHP".into()],
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Historical command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_convert_command_from_huf() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_current(&mock_server, 1).await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, &mock_server);

    let result = mnb_rates::run_command(
        mnb_rates::AppCommand::Convert {
            amount: dec!(10000),
            from: "HUF".into(),
            to: "EUR".into(),
            date: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_soap_fault_fails_command() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_fault(&mock_server).await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, &mock_server);

    let result = mnb_rates::run_command(
        mnb_rates::AppCommand::Historical {
            date: date("2025-11-26"),
            currencies: vec!["EUR".into()],
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    let err = result.expect_err("A SOAP fault should fail the command");
    assert_eq!(
        err.to_string(),
        "SOAP error: Some SOAP fault in GetExchangeRates"
    );
}

#[test_log::test(tokio::test)]
async fn test_cross_pair_convert_is_unsupported() {
    let mock_server = wiremock::MockServer::start().await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, &mock_server);

    let result = mnb_rates::run_command(
        mnb_rates::AppCommand::Convert {
            amount: dec!(1),
            from: "EUR".into(),
            to: "USD".into(),
            date: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    let err = result.expect_err("EUR/USD is not served");
    assert_eq!(err.to_string(), "Unsupported request: EUR/USD");
}

#[test_log::test(tokio::test)]
async fn test_disk_cache_serves_repeated_requests() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_current(&mock_server, 1).await;
    test_utils::mount_range(&mock_server, "EUR", test_utils::EUR_RANGE, 1).await;

    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_content = format!(
        r#"
        providers:
          mnb:
            base_url: "{}/arfolyamok.asmx"
            retries: 0
        cache:
          persist: true
        data_path: "{}"
    "#,
        mock_server.uri(),
        data_dir.path().display()
    );
    fs::write(config_file.path(), &config_content).expect("Failed to write config file");

    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let store = KeyValueStore::new(&config.default_data_path().unwrap());
    assert!(store.get_collection("mnb", true, false).is_none());

    let service = ReversibleService::new(MnbService::from_config(&config, &store).unwrap());
    assert!(store.get_collection("mnb", true, false).is_some());

    let historical = RateRequest::historical("EUR", "HUF", date("2023-12-26"));
    let current = RateRequest::current("JPY", "HUF");
    for _ in 0..2 {
        let rate = service.resolve(&historical).await.unwrap();
        info!(?rate, "Resolved historical rate");
        assert_eq!(rate.rate.to_string(), "382.20");
        assert_eq!(rate.date, date("2023-12-22"));

        let rate = service.resolve(&current).await.unwrap();
        assert_eq!(rate.rate.to_string(), "2.1192000");
        assert_eq!(rate.date, date("2025-11-24"));
    }

    // A second service over the same store reuses the cached entries.
    let service = MnbService::from_config(&config, &store).unwrap();
    let rate = service
        .resolve(&RateRequest::historical("EUR", "HUF", date("2023-12-24")))
        .await
        .unwrap();
    assert_eq!(rate.rate, dec!(382.20));

    let usd = service.resolve(&RateRequest::current("USD", "HUF")).await.unwrap();
    assert_eq!(usd.rate.to_string(), "332.21000");
}
