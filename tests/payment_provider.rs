use invoice_settlement::domain::invoice::{Currency, Invoice, InvoiceStatus, Money};
use invoice_settlement::provider::http::map_error_response;
use invoice_settlement::provider::mock::{MockBehavior, MockProvider};
use invoice_settlement::config::AppConfig;
use invoice_settlement::provider::{build_provider, PaymentProvider, ProviderError};
use reqwest::StatusCode;
use rust_decimal::Decimal;

fn sample() -> Invoice {
    Invoice {
        id: 4,
        customer_id: 40,
        amount: Money {
            value: Decimal::new(12_345, 2),
            currency: Currency::Dkk,
        },
        status: InvoiceStatus::Pending,
    }
}

#[test]
fn provider_error_codes_map_to_taxonomy() {
    let inv = sample();
    assert_eq!(
        map_error_response(&inv, StatusCode::CONFLICT, r#"{"error":{"code":"CURRENCY_MISMATCH","message":"EUR vs DKK"}}"#),
        ProviderError::CurrencyMismatch {
            invoice_id: 4,
            customer_id: 40
        }
    );
    assert_eq!(
        map_error_response(&inv, StatusCode::NOT_FOUND, r#"{"error":{"code":"CUSTOMER_NOT_FOUND"}}"#),
        ProviderError::CustomerNotFound { customer_id: 40 }
    );
    assert_eq!(
        map_error_response(&inv, StatusCode::NOT_FOUND, r#"{"error":{"code":"INVOICE_NOT_FOUND"}}"#),
        ProviderError::InvoiceNotFound { invoice_id: 4 }
    );
}

#[test]
fn server_errors_are_ambiguous_network_failures() {
    let inv = sample();
    assert!(matches!(
        map_error_response(&inv, StatusCode::BAD_GATEWAY, "upstream down"),
        ProviderError::Network(_)
    ));
    assert!(matches!(
        map_error_response(&inv, StatusCode::REQUEST_TIMEOUT, ""),
        ProviderError::Network(_)
    ));
    match map_error_response(&inv, StatusCode::UNPROCESSABLE_ENTITY, r#"{"error":{"code":"BAD_AMOUNT","message":"negative"}}"#) {
        ProviderError::Other(message) => assert!(message.contains("BAD_AMOUNT")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn mock_provider_counts_calls_and_scripts_answers() {
    let inv = sample();
    let provider = MockProvider::new(MockBehavior::parse("always_decline")).with_status(MockBehavior::AlwaysSuccess);

    assert_eq!(provider.charge(&inv).await, Ok(false));
    assert_eq!(provider.charge(&inv).await, Ok(false));
    assert_eq!(provider.payment_status(&inv).await, Ok(true));
    assert_eq!(provider.charge_calls(), 2);
    assert_eq!(provider.status_calls(), 1);
}

#[test]
fn unknown_mock_behavior_defaults_to_success() {
    assert_eq!(MockBehavior::parse("nonsense"), MockBehavior::AlwaysSuccess);
    assert_eq!(MockBehavior::parse("NETWORK_ERROR"), MockBehavior::NetworkError);
    assert_eq!(MockBehavior::parse("random"), MockBehavior::Random);
}

#[test]
fn unknown_provider_name_is_rejected() {
    let mut cfg = AppConfig::from_env();
    cfg.payment_provider = "htp".to_string();
    assert!(build_provider(&cfg).is_err());

    cfg.payment_provider = "mock".to_string();
    cfg.mock_provider_behavior = "ALWAYS_DECLINE".to_string();
    assert_eq!(build_provider(&cfg).unwrap().name(), "mock");

    cfg.payment_provider = "http".to_string();
    assert_eq!(build_provider(&cfg).unwrap().name(), "http");
}
