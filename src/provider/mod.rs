use crate::config::AppConfig;
use crate::domain::invoice::Invoice;
use std::sync::Arc;
use thiserror::Error;

pub mod http;
pub mod mock;

/// Failures the provider signals separately from a plain "not charged" answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("currency of invoice '{invoice_id}' does not match currency of customer '{customer_id}'")]
    CurrencyMismatch { invoice_id: i64, customer_id: i64 },

    #[error("customer '{customer_id}' was not found")]
    CustomerNotFound { customer_id: i64 },

    #[error("invoice '{invoice_id}' was not found")]
    InvoiceNotFound { invoice_id: i64 },

    #[error("network error: {0}")]
    Network(String),

    #[error("provider error: {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Charges the invoice amount to the customer. `Ok(false)` means the
    /// account balance did not allow the charge.
    async fn charge(&self, invoice: &Invoice) -> Result<bool, ProviderError>;

    /// Asks whether an earlier charge for the invoice went through.
    async fn payment_status(&self, invoice: &Invoice) -> Result<bool, ProviderError>;
}

/// Builds the provider named by `PAYMENT_PROVIDER`. Unknown names are rejected
/// rather than falling back to the mock.
pub fn build_provider(cfg: &AppConfig) -> anyhow::Result<Arc<dyn PaymentProvider>> {
    match cfg.payment_provider.as_str() {
        "http" => Ok(Arc::new(http::HttpPaymentProvider {
            base_url: cfg.provider_base_url.trim_end_matches('/').to_string(),
            api_key: cfg.provider_api_key.clone(),
            timeout_ms: cfg.provider_timeout_ms,
            client: reqwest::Client::new(),
        })),
        "mock" => {
            let behavior = mock::MockBehavior::parse(&cfg.mock_provider_behavior);
            tracing::warn!(behavior = ?behavior, "using mock payment provider");
            Ok(Arc::new(mock::MockProvider::new(behavior)))
        }
        other => anyhow::bail!("unknown PAYMENT_PROVIDER {other:?}, expected \"http\" or \"mock\""),
    }
}
