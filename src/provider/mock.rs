use crate::domain::invoice::Invoice;
use crate::provider::{PaymentProvider, ProviderError};
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    AlwaysSuccess,
    AlwaysDecline,
    CurrencyMismatch,
    CustomerNotFound,
    InvoiceNotFound,
    NetworkError,
    Unclassified,
    Random,
}

impl MockBehavior {
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ALWAYS_DECLINE" => MockBehavior::AlwaysDecline,
            "CURRENCY_MISMATCH" => MockBehavior::CurrencyMismatch,
            "CUSTOMER_NOT_FOUND" => MockBehavior::CustomerNotFound,
            "INVOICE_NOT_FOUND" => MockBehavior::InvoiceNotFound,
            "NETWORK_ERROR" => MockBehavior::NetworkError,
            "UNCLASSIFIED" => MockBehavior::Unclassified,
            "RANDOM" => MockBehavior::Random,
            _ => MockBehavior::AlwaysSuccess,
        }
    }

    fn respond(&self, invoice: &Invoice) -> Result<bool, ProviderError> {
        match self {
            MockBehavior::AlwaysSuccess => Ok(true),
            MockBehavior::AlwaysDecline => Ok(false),
            MockBehavior::CurrencyMismatch => Err(ProviderError::CurrencyMismatch {
                invoice_id: invoice.id,
                customer_id: invoice.customer_id,
            }),
            MockBehavior::CustomerNotFound => Err(ProviderError::CustomerNotFound {
                customer_id: invoice.customer_id,
            }),
            MockBehavior::InvoiceNotFound => Err(ProviderError::InvoiceNotFound {
                invoice_id: invoice.id,
            }),
            MockBehavior::NetworkError => {
                Err(ProviderError::Network("mock connection reset".to_string()))
            }
            MockBehavior::Unclassified => Err(ProviderError::Other("mock provider fault".to_string())),
            MockBehavior::Random => Ok(rand::thread_rng().gen_bool(0.5)),
        }
    }
}

/// Provider stand-in with scripted answers. Counts every call it receives.
pub struct MockProvider {
    pub charge_behavior: MockBehavior,
    pub status_behavior: MockBehavior,
    charge_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockProvider {
    /// Status checks report "not paid" unless overridden with [`MockProvider::with_status`].
    pub fn new(charge_behavior: MockBehavior) -> Self {
        let status_behavior = match charge_behavior {
            MockBehavior::Random => MockBehavior::Random,
            _ => MockBehavior::AlwaysDecline,
        };
        Self {
            charge_behavior,
            status_behavior,
            charge_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_status(mut self, status_behavior: MockBehavior) -> Self {
        self.status_behavior = status_behavior;
        self
    }

    pub fn charge_calls(&self) -> usize {
        self.charge_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PaymentProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn charge(&self, invoice: &Invoice) -> Result<bool, ProviderError> {
        self.charge_calls.fetch_add(1, Ordering::SeqCst);
        self.charge_behavior.respond(invoice)
    }

    async fn payment_status(&self, invoice: &Invoice) -> Result<bool, ProviderError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status_behavior.respond(invoice)
    }
}
