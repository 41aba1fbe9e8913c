//! Maps the answer to a charge call onto the fixed outcome taxonomy and the
//! ledger write each outcome leaves behind.

use crate::domain::settlement::FailedSettlementReason;
use crate::provider::ProviderError;

pub const INSUFFICIENT_FUNDS_LOG: &str = "Insufficient funds to debit account";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    Charged,
    InsufficientFunds,
    CurrencyMismatch(String),
    CustomerNotFound(String),
    InvoiceNotFound(String),
    NetworkError(String),
    Unclassified(String),
}

/// What the billing cycle writes for an invoice after one charge attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingAction {
    MarkPaid,
    RecordFailure {
        reason: FailedSettlementReason,
        log: String,
    },
    Drop,
}

pub fn classify_charge(result: Result<bool, ProviderError>) -> ChargeOutcome {
    match result {
        Ok(true) => ChargeOutcome::Charged,
        Ok(false) => ChargeOutcome::InsufficientFunds,
        Err(e) => classify_error(e),
    }
}

pub fn classify_error(error: ProviderError) -> ChargeOutcome {
    let detail = error.to_string();
    match error {
        ProviderError::CurrencyMismatch { .. } => ChargeOutcome::CurrencyMismatch(detail),
        ProviderError::CustomerNotFound { .. } => ChargeOutcome::CustomerNotFound(detail),
        ProviderError::InvoiceNotFound { .. } => ChargeOutcome::InvoiceNotFound(detail),
        ProviderError::Network(_) => ChargeOutcome::NetworkError(detail),
        ProviderError::Other(_) => ChargeOutcome::Unclassified(detail),
    }
}

pub fn billing_action(outcome: &ChargeOutcome) -> BillingAction {
    match outcome {
        ChargeOutcome::Charged => BillingAction::MarkPaid,
        ChargeOutcome::InsufficientFunds => BillingAction::RecordFailure {
            reason: FailedSettlementReason::InsufficientFunds,
            log: INSUFFICIENT_FUNDS_LOG.to_string(),
        },
        ChargeOutcome::CurrencyMismatch(detail) => BillingAction::RecordFailure {
            reason: FailedSettlementReason::CurrencyMismatch,
            log: detail.clone(),
        },
        ChargeOutcome::NetworkError(detail) => BillingAction::RecordFailure {
            reason: FailedSettlementReason::NetworkError,
            log: detail.clone(),
        },
        ChargeOutcome::CustomerNotFound(_)
        | ChargeOutcome::InvoiceNotFound(_)
        | ChargeOutcome::Unclassified(_) => BillingAction::Drop,
    }
}

impl ChargeOutcome {
    pub fn is_charged(&self) -> bool {
        matches!(self, ChargeOutcome::Charged)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChargeOutcome::Charged => "CHARGED",
            ChargeOutcome::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ChargeOutcome::CurrencyMismatch(_) => "CURRENCY_MISMATCH",
            ChargeOutcome::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            ChargeOutcome::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            ChargeOutcome::NetworkError(_) => "NETWORK_ERROR",
            ChargeOutcome::Unclassified(_) => "UNCLASSIFIED",
        }
    }

    /// Diagnostic text kept on the failed settlement.
    pub fn log_message(&self) -> String {
        match self {
            ChargeOutcome::Charged => "charged".to_string(),
            ChargeOutcome::InsufficientFunds => INSUFFICIENT_FUNDS_LOG.to_string(),
            ChargeOutcome::CurrencyMismatch(detail)
            | ChargeOutcome::CustomerNotFound(detail)
            | ChargeOutcome::InvoiceNotFound(detail)
            | ChargeOutcome::NetworkError(detail)
            | ChargeOutcome::Unclassified(detail) => detail.clone(),
        }
    }
}
