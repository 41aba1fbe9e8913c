use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::ledger::SettlementLedger;
use crate::provider::PaymentProvider;
use crate::service::classifier::{billing_action, classify_charge, BillingAction, ChargeOutcome};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct BillingService {
    pub provider: Arc<dyn PaymentProvider>,
    pub ledger: Arc<dyn SettlementLedger>,
}

/// Result of one charge attempt against one invoice.
#[derive(Debug, Clone)]
pub struct InvoiceSettlement {
    pub invoice_id: i64,
    pub outcome: ChargeOutcome,
    pub action: BillingAction,
    pub ledger_error: Option<String>,
}

impl InvoiceSettlement {
    pub fn charged(&self) -> bool {
        self.outcome.is_charged()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BillingSummary {
    pub run_id: Uuid,
    pub processed: usize,
    pub charged: usize,
    pub marked_for_reconciliation: usize,
    pub dropped: usize,
    pub ledger_errors: usize,
}

impl BillingService {
    /// Charges every PENDING invoice once. Only the initial fetch can fail the cycle.
    pub async fn settle_pending_invoices(&self) -> Result<BillingSummary> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("billing_cycle", %run_id);

        async move {
            let invoices = self.ledger.fetch_pending_invoices().await?;
            tracing::info!(pending = invoices.len(), "billing cycle started");

            let mut summary = BillingSummary {
                run_id,
                ..BillingSummary::default()
            };
            for invoice in &invoices {
                let settled = self.settle_invoice(invoice).await;
                summary.processed += 1;
                if settled.ledger_error.is_some() {
                    summary.ledger_errors += 1;
                }
                match settled.action {
                    BillingAction::MarkPaid => summary.charged += 1,
                    BillingAction::RecordFailure { .. } => summary.marked_for_reconciliation += 1,
                    BillingAction::Drop => summary.dropped += 1,
                }
            }

            tracing::info!(
                processed = summary.processed,
                charged = summary.charged,
                marked_for_reconciliation = summary.marked_for_reconciliation,
                dropped = summary.dropped,
                ledger_errors = summary.ledger_errors,
                "billing cycle finished"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    pub async fn settle_invoice(&self, invoice: &Invoice) -> InvoiceSettlement {
        let outcome = classify_charge(self.provider.charge(invoice).await);
        log_outcome(invoice, &outcome);

        let action = billing_action(&outcome);
        let ledger_error = self
            .apply(invoice, &action)
            .await
            .err()
            .map(|e| {
                tracing::error!(invoice_id = invoice.id, error = %e, "failed to record billing outcome");
                e.to_string()
            });

        InvoiceSettlement {
            invoice_id: invoice.id,
            outcome,
            action,
            ledger_error,
        }
    }

    async fn apply(&self, invoice: &Invoice, action: &BillingAction) -> Result<()> {
        match action {
            BillingAction::MarkPaid => {
                self.ledger
                    .update_invoice_status(invoice, InvoiceStatus::Paid)
                    .await
            }
            BillingAction::RecordFailure { reason, log } => {
                let settlement_id = self
                    .ledger
                    .create_failed_settlement(invoice, *reason, log)
                    .await?;
                tracing::info!(
                    invoice_id = invoice.id,
                    settlement_id,
                    reason = %reason,
                    "invoice marked for reconciliation"
                );
                Ok(())
            }
            BillingAction::Drop => Ok(()),
        }
    }
}

fn log_outcome(invoice: &Invoice, outcome: &ChargeOutcome) {
    match outcome {
        ChargeOutcome::Charged => {
            tracing::info!(invoice_id = invoice.id, "invoice charged")
        }
        ChargeOutcome::InsufficientFunds => {
            tracing::info!(invoice_id = invoice.id, reason = outcome.label(), "invoice not charged")
        }
        ChargeOutcome::CurrencyMismatch(detail) | ChargeOutcome::NetworkError(detail) => {
            tracing::warn!(
                invoice_id = invoice.id,
                reason = outcome.label(),
                detail = %detail,
                "invoice not charged"
            )
        }
        ChargeOutcome::CustomerNotFound(detail) => {
            tracing::warn!(
                invoice_id = invoice.id,
                customer_id = invoice.customer_id,
                detail = %detail,
                "customer not found, invoice dropped"
            )
        }
        ChargeOutcome::InvoiceNotFound(detail) => {
            tracing::warn!(invoice_id = invoice.id, detail = %detail, "invoice unknown to provider, dropped")
        }
        ChargeOutcome::Unclassified(detail) => {
            tracing::error!(invoice_id = invoice.id, detail = %detail, "unclassified charge failure, invoice dropped")
        }
    }
}
