use crate::clock::Clock;
use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::domain::settlement::{FailedSettlement, FailedSettlementReason, FailedSettlementStatus};
use crate::ledger::SettlementLedger;
use crate::provider::PaymentProvider;
use crate::service::backoff::{is_eligible, BackoffAnchor};
use crate::service::classifier::{
    classify_charge, classify_error, ChargeOutcome, INSUFFICIENT_FUNDS_LOG,
};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub use crate::domain::settlement::DEFAULT_MAX_RETRIES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationPolicy {
    pub max_retries: i32,
    pub anchor: BackoffAnchor,
}

impl Default for ReconciliationPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            anchor: BackoffAnchor::Epoch,
        }
    }
}

#[derive(Clone)]
pub struct ReconciliationService {
    pub provider: Arc<dyn PaymentProvider>,
    pub ledger: Arc<dyn SettlementLedger>,
    pub clock: Arc<dyn Clock>,
    pub policy: ReconciliationPolicy,
}

/// How one reconciliation attempt ended. Every variant consumed a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResettleOutcome {
    /// The ledger already had the invoice as PAID; no provider call was made.
    AlreadyPaid,
    /// The provider confirmed the earlier ambiguous charge went through.
    VerifiedPaid,
    Charged,
    Declined,
    Failed(ChargeOutcome),
}

impl ResettleOutcome {
    /// True only when this attempt issued a charge that succeeded.
    pub fn charged(&self) -> bool {
        matches!(self, ResettleOutcome::Charged)
    }

    pub fn resolved(&self) -> bool {
        matches!(
            self,
            ResettleOutcome::AlreadyPaid | ResettleOutcome::VerifiedPaid | ResettleOutcome::Charged
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationSummary {
    pub run_id: Uuid,
    pub scanned: usize,
    pub missing_invoice: usize,
    pub not_due: usize,
    pub resolved: usize,
    pub charged: usize,
    pub declined: usize,
    pub failed: usize,
    pub ledger_errors: usize,
}

impl ReconciliationService {
    pub async fn retry_failed_settlements(&self) -> Result<ReconciliationSummary> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("reconciliation_cycle", %run_id);

        async move {
            let settlements = self
                .ledger
                .fetch_unresolved_failed_settlements(self.policy.max_retries)
                .await?;
            let now = self.clock.now_epoch_secs();
            tracing::info!(unresolved = settlements.len(), now, "reconciliation cycle started");

            let mut summary = ReconciliationSummary {
                run_id,
                ..ReconciliationSummary::default()
            };
            for settlement in &settlements {
                summary.scanned += 1;

                let invoice = match self.ledger.fetch_invoice(settlement.invoice_id).await {
                    Ok(Some(invoice)) => invoice,
                    Ok(None) => {
                        tracing::warn!(
                            settlement_id = settlement.id,
                            invoice_id = settlement.invoice_id,
                            "invoice not found, skipping failed settlement"
                        );
                        summary.missing_invoice += 1;
                        continue;
                    }
                    Err(e) => {
                        tracing::error!(settlement_id = settlement.id, error = %e, "failed to load invoice");
                        summary.ledger_errors += 1;
                        continue;
                    }
                };

                if !is_eligible(settlement, now, self.policy.anchor) {
                    tracing::debug!(
                        settlement_id = settlement.id,
                        retries = settlement.retries,
                        "outside retry window"
                    );
                    summary.not_due += 1;
                    continue;
                }

                match self.attempt_resettle(settlement, &invoice).await {
                    Ok(outcome) => {
                        if outcome.resolved() {
                            summary.resolved += 1;
                        }
                        match outcome {
                            ResettleOutcome::Charged => summary.charged += 1,
                            ResettleOutcome::Declined => summary.declined += 1,
                            ResettleOutcome::Failed(_) => summary.failed += 1,
                            ResettleOutcome::AlreadyPaid | ResettleOutcome::VerifiedPaid => {}
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            settlement_id = settlement.id,
                            invoice_id = invoice.id,
                            error = %e,
                            "failed to record reconciliation attempt"
                        );
                        summary.ledger_errors += 1;
                    }
                }
            }

            tracing::info!(
                scanned = summary.scanned,
                resolved = summary.resolved,
                charged = summary.charged,
                declined = summary.declined,
                failed = summary.failed,
                not_due = summary.not_due,
                missing_invoice = summary.missing_invoice,
                ledger_errors = summary.ledger_errors,
                "reconciliation cycle finished"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    /// Makes one reconciliation attempt. Provider failures are recorded on the
    /// settlement and returned as [`ResettleOutcome::Failed`]; `Err` means a
    /// ledger write did not go through.
    pub async fn attempt_resettle(
        &self,
        settlement: &FailedSettlement,
        invoice: &Invoice,
    ) -> Result<ResettleOutcome> {
        let attempt = settlement.next_attempt();

        if invoice.is_paid() {
            self.ledger
                .update_failed_settlement(
                    settlement.id,
                    &settlement.log,
                    FailedSettlementStatus::Resolved,
                )
                .await?;
            tracing::info!(
                settlement_id = settlement.id,
                invoice_id = invoice.id,
                attempt,
                "invoice already paid, failed settlement resolved"
            );
            return Ok(ResettleOutcome::AlreadyPaid);
        }

        // A network failure leaves the first charge in an unknown state.
        if settlement.reason == FailedSettlementReason::NetworkError {
            match self.provider.payment_status(invoice).await {
                Ok(true) => {
                    self.mark_resolved(settlement, invoice).await?;
                    tracing::info!(
                        settlement_id = settlement.id,
                        invoice_id = invoice.id,
                        attempt,
                        "earlier charge verified, failed settlement resolved"
                    );
                    return Ok(ResettleOutcome::VerifiedPaid);
                }
                Ok(false) => {
                    tracing::info!(settlement_id = settlement.id, attempt, "earlier charge verified as not taken");
                }
                Err(e) => return self.record_failure(settlement, invoice, classify_error(e)).await,
            }
        }

        match classify_charge(self.provider.charge(invoice).await) {
            ChargeOutcome::Charged => {
                self.mark_resolved(settlement, invoice).await?;
                tracing::info!(
                    settlement_id = settlement.id,
                    invoice_id = invoice.id,
                    attempt,
                    "invoice charged, failed settlement resolved"
                );
                Ok(ResettleOutcome::Charged)
            }
            ChargeOutcome::InsufficientFunds => {
                self.ledger
                    .update_failed_settlement(
                        settlement.id,
                        INSUFFICIENT_FUNDS_LOG,
                        FailedSettlementStatus::Unresolved,
                    )
                    .await?;
                tracing::info!(
                    settlement_id = settlement.id,
                    invoice_id = invoice.id,
                    attempt,
                    reason = "INSUFFICIENT_FUNDS",
                    "invoice not charged"
                );
                Ok(ResettleOutcome::Declined)
            }
            failure => self.record_failure(settlement, invoice, failure).await,
        }
    }

    async fn mark_resolved(&self, settlement: &FailedSettlement, invoice: &Invoice) -> Result<()> {
        self.ledger
            .update_invoice_status(invoice, InvoiceStatus::Paid)
            .await?;
        self.ledger
            .update_failed_settlement(settlement.id, &settlement.log, FailedSettlementStatus::Resolved)
            .await
    }

    async fn record_failure(
        &self,
        settlement: &FailedSettlement,
        invoice: &Invoice,
        outcome: ChargeOutcome,
    ) -> Result<ResettleOutcome> {
        self.ledger
            .update_failed_settlement(
                settlement.id,
                &outcome.log_message(),
                FailedSettlementStatus::Unresolved,
            )
            .await?;
        tracing::warn!(
            settlement_id = settlement.id,
            invoice_id = invoice.id,
            customer_id = invoice.customer_id,
            attempt = settlement.next_attempt(),
            reason = outcome.label(),
            detail = %outcome.log_message(),
            "reconciliation attempt failed"
        );
        Ok(ResettleOutcome::Failed(outcome))
    }
}
