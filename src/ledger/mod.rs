//! Durable store for invoices and failed settlements, as seen by the billing
//! and reconciliation services.

use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::domain::settlement::{FailedSettlement, FailedSettlementReason, FailedSettlementStatus};
use anyhow::Result;

pub mod memory;
pub mod pg;

/// Every method is its own unit of work; nothing spans more than one invoice.
#[async_trait::async_trait]
pub trait SettlementLedger: Send + Sync {
    async fn fetch_pending_invoices(&self) -> Result<Vec<Invoice>>;

    async fn fetch_invoice(&self, id: i64) -> Result<Option<Invoice>>;

    async fn update_invoice_status(&self, invoice: &Invoice, status: InvoiceStatus) -> Result<()>;

    /// Opens a new UNRESOLVED record with zero retries, stamped with the current epoch second.
    async fn create_failed_settlement(
        &self,
        invoice: &Invoice,
        reason: FailedSettlementReason,
        log: &str,
    ) -> Result<i64>;

    /// Increments the retry count and applies `log` and `status`.
    async fn update_failed_settlement(
        &self,
        id: i64,
        log: &str,
        status: FailedSettlementStatus,
    ) -> Result<()>;

    /// UNRESOLVED records with fewer than `max_retries` attempts.
    async fn fetch_unresolved_failed_settlements(
        &self,
        max_retries: i32,
    ) -> Result<Vec<FailedSettlement>>;

    async fn fetch_failed_settlement(&self, id: i64) -> Result<Option<FailedSettlement>>;
}
