use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::domain::settlement::{FailedSettlement, FailedSettlementReason, FailedSettlementStatus};
use crate::ledger::SettlementLedger;
use crate::repo::failed_settlements_repo::FailedSettlementsRepo;
use crate::repo::invoices_repo::InvoicesRepo;
use anyhow::Result;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgLedger {
    pub invoices_repo: InvoicesRepo,
    pub failed_settlements_repo: FailedSettlementsRepo,
    pub max_retries: i32,
}

impl PgLedger {
    pub fn new(pool: PgPool, max_retries: i32) -> Self {
        Self {
            invoices_repo: InvoicesRepo { pool: pool.clone() },
            failed_settlements_repo: FailedSettlementsRepo { pool },
            max_retries,
        }
    }
}

#[async_trait::async_trait]
impl SettlementLedger for PgLedger {
    async fn fetch_pending_invoices(&self) -> Result<Vec<Invoice>> {
        self.invoices_repo.fetch_by_status(InvoiceStatus::Pending).await
    }

    async fn fetch_invoice(&self, id: i64) -> Result<Option<Invoice>> {
        self.invoices_repo.fetch(id).await
    }

    async fn update_invoice_status(&self, invoice: &Invoice, status: InvoiceStatus) -> Result<()> {
        let updated = self.invoices_repo.update_status(invoice.id, status).await?;
        if updated == 0 {
            tracing::debug!(invoice_id = invoice.id, "invoice already settled, status left unchanged");
        }
        Ok(())
    }

    async fn create_failed_settlement(
        &self,
        invoice: &Invoice,
        reason: FailedSettlementReason,
        log: &str,
    ) -> Result<i64> {
        let created = self
            .failed_settlements_repo
            .create(
                invoice.id,
                reason,
                log,
                chrono::Utc::now().timestamp(),
                self.max_retries,
            )
            .await?;
        created.ok_or_else(|| {
            anyhow::anyhow!("invoice {} already has a reconcilable failed settlement", invoice.id)
        })
    }

    async fn update_failed_settlement(
        &self,
        id: i64,
        log: &str,
        status: FailedSettlementStatus,
    ) -> Result<()> {
        let updated = self
            .failed_settlements_repo
            .record_attempt(id, log, status)
            .await?;
        anyhow::ensure!(updated == 1, "failed settlement {id} not found");
        Ok(())
    }

    async fn fetch_unresolved_failed_settlements(
        &self,
        max_retries: i32,
    ) -> Result<Vec<FailedSettlement>> {
        self.failed_settlements_repo.fetch_unresolved(max_retries).await
    }

    async fn fetch_failed_settlement(&self, id: i64) -> Result<Option<FailedSettlement>> {
        self.failed_settlements_repo.fetch(id).await
    }
}
