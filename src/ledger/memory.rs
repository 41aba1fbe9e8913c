use crate::clock::{Clock, SystemClock};
use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::domain::settlement::{
    FailedSettlement, FailedSettlementReason, FailedSettlementStatus, DEFAULT_MAX_RETRIES,
};
use crate::ledger::SettlementLedger;
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct LedgerState {
    invoices: BTreeMap<i64, Invoice>,
    failed_settlements: BTreeMap<i64, FailedSettlement>,
    next_settlement_id: i64,
}

/// Process-local ledger with the same rules as the Postgres schema.
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    clock: Arc<dyn Clock>,
    max_retries: i32,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(LedgerState {
                next_settlement_id: 1,
                ..LedgerState::default()
            }),
            clock,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Retry cap above which an UNRESOLVED record stops counting as open.
    pub fn with_max_retries(mut self, max_retries: i32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn insert_invoice(&self, invoice: Invoice) {
        self.state.write().await.invoices.insert(invoice.id, invoice);
    }

    pub async fn insert_failed_settlement(&self, settlement: FailedSettlement) {
        let mut state = self.state.write().await;
        state.next_settlement_id = state.next_settlement_id.max(settlement.id + 1);
        state.failed_settlements.insert(settlement.id, settlement);
    }

    pub async fn invoice(&self, id: i64) -> Option<Invoice> {
        self.state.read().await.invoices.get(&id).cloned()
    }

    pub async fn failed_settlements(&self) -> Vec<FailedSettlement> {
        self.state
            .read()
            .await
            .failed_settlements
            .values()
            .cloned()
            .collect()
    }

    pub async fn failed_settlements_for_invoice(&self, invoice_id: i64) -> Vec<FailedSettlement> {
        self.state
            .read()
            .await
            .failed_settlements
            .values()
            .filter(|s| s.invoice_id == invoice_id)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl SettlementLedger for InMemoryLedger {
    async fn fetch_pending_invoices(&self) -> Result<Vec<Invoice>> {
        Ok(self
            .state
            .read()
            .await
            .invoices
            .values()
            .filter(|i| i.status == InvoiceStatus::Pending)
            .cloned()
            .collect())
    }

    async fn fetch_invoice(&self, id: i64) -> Result<Option<Invoice>> {
        Ok(self.invoice(id).await)
    }

    async fn update_invoice_status(&self, invoice: &Invoice, status: InvoiceStatus) -> Result<()> {
        let mut state = self.state.write().await;
        let Some(stored) = state.invoices.get_mut(&invoice.id) else {
            bail!("invoice {} not found", invoice.id);
        };
        if stored.status != InvoiceStatus::Paid {
            stored.status = status;
        }
        Ok(())
    }

    async fn create_failed_settlement(
        &self,
        invoice: &Invoice,
        reason: FailedSettlementReason,
        log: &str,
    ) -> Result<i64> {
        let mut state = self.state.write().await;
        let already_open = state
            .failed_settlements
            .values()
            .any(|s| s.invoice_id == invoice.id && s.is_reconcilable(self.max_retries));
        if already_open {
            bail!("invoice {} already has a reconcilable failed settlement", invoice.id);
        }

        let id = state.next_settlement_id;
        state.next_settlement_id += 1;
        state.failed_settlements.insert(
            id,
            FailedSettlement {
                id,
                invoice_id: invoice.id,
                status: FailedSettlementStatus::Unresolved,
                date_created: self.clock.now_epoch_secs(),
                reason,
                log: log.to_string(),
                retries: 0,
            },
        );
        Ok(id)
    }

    async fn update_failed_settlement(
        &self,
        id: i64,
        log: &str,
        status: FailedSettlementStatus,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let Some(stored) = state.failed_settlements.get_mut(&id) else {
            bail!("failed settlement {id} not found");
        };
        stored.retries += 1;
        stored.log = log.to_string();
        stored.status = status;
        Ok(())
    }

    async fn fetch_unresolved_failed_settlements(
        &self,
        max_retries: i32,
    ) -> Result<Vec<FailedSettlement>> {
        Ok(self
            .state
            .read()
            .await
            .failed_settlements
            .values()
            .filter(|s| s.is_reconcilable(max_retries))
            .cloned()
            .collect())
    }

    async fn fetch_failed_settlement(&self, id: i64) -> Result<Option<FailedSettlement>> {
        Ok(self.state.read().await.failed_settlements.get(&id).cloned())
    }
}
