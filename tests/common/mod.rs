#![allow(dead_code)]

use invoice_settlement::clock::FixedClock;
use invoice_settlement::domain::invoice::{Currency, Invoice, InvoiceStatus, Money};
use invoice_settlement::domain::settlement::{FailedSettlement, FailedSettlementReason, FailedSettlementStatus};
use invoice_settlement::ledger::memory::InMemoryLedger;
use invoice_settlement::provider::mock::{MockBehavior, MockProvider};
use invoice_settlement::service::backoff::BackoffAnchor;
use invoice_settlement::service::billing_service::BillingService;
use invoice_settlement::service::reconciliation_service::{ReconciliationPolicy, ReconciliationService};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Inside the window for a record with zero retries: [300, 1500).
pub const FIRST_WINDOW_NOW: i64 = 600;
pub const CREATED_AT: i64 = 1_565_010_416;

pub fn invoice(id: i64, cents: i64, currency: Currency) -> Invoice {
    Invoice {
        id,
        customer_id: id * 10,
        amount: Money {
            value: Decimal::new(cents, 2),
            currency,
        },
        status: InvoiceStatus::Pending,
    }
}

pub fn failed_settlement(id: i64, invoice_id: i64, reason: FailedSettlementReason, retries: i32) -> FailedSettlement {
    FailedSettlement {
        id,
        invoice_id,
        status: FailedSettlementStatus::Unresolved,
        date_created: CREATED_AT,
        reason,
        log: "TEST LOG".to_string(),
        retries,
    }
}

pub async fn ledger_with_invoices(clock: Arc<FixedClock>, invoices: Vec<Invoice>) -> Arc<InMemoryLedger> {
    let ledger = Arc::new(InMemoryLedger::with_clock(clock));
    for invoice in invoices {
        ledger.insert_invoice(invoice).await;
    }
    ledger
}

pub fn billing(provider: Arc<MockProvider>, ledger: Arc<InMemoryLedger>) -> BillingService {
    BillingService { provider, ledger }
}

pub fn reconciliation(
    provider: Arc<MockProvider>,
    ledger: Arc<InMemoryLedger>,
    clock: Arc<FixedClock>,
) -> ReconciliationService {
    ReconciliationService {
        provider,
        ledger,
        clock,
        policy: ReconciliationPolicy {
            max_retries: 3,
            anchor: BackoffAnchor::Epoch,
        },
    }
}

pub fn provider(behavior: MockBehavior) -> Arc<MockProvider> {
    Arc::new(MockProvider::new(behavior))
}
