mod common;

use common::{billing, failed_settlement, invoice, ledger_with_invoices, provider};
use invoice_settlement::clock::FixedClock;
use invoice_settlement::domain::invoice::{Currency, InvoiceStatus};
use invoice_settlement::domain::settlement::{FailedSettlementReason, FailedSettlementStatus};
use invoice_settlement::ledger::memory::InMemoryLedger;
use invoice_settlement::ledger::SettlementLedger;
use invoice_settlement::provider::mock::MockBehavior;
use invoice_settlement::service::classifier::INSUFFICIENT_FUNDS_LOG;
use std::sync::Arc;

fn invoices() -> Vec<invoice_settlement::domain::invoice::Invoice> {
    vec![
        invoice(1, 10_000, Currency::Eur),
        invoice(2, 20_025, Currency::Usd),
        invoice(3, 30_050, Currency::Dkk),
    ]
}

#[tokio::test]
async fn successful_charge_marks_every_invoice_paid() {
    let clock = Arc::new(FixedClock::new(1_000));
    let ledger = ledger_with_invoices(clock, invoices()).await;
    let provider = provider(MockBehavior::AlwaysSuccess);

    let summary = billing(provider.clone(), ledger.clone())
        .settle_pending_invoices()
        .await
        .unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.charged, 3);
    assert_eq!(provider.charge_calls(), 3);
    for id in 1..=3 {
        assert_eq!(ledger.invoice(id).await.unwrap().status, InvoiceStatus::Paid);
    }
    assert!(ledger.failed_settlements().await.is_empty());
}

#[tokio::test]
async fn insufficient_funds_opens_a_failed_settlement() {
    let clock = Arc::new(FixedClock::new(1_565_010_416));
    let ledger = ledger_with_invoices(clock, vec![invoice(1, 10_000, Currency::Eur)]).await;
    let service = billing(provider(MockBehavior::AlwaysDecline), ledger.clone());

    let settled = service.settle_invoice(&invoice(1, 10_000, Currency::Eur)).await;

    assert!(!settled.charged());
    assert!(settled.ledger_error.is_none());
    assert_eq!(ledger.invoice(1).await.unwrap().status, InvoiceStatus::Pending);

    let records = ledger.failed_settlements_for_invoice(1).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reason, FailedSettlementReason::InsufficientFunds);
    assert_eq!(records[0].status, FailedSettlementStatus::Unresolved);
    assert_eq!(records[0].log, INSUFFICIENT_FUNDS_LOG);
    assert_eq!(records[0].retries, 0);
    assert_eq!(records[0].date_created, 1_565_010_416);
}

#[tokio::test]
async fn currency_mismatch_and_network_errors_create_one_record_each() {
    for (behavior, reason) in [
        (MockBehavior::CurrencyMismatch, FailedSettlementReason::CurrencyMismatch),
        (MockBehavior::NetworkError, FailedSettlementReason::NetworkError),
    ] {
        let ledger = ledger_with_invoices(Arc::new(FixedClock::new(0)), invoices()).await;
        let summary = billing(provider(behavior), ledger.clone())
            .settle_pending_invoices()
            .await
            .unwrap();

        assert_eq!(summary.marked_for_reconciliation, 3);
        let records = ledger.failed_settlements().await;
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.reason == reason));
        for id in 1..=3 {
            assert_eq!(ledger.failed_settlements_for_invoice(id).await.len(), 1);
            assert_eq!(ledger.invoice(id).await.unwrap().status, InvoiceStatus::Pending);
        }
    }
}

#[tokio::test]
async fn not_found_and_unclassified_failures_leave_no_record() {
    for behavior in [
        MockBehavior::CustomerNotFound,
        MockBehavior::InvoiceNotFound,
        MockBehavior::Unclassified,
    ] {
        let ledger = ledger_with_invoices(Arc::new(FixedClock::new(0)), invoices()).await;
        let provider = provider(behavior);
        let summary = billing(provider.clone(), ledger.clone())
            .settle_pending_invoices()
            .await
            .unwrap();

        assert_eq!(summary.dropped, 3);
        assert_eq!(provider.charge_calls(), 3);
        assert!(ledger.failed_settlements().await.is_empty());
        assert_eq!(ledger.invoice(2).await.unwrap().status, InvoiceStatus::Pending);
    }
}

#[tokio::test]
async fn rerunning_billing_does_not_recharge_paid_invoices() {
    let ledger = ledger_with_invoices(Arc::new(FixedClock::new(0)), invoices()).await;
    let provider = provider(MockBehavior::AlwaysSuccess);
    let service = billing(provider.clone(), ledger.clone());

    service.settle_pending_invoices().await.unwrap();
    let second = service.settle_pending_invoices().await.unwrap();

    assert_eq!(second.processed, 0);
    assert_eq!(provider.charge_calls(), 3);
}

#[tokio::test]
async fn duplicate_open_failure_is_rejected_without_aborting_the_batch() {
    let ledger = ledger_with_invoices(Arc::new(FixedClock::new(0)), invoices()).await;
    let service = billing(provider(MockBehavior::AlwaysDecline), ledger.clone());

    service.settle_pending_invoices().await.unwrap();
    let second = service.settle_pending_invoices().await.unwrap();

    assert_eq!(second.processed, 3);
    assert_eq!(second.ledger_errors, 3);
    assert_eq!(ledger.failed_settlements().await.len(), 3);
}

#[tokio::test]
async fn exhausted_failure_does_not_block_a_new_reconcilable_record() {
    let ledger = ledger_with_invoices(Arc::new(FixedClock::new(0)), vec![invoice(1, 10_000, Currency::Eur)]).await;
    ledger
        .insert_failed_settlement(failed_settlement(1, 1, FailedSettlementReason::InsufficientFunds, 3))
        .await;
    let service = billing(provider(MockBehavior::AlwaysDecline), ledger.clone());

    let summary = service.settle_pending_invoices().await.unwrap();

    assert_eq!(summary.ledger_errors, 0);
    assert_eq!(summary.marked_for_reconciliation, 1);
    assert_eq!(ledger.failed_settlements_for_invoice(1).await.len(), 2);
    let open = ledger.fetch_unresolved_failed_settlements(3).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].retries, 0);
    assert_ne!(open[0].id, 1);
}

#[tokio::test]
async fn open_failure_counts_against_the_configured_retry_cap() {
    let clock = Arc::new(FixedClock::new(0));
    let ledger = Arc::new(InMemoryLedger::with_clock(clock).with_max_retries(5));
    ledger.insert_invoice(invoice(1, 10_000, Currency::Eur)).await;
    ledger
        .insert_failed_settlement(failed_settlement(1, 1, FailedSettlementReason::InsufficientFunds, 3))
        .await;
    let service = billing(provider(MockBehavior::AlwaysDecline), ledger.clone());

    let summary = service.settle_pending_invoices().await.unwrap();

    assert_eq!(summary.ledger_errors, 1);
    assert_eq!(ledger.failed_settlements_for_invoice(1).await.len(), 1);
}
