pub mod clock;
pub mod config;
pub mod domain {
    pub mod invoice;
    pub mod settlement;
}
pub mod http {
    pub mod handlers {
        pub mod failed_settlements;
        pub mod invoices;
        pub mod jobs;
        pub mod ops;
    }
    pub mod middleware {
        pub mod admin_auth;
    }
}
pub mod ledger;
pub mod provider;
pub mod repo {
    pub mod customers_repo;
    pub mod failed_settlements_repo;
    pub mod invoices_repo;
}
pub mod service {
    pub mod backoff;
    pub mod billing_service;
    pub mod classifier;
    pub mod reconciliation_service;
    pub mod scheduler;
    pub mod seed;
}

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub invoices_repo: repo::invoices_repo::InvoicesRepo,
    pub failed_settlements_repo: repo::failed_settlements_repo::FailedSettlementsRepo,
    pub billing_job: service::scheduler::BillingJob,
    pub reconciliation_job: service::scheduler::ReconciliationJob,
    pub max_settlement_retries: i32,
}

/// Wires both scheduled jobs against one ledger and one provider.
pub fn build_jobs(
    cfg: &config::AppConfig,
    ledger: Arc<dyn ledger::SettlementLedger>,
    provider: Arc<dyn provider::PaymentProvider>,
    clock: Arc<dyn clock::Clock>,
) -> (service::scheduler::BillingJob, service::scheduler::ReconciliationJob) {
    let billing_job = service::scheduler::BillingJob {
        billing_service: service::billing_service::BillingService {
            provider: provider.clone(),
            ledger: ledger.clone(),
        },
        day_of_month: cfg.billing_day_of_month,
        hour_utc: cfg.billing_hour_utc,
    };
    let reconciliation_job = service::scheduler::ReconciliationJob {
        reconciliation_service: service::reconciliation_service::ReconciliationService {
            provider,
            ledger,
            clock,
            policy: service::reconciliation_service::ReconciliationPolicy {
                max_retries: cfg.max_settlement_retries,
                anchor: cfg.backoff_anchor,
            },
        },
        interval: std::time::Duration::from_secs(cfg.reconciliation_interval_secs),
    };
    (billing_job, reconciliation_job)
}
