use invoice_settlement::config::AppConfig;
use invoice_settlement::domain::invoice::{Currency, InvoiceStatus};
use invoice_settlement::http::middleware::admin_auth::api_key_matches;
use invoice_settlement::service::seed::demo_plan;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;

#[test]
fn config_defaults_are_usable() {
    let cfg = AppConfig::from_env();
    assert!(!cfg.internal_api_key.is_empty());
    assert!(cfg.max_settlement_retries >= 0);
    assert!((1..=28).contains(&cfg.billing_day_of_month));
    assert!(cfg.billing_hour_utc <= 23);
    assert!(cfg.reconciliation_interval_secs >= 1);
}

#[test]
fn demo_plan_leaves_one_pending_invoice_per_customer() {
    let mut rng = StdRng::seed_from_u64(7);
    let plan = demo_plan(&mut rng, 5, 10);

    assert_eq!(plan.len(), 5);
    for customer in &plan {
        assert_eq!(customer.invoices.len(), 10);
        let pending = customer
            .invoices
            .iter()
            .filter(|(_, status)| *status == InvoiceStatus::Pending)
            .count();
        assert_eq!(pending, 1);
        assert_eq!(customer.invoices.last().map(|(_, s)| *s), Some(InvoiceStatus::Pending));
        for (value, _) in &customer.invoices {
            assert!(*value >= Decimal::new(10, 0) && *value <= Decimal::new(500, 0));
        }
        assert!(Currency::ALL.contains(&customer.currency));
    }
}

#[test]
fn migrations_index_open_failures_without_a_hard_unique_rule() {
    let sql = std::fs::read_to_string("migrations/0001_settlement.sql").unwrap_or_default();
    assert!(sql.contains("failed_settlements_open_by_invoice"));
    assert!(sql.contains("WHERE status = 'UNRESOLVED'"));
    assert!(!sql.contains("CREATE UNIQUE INDEX"));
}

#[test]
fn failed_settlement_insert_is_guarded_by_the_retry_cap() {
    let src = std::fs::read_to_string("src/repo/failed_settlements_repo.rs").unwrap_or_default();
    assert!(src.contains("WHERE NOT EXISTS"));
    assert!(src.contains("retries < $5"));
}

#[test]
fn job_routes_require_the_configured_api_key() {
    assert!(api_key_matches("secret", Some("secret")));
    assert!(!api_key_matches("secret", Some("wrong")));
    assert!(!api_key_matches("secret", None));
    assert!(!api_key_matches("", Some("")));
    assert!(!api_key_matches("", None));
}
