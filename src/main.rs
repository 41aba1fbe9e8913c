use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use invoice_settlement::clock::SystemClock;
use invoice_settlement::config::AppConfig;
use invoice_settlement::ledger::pg::PgLedger;
use invoice_settlement::provider::build_provider;
use invoice_settlement::repo::customers_repo::CustomersRepo;
use invoice_settlement::repo::failed_settlements_repo::FailedSettlementsRepo;
use invoice_settlement::repo::invoices_repo::InvoicesRepo;
use invoice_settlement::service::seed::seed_demo_data;
use invoice_settlement::{build_jobs, AppState};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let invoices_repo = InvoicesRepo { pool: pool.clone() };
    let failed_settlements_repo = FailedSettlementsRepo { pool: pool.clone() };
    if cfg.seed_data {
        let customers_repo = CustomersRepo { pool: pool.clone() };
        seed_demo_data(&customers_repo, &invoices_repo).await?;
    }

    let provider = build_provider(&cfg)?;
    tracing::info!(provider = provider.name(), backoff_anchor = ?cfg.backoff_anchor, "payment provider configured");

    let (billing_job, reconciliation_job) = build_jobs(
        &cfg,
        Arc::new(PgLedger::new(pool.clone(), cfg.max_settlement_retries)),
        provider,
        Arc::new(SystemClock),
    );
    tokio::spawn(billing_job.clone().run());
    tokio::spawn(reconciliation_job.clone().run());

    let state = AppState {
        pool,
        invoices_repo,
        failed_settlements_repo,
        billing_job,
        reconciliation_job,
        max_settlement_retries: cfg.max_settlement_retries,
    };

    let admin_routes = Router::new()
        .route(
            "/jobs/billing/run",
            post(invoice_settlement::http::handlers::jobs::run_billing),
        )
        .route(
            "/jobs/reconciliation/run",
            post(invoice_settlement::http::handlers::jobs::run_reconciliation),
        )
        .layer(from_fn_with_state(
            cfg.internal_api_key.clone(),
            invoice_settlement::http::middleware::admin_auth::require_internal_api_key,
        ));

    let app = Router::new()
        .route("/health", get(invoice_settlement::http::handlers::ops::health))
        .route("/ops/readiness", get(invoice_settlement::http::handlers::ops::readiness))
        .route("/ops/liveness", get(invoice_settlement::http::handlers::ops::liveness))
        .route("/invoices", get(invoice_settlement::http::handlers::invoices::list_invoices))
        .route(
            "/invoices/:invoice_id",
            get(invoice_settlement::http::handlers::invoices::get_invoice),
        )
        .route(
            "/invoices/:invoice_id/failed-settlements",
            get(invoice_settlement::http::handlers::invoices::list_invoice_failed_settlements),
        )
        .route(
            "/failed-settlements",
            get(invoice_settlement::http::handlers::failed_settlements::list_unresolved),
        )
        .route(
            "/failed-settlements/:settlement_id",
            get(invoice_settlement::http::handlers::failed_settlements::get_failed_settlement),
        )
        .merge(admin_routes)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
