use anyhow::Result;
use invoice_settlement::build_jobs;
use invoice_settlement::clock::SystemClock;
use invoice_settlement::config::AppConfig;
use invoice_settlement::ledger::pg::PgLedger;
use invoice_settlement::provider::build_provider;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cfg.database_url)
        .await?;

    let (_, reconciliation_job) = build_jobs(
        &cfg,
        Arc::new(PgLedger::new(pool, cfg.max_settlement_retries)),
        build_provider(&cfg)?,
        Arc::new(SystemClock),
    );
    tracing::info!(
        max_retries = cfg.max_settlement_retries,
        backoff_anchor = ?cfg.backoff_anchor,
        interval_secs = cfg.reconciliation_interval_secs,
        "reconciliation worker starting"
    );

    if std::env::args().any(|a| a == "--once") {
        let summary = reconciliation_job.run_once().await?;
        tracing::info!("reconciliation summary: {}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    reconciliation_job.run().await;
    Ok(())
}
