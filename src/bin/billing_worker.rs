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

    let (billing_job, _) = build_jobs(
        &cfg,
        Arc::new(PgLedger::new(pool, cfg.max_settlement_retries)),
        build_provider(&cfg)?,
        Arc::new(SystemClock),
    );

    if std::env::args().any(|a| a == "--once") {
        let summary = billing_job.run_once().await?;
        tracing::info!("billing summary: {}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    billing_job.run().await;
    Ok(())
}
