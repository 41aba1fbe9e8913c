use crate::service::billing_service::{BillingService, BillingSummary};
use crate::service::reconciliation_service::{ReconciliationService, ReconciliationSummary};
use anyhow::Result;
use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Runs the billing cycle on a fixed day and hour of every month (UTC).
#[derive(Clone)]
pub struct BillingJob {
    pub billing_service: BillingService,
    pub day_of_month: u32,
    pub hour_utc: u32,
}

impl BillingJob {
    pub async fn run_once(&self) -> Result<BillingSummary> {
        self.billing_service.settle_pending_invoices().await
    }

    pub async fn run(self) {
        loop {
            let now = Utc::now();
            let wait = next_monthly_run(now, self.day_of_month, self.hour_utc)
                .and_then(|next| (next - now).to_std().ok())
                .unwrap_or(std::time::Duration::from_secs(3600));
            tracing::info!(wait_secs = wait.as_secs(), "next billing cycle scheduled");
            tokio::time::sleep(wait).await;

            if let Err(err) = self.run_once().await {
                tracing::error!(error = %err, "billing cycle failed");
            }
        }
    }
}

/// Runs the reconciliation cycle on a fixed interval, starting immediately.
#[derive(Clone)]
pub struct ReconciliationJob {
    pub reconciliation_service: ReconciliationService,
    pub interval: std::time::Duration,
}

impl ReconciliationJob {
    pub async fn run_once(&self) -> Result<ReconciliationSummary> {
        self.reconciliation_service.retry_failed_settlements().await
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = self.run_once().await {
                tracing::error!(error = %err, "reconciliation cycle failed");
            }
        }
    }
}

/// First instant strictly after `now` that falls on `day` at `hour`:00 UTC.
/// `day` is clamped to 1..=28 so every month has it.
pub fn next_monthly_run(now: DateTime<Utc>, day: u32, hour: u32) -> Option<DateTime<Utc>> {
    let day = day.clamp(1, 28);
    let hour = hour.min(23);

    let this_month = Utc
        .with_ymd_and_hms(now.year(), now.month(), day, hour, 0, 0)
        .single()?;
    if this_month > now {
        return Some(this_month);
    }

    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).single()
}

