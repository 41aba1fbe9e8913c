use crate::domain::settlement::FailedSettlement;

const BASE_MINUTES: i64 = 5;

/// What the retry window is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackoffAnchor {
    /// Raw wall-clock epoch seconds, windows anchored at epoch zero.
    #[default]
    Epoch,
    /// Seconds elapsed since the record's `date_created`.
    SinceCreated,
}

impl BackoffAnchor {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "created" | "since_created" => BackoffAnchor::SinceCreated,
            _ => BackoffAnchor::Epoch,
        }
    }
}

/// Half-open `[start_secs, end_secs)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryWindow {
    pub start_secs: i64,
    pub end_secs: i64,
}

impl RetryWindow {
    pub fn contains(&self, secs: i64) -> bool {
        secs >= self.start_secs && secs < self.end_secs
    }
}

/// `[5^(r+1), 5^(r+2))` minutes for a record with `r` completed retries.
/// `None` when the bounds do not fit in an `i64`.
pub fn retry_window(retries: i32) -> Option<RetryWindow> {
    let r = u32::try_from(retries).ok()?;
    let start_minutes = BASE_MINUTES.checked_pow(r.checked_add(1)?)?;
    let end_minutes = BASE_MINUTES.checked_pow(r.checked_add(2)?)?;
    Some(RetryWindow {
        start_secs: start_minutes.checked_mul(60)?,
        end_secs: end_minutes.checked_mul(60)?,
    })
}

pub fn is_eligible(settlement: &FailedSettlement, now_epoch_secs: i64, anchor: BackoffAnchor) -> bool {
    let Some(window) = retry_window(settlement.retries) else {
        return false;
    };

    let measured = match anchor {
        BackoffAnchor::Epoch => now_epoch_secs,
        BackoffAnchor::SinceCreated => now_epoch_secs.saturating_sub(settlement.date_created),
    };
    window.contains(measured)
}
