use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailedSettlementStatus {
    Unresolved,
    Resolved,
}

impl FailedSettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailedSettlementStatus::Unresolved => "UNRESOLVED",
            FailedSettlementStatus::Resolved => "RESOLVED",
        }
    }
}

impl FromStr for FailedSettlementStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "UNRESOLVED" => Ok(FailedSettlementStatus::Unresolved),
            "RESOLVED" => Ok(FailedSettlementStatus::Resolved),
            other => Err(anyhow!("unknown failed settlement status {other:?}")),
        }
    }
}

/// Why the first charge attempt failed. Fixed for the lifetime of the record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailedSettlementReason {
    CurrencyMismatch,
    InsufficientFunds,
    NetworkError,
}

impl FailedSettlementReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailedSettlementReason::CurrencyMismatch => "CURRENCY_MISMATCH",
            FailedSettlementReason::InsufficientFunds => "INSUFFICIENT_FUNDS",
            FailedSettlementReason::NetworkError => "NETWORK_ERROR",
        }
    }
}

impl FromStr for FailedSettlementReason {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CURRENCY_MISMATCH" => Ok(FailedSettlementReason::CurrencyMismatch),
            "INSUFFICIENT_FUNDS" => Ok(FailedSettlementReason::InsufficientFunds),
            "NETWORK_ERROR" => Ok(FailedSettlementReason::NetworkError),
            other => Err(anyhow!("unknown failed settlement reason {other:?}")),
        }
    }
}

impl fmt::Display for FailedSettlementReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconciliation attempts a failed settlement gets before it is left alone.
pub const DEFAULT_MAX_RETRIES: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedSettlement {
    pub id: i64,
    pub invoice_id: i64,
    pub status: FailedSettlementStatus,
    /// Epoch seconds of the first failed charge.
    pub date_created: i64,
    pub reason: FailedSettlementReason,
    pub log: String,
    pub retries: i32,
}

impl FailedSettlement {
    /// 1-based number of the reconciliation attempt about to be made.
    pub fn next_attempt(&self) -> i32 {
        self.retries.saturating_add(1)
    }

    /// UNRESOLVED and still under the retry cap. An exhausted record no longer
    /// blocks a new failure for the same invoice.
    pub fn is_reconcilable(&self, max_retries: i32) -> bool {
        self.status == FailedSettlementStatus::Unresolved && self.retries < max_retries
    }
}
