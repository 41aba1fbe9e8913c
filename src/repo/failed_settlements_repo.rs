use crate::domain::settlement::{FailedSettlement, FailedSettlementReason, FailedSettlementStatus};
use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct FailedSettlementsRepo {
    pub pool: PgPool,
}

impl FailedSettlementsRepo {
    /// Opens a failure record unless the invoice already has one still under
    /// `max_retries`. Returns `None` when an open record exists.
    pub async fn create(
        &self,
        invoice_id: i64,
        reason: FailedSettlementReason,
        log: &str,
        date_created: i64,
        max_retries: i32,
    ) -> Result<Option<i64>> {
        let row = sqlx::query(
            r#"
            INSERT INTO failed_settlements (invoice_id, reason_created, log, status, date_created, retries)
            SELECT $1,$2,$3,'UNRESOLVED',$4,0
            WHERE NOT EXISTS (
                SELECT 1 FROM failed_settlements
                WHERE invoice_id=$1 AND status='UNRESOLVED' AND retries < $5
            )
            RETURNING id
            "#,
        )
        .bind(invoice_id)
        .bind(reason.as_str())
        .bind(log)
        .bind(date_created)
        .bind(max_retries)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.try_get::<i64, _>("id")).transpose().map_err(Into::into)
    }

    /// Counts one more attempt and records its log and resulting status.
    pub async fn record_attempt(
        &self,
        id: i64,
        log: &str,
        status: FailedSettlementStatus,
    ) -> Result<u64> {
        let res = sqlx::query(
            "UPDATE failed_settlements SET retries=retries + 1, log=$2, status=$3 WHERE id=$1",
        )
        .bind(id)
        .bind(log)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }

    pub async fn fetch_unresolved(&self, max_retries: i32) -> Result<Vec<FailedSettlement>> {
        let rows = sqlx::query(
            r#"
            SELECT id, invoice_id, status, date_created, reason_created, log, retries
            FROM failed_settlements
            WHERE status='UNRESOLVED' AND retries < $1
            ORDER BY id ASC
            "#,
        )
        .bind(max_retries)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(to_failed_settlement).collect()
    }

    pub async fn fetch(&self, id: i64) -> Result<Option<FailedSettlement>> {
        let row = sqlx::query(
            "SELECT id, invoice_id, status, date_created, reason_created, log, retries FROM failed_settlements WHERE id=$1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(to_failed_settlement).transpose()
    }

    pub async fn list_for_invoice(&self, invoice_id: i64) -> Result<Vec<FailedSettlement>> {
        let rows = sqlx::query(
            r#"
            SELECT id, invoice_id, status, date_created, reason_created, log, retries
            FROM failed_settlements
            WHERE invoice_id=$1
            ORDER BY id ASC
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(to_failed_settlement).collect()
    }
}

fn to_failed_settlement(row: &PgRow) -> Result<FailedSettlement> {
    let status: String = row.try_get("status")?;
    let reason: String = row.try_get("reason_created")?;
    Ok(FailedSettlement {
        id: row.try_get("id")?,
        invoice_id: row.try_get("invoice_id")?,
        status: status.parse()?,
        date_created: row.try_get("date_created")?,
        reason: reason.parse()?,
        log: row.try_get("log")?,
        retries: row.try_get("retries")?,
    })
}
