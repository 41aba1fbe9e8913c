use crate::domain::invoice::{Currency, Invoice, InvoiceStatus, Money};
use anyhow::Result;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct InvoicesRepo {
    pub pool: PgPool,
}

impl InvoicesRepo {
    pub async fn fetch(&self, id: i64) -> Result<Option<Invoice>> {
        let row = sqlx::query(
            "SELECT id, customer_id, value, currency, status FROM invoices WHERE id=$1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(to_invoice).transpose()
    }

    pub async fn fetch_all(&self) -> Result<Vec<Invoice>> {
        let rows = sqlx::query("SELECT id, customer_id, value, currency, status FROM invoices ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(to_invoice).collect()
    }

    pub async fn fetch_by_status(&self, status: InvoiceStatus) -> Result<Vec<Invoice>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, value, currency, status
            FROM invoices
            WHERE status=$1
            ORDER BY id ASC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(to_invoice).collect()
    }

    pub async fn update_status(&self, id: i64, status: InvoiceStatus) -> Result<u64> {
        // PAID is terminal
        let res = sqlx::query("UPDATE invoices SET status=$2 WHERE id=$1 AND status <> 'PAID'")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(res.rows_affected())
    }

    pub async fn create(
        &self,
        customer_id: i64,
        value: Decimal,
        currency: Currency,
        status: InvoiceStatus,
    ) -> Result<Invoice> {
        let row = sqlx::query(
            r#"
            INSERT INTO invoices (customer_id, value, currency, status)
            VALUES ($1,$2,$3,$4)
            RETURNING id, customer_id, value, currency, status
            "#,
        )
        .bind(customer_id)
        .bind(value)
        .bind(currency.as_str())
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        to_invoice(&row)
    }
}

fn to_invoice(row: &PgRow) -> Result<Invoice> {
    let currency: String = row.try_get("currency")?;
    let status: String = row.try_get("status")?;
    Ok(Invoice {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        amount: Money {
            value: row.try_get("value")?,
            currency: currency.parse()?,
        },
        status: status.parse()?,
    })
}
