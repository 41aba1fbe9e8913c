use crate::domain::invoice::{Currency, Customer};
use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct CustomersRepo {
    pub pool: PgPool,
}

impl CustomersRepo {
    pub async fn create(&self, currency: Currency) -> Result<Customer> {
        let row = sqlx::query("INSERT INTO customers (currency) VALUES ($1) RETURNING id, currency")
            .bind(currency.as_str())
            .fetch_one(&self.pool)
            .await?;

        to_customer(&row)
    }

    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}

fn to_customer(row: &PgRow) -> Result<Customer> {
    let currency: String = row.try_get("currency")?;
    Ok(Customer {
        id: row.try_get("id")?,
        currency: currency.parse()?,
    })
}
