use crate::domain::invoice::{Currency, InvoiceStatus};
use crate::repo::customers_repo::CustomersRepo;
use crate::repo::invoices_repo::InvoicesRepo;
use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

pub const DEMO_CUSTOMERS: usize = 100;
pub const DEMO_INVOICES_PER_CUSTOMER: usize = 10;

#[derive(Debug, Clone)]
pub struct DemoCustomer {
    pub currency: Currency,
    pub invoices: Vec<(Decimal, InvoiceStatus)>,
}

/// Every customer gets one currency; only their last invoice is left PENDING.
pub fn demo_plan<R: Rng>(rng: &mut R, customers: usize, invoices_per_customer: usize) -> Vec<DemoCustomer> {
    (0..customers)
        .map(|_| {
            let currency = *Currency::ALL.choose(rng).unwrap_or(&Currency::Eur);
            let invoices = (0..invoices_per_customer)
                .map(|i| {
                    let cents: i64 = rng.gen_range(1_000..=50_000);
                    let status = if i + 1 == invoices_per_customer {
                        InvoiceStatus::Pending
                    } else {
                        InvoiceStatus::Paid
                    };
                    (Decimal::new(cents, 2), status)
                })
                .collect();
            DemoCustomer { currency, invoices }
        })
        .collect()
}

/// Inserts the demo data set unless customers already exist.
pub async fn seed_demo_data(customers_repo: &CustomersRepo, invoices_repo: &InvoicesRepo) -> Result<bool> {
    if customers_repo.count().await? > 0 {
        tracing::info!("customers present, skipping demo data");
        return Ok(false);
    }

    let plan = demo_plan(&mut rand::thread_rng(), DEMO_CUSTOMERS, DEMO_INVOICES_PER_CUSTOMER);
    for entry in plan {
        let customer = customers_repo.create(entry.currency).await?;
        for (value, status) in entry.invoices {
            invoices_repo
                .create(customer.id, value, customer.currency, status)
                .await?;
        }
    }

    tracing::info!(
        customers = DEMO_CUSTOMERS,
        invoices_per_customer = DEMO_INVOICES_PER_CUSTOMER,
        "demo data seeded"
    );
    Ok(true)
}
