use crate::domain::invoice::Invoice;
use crate::provider::{PaymentProvider, ProviderError};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub struct HttpPaymentProvider {
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    invoice_id: i64,
    customer_id: i64,
    amount: String,
    currency: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    charged: bool,
}

#[derive(Debug, Deserialize)]
struct PaymentStatusResponse {
    paid: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    code: String,
    #[serde(default)]
    message: String,
}

#[async_trait::async_trait]
impl PaymentProvider for HttpPaymentProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn charge(&self, invoice: &Invoice) -> Result<bool, ProviderError> {
        let body = ChargeRequest {
            invoice_id: invoice.id,
            customer_id: invoice.customer_id,
            amount: invoice.amount.value.to_string(),
            currency: invoice.amount.currency.as_str(),
        };
        let req = self
            .client
            .post(format!("{}/v1/charges", self.base_url))
            .json(&body);

        let resp: ChargeResponse = self.send(invoice, req).await?;
        Ok(resp.charged)
    }

    async fn payment_status(&self, invoice: &Invoice) -> Result<bool, ProviderError> {
        let req = self.client.get(format!(
            "{}/v1/invoices/{}/payment-status",
            self.base_url, invoice.id
        ));

        let resp: PaymentStatusResponse = self.send(invoice, req).await?;
        Ok(resp.paid)
    }
}

impl HttpPaymentProvider {
    async fn send<T: DeserializeOwned>(
        &self,
        invoice: &Invoice,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        let resp = req
            .bearer_auth(&self.api_key)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            // The provider may have acted even if we cannot read its answer.
            return resp
                .json::<T>()
                .await
                .map_err(|e| ProviderError::Network(format!("unreadable provider response: {e}")));
        }

        let body = resp.text().await.unwrap_or_default();
        Err(map_error_response(invoice, status, &body))
    }
}

pub fn map_error_response(invoice: &Invoice, status: StatusCode, body: &str) -> ProviderError {
    let payload = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let code = payload.as_ref().map(|p| p.code.as_str());

    match code {
        Some("CURRENCY_MISMATCH") => ProviderError::CurrencyMismatch {
            invoice_id: invoice.id,
            customer_id: invoice.customer_id,
        },
        Some("CUSTOMER_NOT_FOUND") => ProviderError::CustomerNotFound {
            customer_id: invoice.customer_id,
        },
        Some("INVOICE_NOT_FOUND") => ProviderError::InvoiceNotFound {
            invoice_id: invoice.id,
        },
        _ => {
            let detail = payload
                .map(|p| format!("{}: {}", p.code, p.message))
                .unwrap_or_else(|| body.chars().take(200).collect());
            let message = format!("HTTP_{} {}", status.as_u16(), detail);
            if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
                ProviderError::Network(message)
            } else {
                ProviderError::Other(message)
            }
        }
    }
}
