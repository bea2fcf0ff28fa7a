use async_trait::async_trait;
use cove_core::payment::{CreateIntent, IntentStatus, IssuedIntent, PaymentGateway, PaymentStatus};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::{require_success, SupplierError};

const SERVICE: &str = "stripe";
const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

/// Card payment gateway. Talks to the provider's form-encoded REST API
/// with the secret key as a bearer token.
pub struct StripeGateway {
    http: Client,
    base_url: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(secret_key: String) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), secret_key)
    }

    pub fn with_base_url(base_url: String, secret_key: String) -> Self {
        Self { http: Client::new(), base_url, secret_key }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Form fields for the customer record backing an intent.
    fn customer_params(request: &CreateIntent) -> Vec<(String, String)> {
        let mut params = vec![
            ("name".to_string(), request.customer.name.clone()),
            ("email".to_string(), request.customer.email.0.clone()),
            ("phone".to_string(), request.customer.phone.0.clone()),
        ];
        if let Some(billing) = &request.billing {
            params.push(("address[line1]".to_string(), billing.line1.clone()));
            if let Some(line2) = &billing.line2 {
                params.push(("address[line2]".to_string(), line2.clone()));
            }
            params.push(("address[city]".to_string(), billing.city.clone()));
            params.push(("address[postal_code]".to_string(), billing.postal_code.clone()));
            params.push(("address[country]".to_string(), billing.country.clone()));
        }
        params
    }

    /// Form fields for the payment intent itself. Reservation and activity
    /// ids ride along as metadata so a charge can always be traced back.
    fn intent_params(request: &CreateIntent, customer_id: &str) -> Vec<(String, String)> {
        let mut params = vec![
            ("amount".to_string(), request.amount_minor.to_string()),
            ("currency".to_string(), request.currency.to_lowercase()),
            ("customer".to_string(), customer_id.to_string()),
            ("automatic_payment_methods[enabled]".to_string(), "true".to_string()),
        ];
        if !request.reservation_ids.is_empty() {
            params.push((
                "metadata[reservation_ids]".to_string(),
                request
                    .reservation_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            ));
        }
        if !request.activity_ids.is_empty() {
            params.push((
                "metadata[activity_ids]".to_string(),
                request.activity_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(","),
            ));
        }
        if let Some(split) = &request.split {
            params.push(("transfer_data[destination]".to_string(), split.destination_account.clone()));
            params.push(("transfer_data[amount]".to_string(), split.amount_minor.to_string()));
        }
        params
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, SupplierError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.secret_key)
            .form(params)
            .send()
            .await?;
        Ok(require_success(response, SERVICE).await?.json().await?)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        request: &CreateIntent,
    ) -> Result<IssuedIntent, Box<dyn std::error::Error + Send + Sync>> {
        let customer: CustomerDto =
            self.post_form("/v1/customers", &Self::customer_params(request)).await?;
        let intent: IntentDto = self
            .post_form("/v1/payment_intents", &Self::intent_params(request, &customer.id))
            .await?;
        let client_secret = intent.client_secret.ok_or(SupplierError::Rejected {
            service: SERVICE,
            detail: "intent created without a client secret".into(),
        })?;
        info!(
            intent = %intent.id,
            amount_minor = request.amount_minor,
            "payment intent opened"
        );
        Ok(IssuedIntent {
            intent_id: intent.id,
            client_secret,
            customer_id: customer.id,
            status: PaymentStatus::parse(&intent.status),
        })
    }

    async fn get_intent(
        &self,
        intent_id: &str,
    ) -> Result<IntentStatus, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .get(self.endpoint(&format!("/v1/payment_intents/{intent_id}")))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        let intent: IntentDto = require_success(response, SERVICE).await?.json().await?;
        Ok(IntentStatus {
            intent_id: intent.id,
            status: PaymentStatus::parse(&intent.status),
            amount_minor: intent.amount,
            currency: intent.currency.to_uppercase(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CustomerDto {
    id: String,
}

#[derive(Debug, Deserialize)]
struct IntentDto {
    id: String,
    status: String,
    amount: i64,
    currency: String,
    client_secret: Option<String>,
}
