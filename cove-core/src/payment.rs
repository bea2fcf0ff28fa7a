use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::pii::Masked;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    RequiresPaymentMethod,
    RequiresAction,
    Processing,
    Succeeded,
    Canceled,
    Failed,
}

impl PaymentStatus {
    /// Map the provider's intent status string.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "requires_payment_method" | "requires_confirmation" => {
                PaymentStatus::RequiresPaymentMethod
            }
            "requires_action" | "requires_capture" => PaymentStatus::RequiresAction,
            "processing" => PaymentStatus::Processing,
            "succeeded" => PaymentStatus::Succeeded,
            "canceled" => PaymentStatus::Canceled,
            _ => PaymentStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Portion of the charge routed to a second connected account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSplit {
    pub destination_account: String,
    pub amount_minor: i64,
}

/// Request to open a payment intent for a whole cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntent {
    /// Grand total in minor units (cents).
    pub amount_minor: i64,
    pub currency: String,
    pub customer: CustomerDetails,
    pub billing: Option<BillingAddress>,
    /// Channel manager reservation ids covered by this charge.
    pub reservation_ids: Vec<i64>,
    /// Tour activity ids covered by this charge.
    pub activity_ids: Vec<i64>,
    pub split: Option<TransferSplit>,
}

/// Provider response for a freshly created intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedIntent {
    pub intent_id: String,
    pub client_secret: String,
    pub customer_id: String,
    pub status: PaymentStatus,
}

/// Read-back view of an intent (admin payment status checks).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentStatus {
    pub intent_id: String,
    pub status: PaymentStatus,
    pub amount_minor: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a customer and a payment intent, returning the client secret
    /// the storefront needs to confirm the charge.
    async fn create_intent(
        &self,
        request: &CreateIntent,
    ) -> Result<IssuedIntent, Box<dyn std::error::Error + Send + Sync>>;

    /// Retrieve intent status.
    async fn get_intent(
        &self,
        intent_id: &str,
    ) -> Result<IntentStatus, Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_covers_provider_strings() {
        assert_eq!(PaymentStatus::parse("succeeded"), PaymentStatus::Succeeded);
        assert_eq!(
            PaymentStatus::parse("requires_payment_method"),
            PaymentStatus::RequiresPaymentMethod
        );
        assert_eq!(PaymentStatus::parse("processing"), PaymentStatus::Processing);
        assert_eq!(PaymentStatus::parse("canceled"), PaymentStatus::Canceled);
        assert_eq!(PaymentStatus::parse("something_else"), PaymentStatus::Failed);
    }
}
