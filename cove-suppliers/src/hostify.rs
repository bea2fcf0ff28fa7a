use async_trait::async_trait;
use chrono::NaiveDate;
use cove_core::cart::GuestBreakdown;
use cove_core::property::{
    CreatedReservation, Fee, PropertyApi, Reservation, ReservationDraft, ReservationStatus,
    StayQuote, TransactionDraft,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{require_success, SupplierError};

const SERVICE: &str = "hostify";
const PER_PAGE: u32 = 50;

/// Client for the Hostify-compatible channel manager. Authenticates with a
/// static key in the `x-api-key` header.
pub struct HostifyClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl HostifyClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self { http: Client::new(), base_url, api_key }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, SupplierError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;
        Ok(require_success(response, SERVICE).await?.json().await?)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, SupplierError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;
        Ok(require_success(response, SERVICE).await?.json().await?)
    }

    fn rejected(detail: impl Into<String>) -> SupplierError {
        SupplierError::Rejected { service: SERVICE, detail: detail.into() }
    }
}

#[async_trait]
impl PropertyApi for HostifyClient {
    async fn list_listings(
        &self,
        page: u32,
    ) -> Result<Vec<Value>, Box<dyn std::error::Error + Send + Sync>> {
        let body: ListingsResponse = self
            .get_json(&format!("/listings?page={page}&per_page={PER_PAGE}"))
            .await?;
        if !body.success {
            return Err(Self::rejected("listing page fetch refused").into());
        }
        Ok(body.listings)
    }

    async fn get_listing(
        &self,
        listing_id: i64,
    ) -> Result<Option<Value>, Box<dyn std::error::Error + Send + Sync>> {
        let body: ListingResponse = self.get_json(&format!("/listings/{listing_id}")).await?;
        // The channel manager answers success=false for unknown ids.
        if !body.success {
            return Ok(None);
        }
        Ok(body.listing)
    }

    async fn quote_stay(
        &self,
        listing_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        guests: &GuestBreakdown,
    ) -> Result<StayQuote, Box<dyn std::error::Error + Send + Sync>> {
        let body: QuoteResponse = self
            .post_json(
                "/reservations/price",
                &json!({
                    "listing_id": listing_id,
                    "start_date": start_date,
                    "end_date": end_date,
                    "guests": guests.total(),
                    "pets": guests.pets,
                }),
            )
            .await?;
        let price = match (body.success, body.price) {
            (true, Some(price)) => price,
            _ => return Err(Self::rejected(format!("no price for listing {listing_id}")).into()),
        };
        debug!(listing_id, total = price.total_price, "stay quoted");
        Ok(StayQuote {
            listing_id,
            currency: price.currency.unwrap_or_else(|| "EUR".to_string()),
            nightly_total: price.base_price,
            fees: price.fees.into_iter().map(FeeDto::into_fee).collect(),
            total: price.total_price,
        })
    }

    async fn create_reservation(
        &self,
        draft: &ReservationDraft,
    ) -> Result<CreatedReservation, Box<dyn std::error::Error + Send + Sync>> {
        let body: ReservationResponse = self
            .post_json(
                "/reservations",
                &json!({
                    "listing_id": draft.listing_id,
                    "start_date": draft.start_date,
                    "end_date": draft.end_date,
                    "name": draft.guest.name,
                    "email": draft.guest.email,
                    "phone": draft.guest.phone,
                    "adults": draft.guests.adults,
                    "children": draft.guests.children,
                    "infants": draft.guests.infants,
                    "pets": draft.guests.pets,
                    "total_price": draft.total,
                    "currency": draft.currency,
                    "note": draft.notes,
                    "status": "pending",
                    "source": "website",
                }),
            )
            .await?;
        let reservation = match (body.success, body.reservation) {
            (true, Some(reservation)) => reservation,
            _ => {
                return Err(Self::rejected(format!(
                    "reservation refused for listing {}",
                    draft.listing_id
                ))
                .into())
            }
        };
        Ok(CreatedReservation {
            reservation_id: reservation.id,
            confirmation_code: reservation.confirmation_code,
            status: ReservationStatus::parse(&reservation.status),
        })
    }

    async fn create_transaction(
        &self,
        draft: &TransactionDraft,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        let body: TransactionResponse = self
            .post_json(
                "/transactions",
                &json!({
                    "reservation_id": draft.reservation_id,
                    "amount": draft.amount,
                    "currency": draft.currency,
                    "type": draft.kind,
                    "notes": draft.notes,
                }),
            )
            .await?;
        match (body.success, body.transaction) {
            (true, Some(transaction)) => Ok(transaction.id),
            _ => Err(Self::rejected(format!(
                "transaction refused for reservation {}",
                draft.reservation_id
            ))
            .into()),
        }
    }

    async fn list_reservations(
        &self,
        page: u32,
    ) -> Result<Vec<Reservation>, Box<dyn std::error::Error + Send + Sync>> {
        let body: ReservationsResponse = self
            .get_json(&format!("/reservations?page={page}&per_page={PER_PAGE}"))
            .await?;
        if !body.success {
            return Err(Self::rejected("reservation page fetch refused").into());
        }
        Ok(body.reservations.into_iter().map(ReservationDto::into_reservation).collect())
    }

    async fn get_reservation(
        &self,
        reservation_id: i64,
    ) -> Result<Option<Reservation>, Box<dyn std::error::Error + Send + Sync>> {
        let body: SingleReservationResponse =
            self.get_json(&format!("/reservations/{reservation_id}")).await?;
        if !body.success {
            return Ok(None);
        }
        Ok(body.reservation.map(ReservationDto::into_reservation))
    }

    async fn cancel_reservation(
        &self,
        reservation_id: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let body: StatusResponse = self
            .post_json(&format!("/reservations/{reservation_id}/cancel"), &json!({}))
            .await?;
        if !body.success {
            return Err(
                Self::rejected(format!("cancel refused for reservation {reservation_id}")).into()
            );
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ListingsResponse {
    success: bool,
    #[serde(default)]
    listings: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    success: bool,
    listing: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    success: bool,
    price: Option<PriceDto>,
}

#[derive(Debug, Deserialize)]
struct PriceDto {
    base_price: f64,
    total_price: f64,
    currency: Option<String>,
    #[serde(default)]
    fees: Vec<FeeDto>,
}

#[derive(Debug, Deserialize)]
struct FeeDto {
    fee_id: Option<i64>,
    fee_name: String,
    quantity: f64,
    total: f64,
    total_net: f64,
    total_tax: f64,
    inclusive_percent: Option<f64>,
}

impl FeeDto {
    fn into_fee(self) -> Fee {
        Fee {
            fee_id: self.fee_id,
            fee_name: self.fee_name,
            quantity: self.quantity,
            total: self.total,
            total_net: self.total_net,
            total_tax: self.total_tax,
            inclusive_percent: self.inclusive_percent.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReservationResponse {
    success: bool,
    reservation: Option<CreatedReservationDto>,
}

#[derive(Debug, Deserialize)]
struct CreatedReservationDto {
    id: i64,
    confirmation_code: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    success: bool,
    transaction: Option<TransactionDto>,
}

#[derive(Debug, Deserialize)]
struct TransactionDto {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct ReservationsResponse {
    success: bool,
    #[serde(default)]
    reservations: Vec<ReservationDto>,
}

#[derive(Debug, Deserialize)]
struct SingleReservationResponse {
    success: bool,
    reservation: Option<ReservationDto>,
}

#[derive(Debug, Deserialize)]
struct ReservationDto {
    id: i64,
    confirmation_code: String,
    listing_id: i64,
    guest_name: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    status: String,
    total: f64,
    currency: Option<String>,
}

impl ReservationDto {
    fn into_reservation(self) -> Reservation {
        Reservation {
            reservation_id: self.id,
            confirmation_code: self.confirmation_code,
            listing_id: self.listing_id,
            guest_name: self.guest_name,
            check_in: self.check_in,
            check_out: self.check_out,
            status: ReservationStatus::parse(&self.status),
            total: self.total,
            currency: self.currency.unwrap_or_else(|| "EUR".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_payload_maps_into_a_stay_quote() {
        let raw = r#"{
            "success": true,
            "price": {
                "base_price": 300.0,
                "total_price": 345.0,
                "currency": "EUR",
                "fees": [
                    {
                        "fee_id": 7,
                        "fee_name": "City Tax",
                        "quantity": 9,
                        "total": 45.0,
                        "total_net": 40.0,
                        "total_tax": 5.0,
                        "inclusive_percent": null
                    }
                ]
            }
        }"#;
        let body: QuoteResponse = serde_json::from_str(raw).unwrap();
        let price = body.price.unwrap();
        assert_eq!(price.fees.len(), 1);

        let fee = price.fees.into_iter().next().unwrap().into_fee();
        assert_eq!(fee.fee_name, "City Tax");
        assert_eq!(fee.quantity, 9.0);
        assert_eq!(fee.inclusive_percent, 0.0);
    }

    #[test]
    fn reservation_payload_parses_status_strings() {
        let raw = r#"{
            "success": true,
            "reservation": {
                "id": 88101,
                "confirmation_code": "HMX0001",
                "listing_id": 40210,
                "guest_name": "Ada Kovacs",
                "check_in": "2025-07-04",
                "check_out": "2025-07-07",
                "status": "Confirmed",
                "total": 330.0,
                "currency": null
            }
        }"#;
        let body: SingleReservationResponse = serde_json::from_str(raw).unwrap();
        let reservation = body.reservation.unwrap().into_reservation();
        assert_eq!(reservation.status, ReservationStatus::Accepted);
        assert_eq!(reservation.currency, "EUR");
    }
}
