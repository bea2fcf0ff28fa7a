use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Guest composition for a stay. Only adults count toward the city tax cap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuestBreakdown {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    #[serde(default)]
    pub pets: u32,
}

impl GuestBreakdown {
    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants + self.pets
    }
}

/// A single line in the checkout cart. The `type` tag matches what the
/// storefront sends: "accommodation", "tour" or "product".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartItem {
    Accommodation(AccommodationItem),
    Tour(TourItem),
    Product(ProductItem),
}

impl CartItem {
    pub fn is_accommodation(&self) -> bool {
        matches!(self, CartItem::Accommodation(_))
    }

    /// Price as shown to the guest when the item was added, in major units.
    pub fn display_price(&self) -> f64 {
        match self {
            CartItem::Accommodation(stay) => stay.front_end_price,
            CartItem::Tour(tour) => tour.price,
            CartItem::Product(product) => product.price * product.quantity as f64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccommodationItem {
    pub listing_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub guests: GuestBreakdown,
    /// Price the storefront displayed when the item entered the cart.
    /// The authoritative amount is re-quoted at checkout.
    pub front_end_price: f64,
}

impl AccommodationItem {
    pub fn nights(&self) -> u32 {
        let days = (self.end_date - self.start_date).num_days();
        days.max(0) as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourItem {
    pub activity_id: i64,
    pub date: NaiveDate,
    pub rate_id: i64,
    pub start_time_id: i64,
    /// Participant counts keyed by the supplier's pricing category id.
    pub guests: HashMap<String, u32>,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductItem {
    pub product_id: String,
    pub price: f64,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_item_tag_selects_variant() {
        let raw = r#"{
            "type": "accommodation",
            "listing_id": 40210,
            "start_date": "2025-07-04",
            "end_date": "2025-07-07",
            "adults": 2,
            "front_end_price": 420.0
        }"#;
        let item: CartItem = serde_json::from_str(raw).unwrap();
        match item {
            CartItem::Accommodation(stay) => {
                assert_eq!(stay.listing_id, 40210);
                assert_eq!(stay.nights(), 3);
                assert_eq!(stay.guests.adults, 2);
                assert_eq!(stay.guests.children, 0);
            }
            other => panic!("expected accommodation, got {:?}", other),
        }
    }

    #[test]
    fn nights_never_goes_negative() {
        let stay = AccommodationItem {
            listing_id: 1,
            start_date: NaiveDate::from_ymd_opt(2025, 7, 7).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            guests: GuestBreakdown { adults: 1, children: 0, infants: 0, pets: 0 },
            front_end_price: 0.0,
        };
        assert_eq!(stay.nights(), 0);
    }

    #[test]
    fn product_display_price_multiplies_quantity() {
        let item = CartItem::Product(ProductItem {
            product_id: "parking-pass".into(),
            price: 12.5,
            quantity: 3,
        });
        assert_eq!(item.display_price(), 37.5);
    }
}
