use chrono::{DateTime, Utc};
use cove_core::cart::CartItem;
use cove_core::pii::Masked;
use serde::{Deserialize, Serialize};

/// Who is checking out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
}

/// Invoicing details for business bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDetails {
    pub company_name: String,
    pub tax_number: String,
}

/// The single record of a completed checkout. Orders are written once and
/// never restated; the only later touch is attaching an invoice link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Human-readable reference, e.g. CV-250704-X7KQ2M.
    pub order_id: String,
    pub guest_name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub notes: Option<String>,
    pub company: Option<CompanyDetails>,
    pub items: Vec<OrderItem>,
    /// Channel manager reservation ids, one per accommodation line.
    pub reservation_ids: Vec<i64>,
    pub reservation_references: Vec<String>,
    pub transaction_ids: Vec<i64>,
    /// Payment provider intent id for the whole cart.
    pub payment_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        order_id: String,
        contact: &ContactDetails,
        company: Option<CompanyDetails>,
        payment_id: String,
        currency: String,
    ) -> Self {
        Self {
            order_id,
            guest_name: contact.name.clone(),
            email: Masked(contact.email.clone()),
            phone: Masked(contact.phone.clone()),
            notes: contact.notes.clone(),
            company,
            items: Vec::new(),
            reservation_ids: Vec::new(),
            reservation_references: Vec::new(),
            transaction_ids: Vec::new(),
            payment_id,
            amount_minor: 0,
            currency,
            created_at: Utc::now(),
        }
    }

    /// Add a cart line to the order
    pub fn add_item(&mut self, item: OrderItem) {
        self.amount_minor += item.charged_minor;
        self.items.push(item);
    }

    /// Link an accommodation line's reservation to the order.
    pub fn add_reservation(&mut self, reservation_id: i64, reference: String) {
        self.reservation_ids.push(reservation_id);
        self.reservation_references.push(reference);
    }
}

/// A cart line as it was sold, frozen into the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub item: CartItem,
    /// What this line contributed to the charge, in minor units.
    pub charged_minor: i64,
    pub invoice_url: Option<String>,
}

impl OrderItem {
    pub fn new(item: CartItem, charged_minor: i64) -> Self {
        Self { item, charged_minor, invoice_url: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cove_core::cart::ProductItem;

    fn contact() -> ContactDetails {
        ContactDetails {
            name: "Ada Kovacs".into(),
            email: "ada@example.com".into(),
            phone: "+36 20 555 0101".into(),
            notes: None,
        }
    }

    #[test]
    fn adding_items_accumulates_the_charge() {
        let mut order = Order::new(
            "CV-250704-X7KQ2M".into(),
            &contact(),
            None,
            "pi_3Nxy".into(),
            "EUR".into(),
        );
        order.add_item(OrderItem::new(
            CartItem::Product(ProductItem { product_id: "crib".into(), price: 15.0, quantity: 1 }),
            1500,
        ));
        order.add_item(OrderItem::new(
            CartItem::Product(ProductItem { product_id: "parking".into(), price: 10.0, quantity: 2 }),
            2000,
        ));
        assert_eq!(order.amount_minor, 3500);
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn debug_prints_no_contact_details() {
        let order = Order::new(
            "CV-250704-X7KQ2M".into(),
            &contact(),
            None,
            "pi_3Nxy".into(),
            "EUR".into(),
        );
        let dump = format!("{:?}", order);
        assert!(!dump.contains("ada@example.com"));
        assert!(!dump.contains("555 0101"));
    }
}
