use cove_core::cart::CartItem;

/// Convert a major-unit amount to minor units (cents), rounding halves up.
pub fn to_minor(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Minor-unit charge for a non-accommodation cart line. Stays are priced
/// through their channel manager quote instead and contribute zero here.
pub fn extra_minor(item: &CartItem) -> i64 {
    match item {
        CartItem::Accommodation(_) => 0,
        CartItem::Tour(tour) => to_minor(tour.price),
        CartItem::Product(product) => to_minor(product.price * product.quantity as f64),
    }
}

/// Minor-unit total of the non-accommodation lines in a cart.
pub fn extras_minor(items: &[CartItem]) -> i64 {
    items.iter().map(extra_minor).sum()
}

/// Chargeable grand total for a cart whose stays have already been priced.
/// `accommodation` is the minor-unit sum of the priced stays, converted per
/// stay so rounding matches what the channel manager was told.
pub fn cart_total_minor(accommodation: i64, items: &[CartItem]) -> i64 {
    accommodation + extras_minor(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cove_core::cart::{ProductItem, TourItem};
    use std::collections::HashMap;

    fn tour(price: f64) -> CartItem {
        CartItem::Tour(TourItem {
            activity_id: 9921,
            date: chrono::NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
            rate_id: 1,
            start_time_id: 3,
            guests: HashMap::from([("ADT".to_string(), 2)]),
            price,
        })
    }

    #[test]
    fn minor_units_round_to_the_nearest_cent() {
        assert_eq!(to_minor(330.0), 33000);
        assert_eq!(to_minor(26.666666666666664), 2667);
        assert_eq!(to_minor(0.004), 0);
    }

    #[test]
    fn cart_without_stays_totals_only_its_extras() {
        let items = vec![tour(89.9)];
        assert_eq!(extras_minor(&items), 8990);
        assert_eq!(cart_total_minor(0, &items), 8990);
    }

    #[test]
    fn per_item_conversion_differs_from_converting_the_sum() {
        // Halves round away from zero per stay, so stays must be converted
        // before summing rather than summed and converted once.
        assert_eq!(to_minor(330.005) + to_minor(99.995), 43001);
        assert_eq!(to_minor(330.005 + 99.995), 43000);
    }

    #[test]
    fn product_lines_multiply_quantity_before_conversion() {
        let item = CartItem::Product(ProductItem {
            product_id: "late-checkout".into(),
            price: 17.5,
            quantity: 2,
        });
        assert_eq!(extra_minor(&item), 3500);
    }
}
