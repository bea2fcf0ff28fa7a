use cove_core::property::{Fee, StayQuote};
use serde::{Deserialize, Serialize};

/// Fee names containing this marker are treated as occupancy tax lines.
const CITY_TAX_MARKER: &str = "city tax";

pub fn is_city_tax(fee: &Fee) -> bool {
    fee.fee_name.to_lowercase().contains(CITY_TAX_MARKER)
}

/// A stay price after the city tax cap has been applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProratedStay {
    /// Chargeable total in major units, overcharged tax already deducted.
    pub total: f64,
    /// Fee lines with city tax quantities clamped to the legal cap.
    pub fees: Vec<Fee>,
    /// How much the quoted total was reduced.
    pub deducted: f64,
    pub currency: String,
}

/// Clamp city tax lines to at most `adults * nights` billable units.
///
/// Channel managers bill the tax per person-night across the whole party,
/// but only adults owe it. When a line exceeds the cap, the excess units
/// are priced at the line's unit amount and subtracted from the stay
/// total; the line itself is rescaled so quantity, net and tax stay
/// consistent with what will actually be charged.
pub fn prorate_stay(quote: &StayQuote, adults: u32, nights: u32) -> ProratedStay {
    let max_quantity = (adults as f64) * (nights as f64);
    let mut deducted = 0.0;
    let mut fees = Vec::with_capacity(quote.fees.len());

    for fee in &quote.fees {
        // The quantity > 0 check keeps the unit-amount division defined;
        // zero or negative unit counts are charged exactly as quoted.
        let over_cap = is_city_tax(fee) && fee.quantity > 0.0 && fee.quantity > max_quantity;
        if !over_cap {
            fees.push(fee.clone());
            continue;
        }

        let excess = fee.quantity - max_quantity;
        let unit_amount = fee.total / fee.quantity;
        deducted += unit_amount * excess;

        let ratio = max_quantity / fee.quantity;
        fees.push(Fee {
            quantity: max_quantity,
            total: fee.total * ratio,
            total_net: fee.total_net * ratio,
            total_tax: fee.total_tax * ratio,
            ..fee.clone()
        });
    }

    if deducted > 0.0 {
        tracing::debug!(
            listing_id = quote.listing_id,
            deducted,
            "city tax clamped to occupancy cap"
        );
    }

    ProratedStay {
        total: quote.total - deducted,
        fees,
        deducted,
        currency: quote.currency.clone(),
    }
}
