pub mod amount;
pub mod prorate;

pub use amount::{cart_total_minor, extra_minor, extras_minor, to_minor};
pub use prorate::{prorate_stay, ProratedStay};
