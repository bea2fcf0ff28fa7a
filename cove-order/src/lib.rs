pub mod checkout;
pub mod email;
pub mod models;
pub mod reference;
pub mod repository;

pub use checkout::{CheckoutError, CheckoutOutcome, CheckoutRequest, CheckoutService};
pub use email::Notifier;
pub use models::{CompanyDetails, ContactDetails, Order, OrderItem};
pub use repository::OrderRepository;
