pub mod cart;
pub mod guests;
pub mod mailer;
pub mod messaging;
pub mod payment;
pub mod pii;
pub mod property;
pub mod repository;
pub mod tours;

/// Boxed error type used at the supplier and repository seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
