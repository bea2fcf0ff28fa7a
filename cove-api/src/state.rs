use std::sync::Arc;

use cove_core::payment::PaymentGateway;
use cove_core::property::PropertyApi;
use cove_core::repository::{ChatRepository, GuestRepository};
use cove_core::tours::TourApi;
use cove_order::{CheckoutService, Notifier, OrderRepository};

use crate::middleware::resiliency::CircuitBreaker;

#[derive(Clone)]
pub struct AppState {
    pub property: Arc<dyn PropertyApi>,
    pub tours: Arc<dyn TourApi>,
    pub payments: Arc<dyn PaymentGateway>,
    pub orders: Arc<dyn OrderRepository>,
    pub chats: Arc<dyn ChatRepository>,
    pub guests: Arc<dyn GuestRepository>,
    pub checkout: Arc<CheckoutService>,
    pub notifier: Arc<Notifier>,
    pub auth: AuthConfig,
    pub session: SessionConfig,
    pub resiliency: Arc<ResiliencyState>,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub admin_email: String,
    pub admin_password_hash: String,
}

#[derive(Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_seconds: u64,
}

pub struct ResiliencyState {
    pub checkout_cb: CircuitBreaker,
}
