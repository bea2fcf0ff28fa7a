use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod chats;
pub mod checkout;
pub mod error;
pub mod inbox;
pub mod listings;
pub mod middleware;
pub mod session;
pub mod state;
pub mod tours;


pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Storefront routes; every response carries a valid session cookie.
    let public = Router::new()
        .merge(listings::routes())
        .merge(tours::routes())
        .merge(checkout::routes())
        .merge(bookings::routes())
        .merge(chats::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session::session_middleware,
        ));

    // Back-office routes behind the admin JWT.
    let admin = Router::new()
        .merge(admin::routes())
        .merge(inbox::routes())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin,
        ));

    Router::new()
        .merge(auth::routes())
        .merge(public)
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::resiliency::checkout_breaker_middleware,
        ))
        .with_state(state)
}
