use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cove_api::app;
use cove_api::middleware::CircuitBreaker;
use cove_api::state::{AppState, AuthConfig, ResiliencyState, SessionConfig};
use cove_order::{CheckoutService, Notifier};
use cove_store::{Config, DbClient, PgChatRepository, PgGuestRepository, PgOrderRepository};
use cove_suppliers::{BokunClient, HostifyClient, SmtpMailer, StripeGateway};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cove_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Cove API on port {}", config.server.port);

    // Postgres connection and migrations
    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Repositories
    let orders = Arc::new(PgOrderRepository::new(db.pool.clone()));
    let chats = Arc::new(PgChatRepository::new(db.pool.clone()));
    let guests = Arc::new(PgGuestRepository::new(db.pool.clone()));

    // Supplier clients
    let property = Arc::new(HostifyClient::new(
        config.hostify.base_url.clone(),
        config.hostify.api_key.clone(),
    ));
    let tours = Arc::new(BokunClient::new(
        config.bokun.base_url.clone(),
        config.bokun.access_key.clone(),
        config.bokun.secret_key.clone(),
    ));
    let payments = Arc::new(StripeGateway::new(config.stripe.secret_key.clone()));

    let mailer = Arc::new(
        SmtpMailer::new(
            &config.smtp.host,
            config.smtp.port,
            config.smtp.username.clone(),
            config.smtp.password.clone(),
            &config.smtp.from_address,
        )
        .expect("Failed to build SMTP transport"),
    );
    let notifier = Arc::new(Notifier::new(
        mailer,
        PathBuf::from(&config.booking.templates_dir),
        config.smtp.admin_address.clone(),
    ));

    let checkout = Arc::new(CheckoutService::new(
        property.clone(),
        payments.clone(),
        orders.clone(),
        chats.clone(),
        guests.clone(),
        notifier.clone(),
        config.booking.currency.clone(),
        config.stripe.partner_account.clone(),
    ));

    let app_state = AppState {
        property,
        tours,
        payments,
        orders,
        chats,
        guests,
        checkout,
        notifier,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
            admin_email: config.auth.admin_email.clone(),
            admin_password_hash: config.auth.admin_password_hash.clone(),
        },
        session: SessionConfig {
            secret: config.session.secret.clone(),
            ttl_seconds: config.session.ttl_seconds,
        },
        resiliency: Arc::new(ResiliencyState {
            checkout_cb: CircuitBreaker::new("checkout", 5, Duration::from_secs(30)),
        }),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
