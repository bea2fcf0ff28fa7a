use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub session: SessionConfig,
    pub hostify: HostifyConfig,
    pub bokun: BokunConfig,
    pub stripe: StripeConfig,
    pub smtp: SmtpConfig,
    pub booking: BookingRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    pub admin_email: String,
    /// bcrypt hash of the back-office password.
    pub admin_password_hash: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub secret: String,
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
}

fn default_session_ttl() -> u64 {
    86_400
}

#[derive(Debug, Deserialize, Clone)]
pub struct HostifyConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BokunConfig {
    pub base_url: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    /// Connected account receiving the tour and product share of a charge.
    pub partner_account: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    /// Where guest messages and operational alerts land.
    pub admin_address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    pub currency: String,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let cfg = config::Config::builder()
            // Checked-in defaults, always present
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, selected by RUN_MODE
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Machine-local overrides, kept out of version control
            .add_source(config::File::with_name("config/local").required(false))
            // Highest precedence: COVE__SERVER__PORT=8080 sets server.port
            .add_source(config::Environment::with_prefix("COVE").separator("__"))
            .build()?;

        cfg.try_deserialize()
    }
}
