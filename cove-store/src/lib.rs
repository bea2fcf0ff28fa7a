pub mod app_config;
pub mod chat_repo;
pub mod database;
pub mod guest_repo;
pub mod order_repo;

pub use app_config::Config;
pub use chat_repo::PgChatRepository;
pub use database::DbClient;
pub use guest_repo::PgGuestRepository;
pub use order_repo::PgOrderRepository;
