pub mod app_config;
pub mod booking_repo;
pub mod catalog_repo;
pub mod memory;

pub use app_config::Config;
pub use booking_repo::PgBookingRepository;
pub use catalog_repo::PgCatalogRepository;

/// Embedded sql migrations, run once at startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
