use std::net::SocketAddr;
use std::sync::Arc;

use seva_admission::{AdmissionService, SettlementService, SlotLocks};
use seva_api::{app, gateway::CashfreeClient, gateway::ManualGateway, AppState};
use seva_core::PaymentGateway;
use seva_store::{PgBookingRepository, PgCatalogRepository};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seva_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = seva_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting {} API on port {}", config.temple.name, config.server.port);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    seva_store::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let catalog: Arc<dyn seva_core::CatalogRepository> =
        Arc::new(PgCatalogRepository::new(pool.clone()));
    let bookings: Arc<dyn seva_core::BookingRepository> =
        Arc::new(PgBookingRepository::new(pool));

    // Admission and settlement must share one lock table so a completion
    // and an admission for the same slot never interleave.
    let locks = Arc::new(SlotLocks::new());
    let admission = Arc::new(AdmissionService::new(
        catalog.clone(),
        bookings.clone(),
        locks.clone(),
        config.temple.receipt_prefix.clone(),
    ));
    let settlement = Arc::new(SettlementService::new(
        catalog.clone(),
        bookings.clone(),
        locks,
    ));

    let (gateway, gateway_live): (Arc<dyn PaymentGateway>, bool) =
        if config.gateway.is_configured() {
            match CashfreeClient::new(config.gateway.clone()) {
                Ok(client) => {
                    tracing::info!("Cashfree gateway enabled ({})", config.gateway.base_url);
                    (Arc::new(client), true)
                }
                Err(e) => {
                    tracing::warn!("Gateway init failed, falling back to manual mode: {e}");
                    (Arc::new(ManualGateway), false)
                }
            }
        } else {
            tracing::info!("No payment gateway configured, running in manual mode");
            (Arc::new(ManualGateway), false)
        };

    let app_state = AppState {
        catalog,
        bookings,
        admission,
        settlement,
        gateway,
        gateway_live,
        auth: config.auth.clone(),
        temple: config.temple.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
