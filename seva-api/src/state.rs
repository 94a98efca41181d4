use std::sync::Arc;

use seva_admission::{AdmissionService, SettlementService};
use seva_core::{BookingRepository, CatalogRepository, PaymentGateway};
use seva_store::app_config::{AuthConfig, TempleConfig};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub admission: Arc<AdmissionService>,
    pub settlement: Arc<SettlementService>,
    pub gateway: Arc<dyn PaymentGateway>,
    /// Whether a live gateway is configured; false means every booking is
    /// created in manual settlement mode.
    pub gateway_live: bool,
    pub auth: AuthConfig,
    pub temple: TempleConfig,
}
