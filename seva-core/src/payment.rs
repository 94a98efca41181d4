use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Customer identity passed to the payment provider.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A payment session opened with the provider for one booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Provider-side order id (e.g. cf_order_id)
    pub provider_order_id: String,
    /// Token the front-end uses to launch the checkout
    pub payment_session_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway not configured")]
    Disabled,

    #[error("gateway http error: {0}")]
    Http(String),

    #[error("gateway rejected order: status={status} body={body}")]
    Api { status: u16, body: String },

    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),
}

/// Outbound interface to the payment provider. A failure here is never
/// fatal to the booking: it stays pending and is settled later, either by
/// the provider webhook or manually.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        order_id: &str,
        amount: i32,
        customer: &CustomerDetails,
        note: &str,
    ) -> Result<GatewayOrder, GatewayError>;
}
