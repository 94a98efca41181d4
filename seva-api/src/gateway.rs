use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use seva_core::{CustomerDetails, GatewayError, GatewayOrder, PaymentGateway};
use seva_store::app_config::GatewayConfig;

/// Direct HTTP client for the Cashfree payment-gateway orders API.
pub struct CashfreeClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl CashfreeClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        Ok(Self { http, config })
    }
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    order_id: &'a str,
    order_amount: i32,
    order_currency: &'a str,
    customer_details: CustomerPayload<'a>,
    order_note: &'a str,
}

#[derive(Debug, Serialize)]
struct CustomerPayload<'a> {
    customer_id: &'a str,
    customer_name: &'a str,
    customer_email: &'a str,
    customer_phone: &'a str,
}

#[derive(Debug, Deserialize)]
struct OrderEntity {
    cf_order_id: String,
    payment_session_id: String,
}

#[async_trait]
impl PaymentGateway for CashfreeClient {
    async fn create_order(
        &self,
        order_id: &str,
        amount: i32,
        customer: &CustomerDetails,
        note: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        if !self.config.is_configured() {
            return Err(GatewayError::Disabled);
        }

        let url = format!("{}/orders", self.config.base_url);
        let body = CreateOrderRequest {
            order_id,
            order_amount: amount,
            order_currency: "INR",
            customer_details: CustomerPayload {
                customer_id: &customer.customer_id,
                customer_name: &customer.name,
                customer_email: &customer.email,
                customer_phone: &customer.phone,
            },
            order_note: note,
        };

        tracing::debug!(order_id, amount, "creating cashfree order");

        let response = self
            .http
            .post(&url)
            .header("x-client-id", &self.config.client_id)
            .header("x-client-secret", &self.config.client_secret)
            .header("x-api-version", &self.config.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let entity: OrderEntity = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(GatewayOrder {
            provider_order_id: entity.cf_order_id,
            payment_session_id: entity.payment_session_id,
        })
    }
}

/// Stand-in gateway for deployments without Cashfree credentials; every
/// booking falls back to manual settlement.
pub struct ManualGateway;

#[async_trait]
impl PaymentGateway for ManualGateway {
    async fn create_order(
        &self,
        _order_id: &str,
        _amount: i32,
        _customer: &CustomerDetails,
        _note: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        Err(GatewayError::Disabled)
    }
}
