use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashfreeWebhookBody {
    pub order_id: String,
    pub payment_status: String,
    #[serde(default)]
    pub cashfree_payment_id: Option<String>,
}

/// POST /api/webhooks/cashfree: asynchronous settlement. Always answers
/// 200 so the provider stops retrying; failures are logged, and the
/// completion itself is idempotent so a duplicate delivery is harmless.
pub async fn cashfree_webhook(
    State(state): State<AppState>,
    Json(payload): Json<CashfreeWebhookBody>,
) -> (StatusCode, Json<Value>) {
    info!(
        order_id = %payload.order_id,
        payment_status = %payload.payment_status,
        "cashfree webhook received"
    );

    let outcome = match payload.payment_status.as_str() {
        "SUCCESS" => {
            let transaction_id = payload
                .cashfree_payment_id
                .unwrap_or_else(|| format!("cf_{}", Utc::now().timestamp_millis()));
            state
                .settlement
                .complete_by_order(&payload.order_id, &transaction_id)
                .await
                .map(|_| ())
        }
        "FAILED" | "USER_DROPPED" => state
            .settlement
            .fail_by_order(
                &payload.order_id,
                &format!("gateway reported {}", payload.payment_status),
            )
            .await
            .map(|_| ()),
        other => {
            warn!(payment_status = other, "ignoring unrecognized webhook status");
            Ok(())
        }
    };

    if let Err(err) = outcome {
        warn!(order_id = %payload.order_id, error = %err, "webhook settlement failed");
    }

    (StatusCode::OK, Json(json!({ "status": "success" })))
}
