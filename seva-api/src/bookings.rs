use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use seva_admission::{BookingError, NotBookableReason};
use seva_core::{Booking, BookingRequest, CustomerDetails};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    pub offering_id: i32,
    pub devotee_name: String,
    pub star_sign: String,
    pub payment_method: String,
    #[serde(default)]
    pub requested_date: Option<NaiveDate>,
}

/// POST /api/bookings: run the admission decision, then open a payment
/// session. A gateway failure is non-fatal: the booking stays pending and
/// the response switches to manual settlement mode.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(body): Json<CreateBookingBody>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let request = BookingRequest {
        offering_id: body.offering_id,
        devotee_name: body.devotee_name,
        star_sign: body.star_sign,
        payment_method: body.payment_method,
        requested_date: body.requested_date,
    };

    let booking = match state.admission.admit(&request).await {
        Ok(booking) => booking,
        Err(BookingError::NotBookable {
            id,
            reason: NotBookableReason::ParentCategory,
        }) => {
            // Parent rejections report the subcategories so the UI can
            // re-prompt.
            return parent_rejection(&state, id).await;
        }
        Err(err) => return Err(err.into()),
    };

    let customer = CustomerDetails {
        customer_id: format!("CUSTOMER_{}", Utc::now().timestamp_millis()),
        name: booking.devotee_name.clone(),
        email: "devotee@temple.example".to_string(),
        phone: "9999999999".to_string(),
    };
    let note = format!("Pooja booking for {}", booking.devotee_name);

    match state
        .gateway
        .create_order(&booking.order_id, booking.amount, &customer, &note)
        .await
    {
        Ok(order) => {
            info!(booking_id = %booking.id, order_id = %booking.order_id, "payment session opened");
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "status": "success",
                    "message": "Booking created. Please complete payment.",
                    "paymentMode": "cashfree",
                    "data": booking_summary(&booking),
                    "gatewayOrderId": order.provider_order_id,
                    "paymentSessionId": order.payment_session_id,
                })),
            ))
        }
        Err(err) => {
            // The booking is already persisted as pending; the webhook or
            // the counter can still settle it.
            warn!(booking_id = %booking.id, error = %err, "gateway unavailable, manual settlement mode");
            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "status": "success",
                    "message": "Booking created. Manual payment mode.",
                    "paymentMode": "manual",
                    "data": booking_summary(&booking),
                })),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCompleteBody {
    pub booking_id: Uuid,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// POST /api/bookings/payment-complete: client-driven settlement. Shares
/// the idempotent completion path with the webhook.
pub async fn payment_complete(
    State(state): State<AppState>,
    Json(body): Json<PaymentCompleteBody>,
) -> Result<Json<Value>, AppError> {
    let transaction_id = body
        .transaction_id
        .unwrap_or_else(|| format!("manual_{}", Utc::now().timestamp_millis()));

    let booking = state
        .settlement
        .complete(body.booking_id, &transaction_id)
        .await?;

    let offering = state
        .catalog
        .find_by_id(booking.offering_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Payment completed successfully",
        "receiptData": {
            "receiptNumber": booking.receipt_number,
            "date": Utc::now().date_naive(),
            "devotee": {
                "name": booking.devotee_name,
                "starSign": booking.star_sign,
            },
            "offering": {
                "name": offering.as_ref().map(|o| o.name.clone()),
                "nameMalayalam": offering.as_ref().map(|o| o.name_malayalam.clone()),
                "category": offering.as_ref().map(|o| o.category),
                "description": offering.as_ref().and_then(|o| o.description_english.clone()),
                "date": booking.requested_date,
                "amount": booking.amount,
            },
            "temple": {
                "name": state.temple.name,
                "address": state.temple.address,
                "phone": state.temple.phone,
            },
            "booking": {
                "bookingId": booking.id,
                "orderId": booking.order_id,
                "paymentMethod": booking.payment_method,
                "sequenceNumber": booking.sequence_number,
                "transactionId": booking.transaction_id,
            },
        }
    })))
}

/// GET /api/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking = state
        .bookings
        .find_by_id(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::Booking(BookingError::BookingNotFound(id)))?;

    Ok(Json(json!({
        "status": "success",
        "data": booking,
    })))
}

async fn parent_rejection(
    state: &AppState,
    offering_id: i32,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let offering = state
        .catalog
        .find_by_id(offering_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(AppError::Booking(BookingError::OfferingNotFound(
            offering_id,
        )))?;

    let subcategories = state
        .catalog
        .find_subcategories(&offering.name_malayalam)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok((
        StatusCode::BAD_REQUEST,
        Json(json!({
            "status": "error",
            "kind": "not_bookable",
            "message": "Cannot book a parent category. Please select a specific pooja from its subcategories.",
            "availableSubcategories": subcategories,
        })),
    ))
}

fn booking_summary(booking: &Booking) -> Value {
    json!({
        "bookingId": booking.id,
        "receiptNumber": booking.receipt_number,
        "orderId": booking.order_id,
        "offeringId": booking.offering_id,
        "sequenceNumber": booking.sequence_number,
        "amount": booking.amount,
        "paymentStatus": booking.payment_status,
    })
}
