use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use seva_admission::BookingError;

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    AuthenticationError(String),
    AuthorizationError(String),
    NotFound(String),
    InternalServerError(String),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Booking(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Booking(err) => booking_error_response(err),
            AppError::AuthenticationError(msg) => error_response(
                StatusCode::UNAUTHORIZED,
                json!({ "status": "error", "message": msg }),
            ),
            AppError::AuthorizationError(msg) => error_response(
                StatusCode::FORBIDDEN,
                json!({ "status": "error", "message": msg }),
            ),
            AppError::NotFound(msg) => error_response(
                StatusCode::NOT_FOUND,
                json!({ "status": "error", "message": msg }),
            ),
            AppError::InternalServerError(msg) => {
                tracing::error!("internal server error: {}", msg);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "status": "error", "message": "Internal server error" }),
                )
            }
        }
    }
}

/// Every rejection carries its reason kind plus the counts/flags the
/// booking UI needs to explain it; the message text is advisory.
fn booking_error_response(err: BookingError) -> Response {
    let mut body = json!({
        "status": "error",
        "kind": err.kind(),
        "message": err.to_string(),
    });

    let status = match &err {
        BookingError::Validation(_)
        | BookingError::NotBookable { .. }
        | BookingError::BookingRestricted { .. } => StatusCode::BAD_REQUEST,
        BookingError::DateMismatch { required } => {
            body["requiredDate"] = json!(required);
            StatusCode::BAD_REQUEST
        }
        BookingError::OfferingNotFound(_)
        | BookingError::BookingNotFound(_)
        | BookingError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        BookingError::FullyBooked { booked, capacity } => {
            body["booked"] = json!(booked);
            body["capacity"] = json!(capacity);
            StatusCode::CONFLICT
        }
        BookingError::InvalidState { .. } => StatusCode::CONFLICT,
        BookingError::Gateway(_) => StatusCode::BAD_GATEWAY,
        BookingError::Store(inner) => {
            tracing::error!("booking store failure: {}", inner);
            body["message"] = json!("Internal server error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    error_response(status, body)
}

fn error_response(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}
