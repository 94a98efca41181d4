use chrono::NaiveDate;
use uuid::Uuid;

use seva_core::{GatewayError, PaymentStatus, RepoError};

/// Why an offering cannot take a direct booking at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotBookableReason {
    /// Parent categories only group subcategories
    ParentCategory,
    /// No price on the catalog entry
    Unpriced,
}

impl std::fmt::Display for NotBookableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotBookableReason::ParentCategory => {
                write!(f, "parent category, select a specific subcategory")
            }
            NotBookableReason::Unpriced => write!(f, "not available for online booking"),
        }
    }
}

/// Which online-booking gate rejected the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionReason {
    OnlineBookingDisabled,
    DirectVisitRequired,
    NotificationRequired,
}

impl RestrictionReason {
    pub fn message(&self) -> &'static str {
        match self {
            RestrictionReason::OnlineBookingDisabled => {
                "This offering is not available for online booking. Please visit the temple directly."
            }
            RestrictionReason::DirectVisitRequired => {
                "This offering requires a direct visit to the temple. Online booking not available."
            }
            RestrictionReason::NotificationRequired => {
                "This offering requires prior notification to the temple authorities."
            }
        }
    }
}

impl std::fmt::Display for RestrictionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Everything that can go wrong between a booking request and a settled
/// payment. All variants are recovered at the component boundary; only
/// `Store` is fatal to the current request.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("offering {0} not found")]
    OfferingNotFound(i32),

    #[error("booking {0} not found")]
    BookingNotFound(Uuid),

    #[error("no booking for order {0}")]
    OrderNotFound(String),

    #[error("offering {id} cannot be booked: {reason}")]
    NotBookable { id: i32, reason: NotBookableReason },

    #[error("{reason}")]
    BookingRestricted { reason: RestrictionReason },

    #[error("this offering can only be booked for {required}")]
    DateMismatch { required: NaiveDate },

    #[error("fully booked ({booked}/{capacity} participants)")]
    FullyBooked { booked: u32, capacity: u32 },

    #[error("invalid payment state transition from {from:?} to {to:?}")]
    InvalidState {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("payment gateway failure: {0}")]
    Gateway(#[from] GatewayError),

    #[error("booking store unavailable: {0}")]
    Store(#[source] RepoError),
}

impl BookingError {
    pub fn store(err: RepoError) -> Self {
        BookingError::Store(err)
    }

    /// Stable reason kind for the presentation layer.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::Validation(_) => "validation_error",
            BookingError::OfferingNotFound(_)
            | BookingError::BookingNotFound(_)
            | BookingError::OrderNotFound(_) => "not_found",
            BookingError::NotBookable { .. } => "not_bookable",
            BookingError::BookingRestricted { .. } => "booking_restricted",
            BookingError::DateMismatch { .. } => "date_error",
            BookingError::FullyBooked { .. } => "fully_booked",
            BookingError::InvalidState { .. } => "invalid_state",
            BookingError::Gateway(_) => "gateway_error",
            BookingError::Store(_) => "store_error",
        }
    }
}
