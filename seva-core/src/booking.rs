use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// One devotee's reservation against an offering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub receipt_number: String,
    /// Correlation key for the payment gateway order
    pub order_id: String,
    pub offering_id: i32,
    pub devotee_name: String,
    pub star_sign: String,
    pub payment_method: String,
    pub requested_date: Option<NaiveDate>,
    /// Ordinal position among bookings for the offering. Provisional at
    /// admission, finalized when the payment completes.
    pub sequence_number: u32,
    pub payment_status: PaymentStatus,
    /// Price snapshot taken from the offering at admission time
    pub amount: i32,
    pub transaction_id: Option<String>,
    pub failure_reason: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// An incoming booking request, before admission.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub offering_id: i32,
    pub devotee_name: String,
    pub star_sign: String,
    pub payment_method: String,
    pub requested_date: Option<NaiveDate>,
}

/// Receipt numbers follow the temple's short format: a prefix, the last six
/// digits of the unix-millisecond clock, and a random fragment. The clock
/// digits alone wrap within the hour, so the fragment keeps the unique
/// column from rejecting a valid booking.
pub fn generate_receipt_number(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let fragment = Uuid::new_v4().simple().to_string()[..3].to_uppercase();
    format!("{}{:06}{}", prefix, millis % 1_000_000, fragment)
}

/// Gateway order ids carry the timestamp plus a random fragment so retried
/// bookings never collide.
pub fn generate_order_id() -> String {
    let fragment = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("ORDER_{}_{}", Utc::now().timestamp_millis(), fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_round_trip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PaymentStatus::parse("refunded"), None);
    }

    #[test]
    fn receipt_number_has_prefix_digits_and_fragment() {
        let receipt = generate_receipt_number("VST");
        assert!(receipt.starts_with("VST"));
        assert_eq!(receipt.len(), 12);
        assert!(receipt[3..9].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn receipt_numbers_generated_together_differ() {
        let a = generate_receipt_number("VST");
        let b = generate_receipt_number("VST");
        assert_ne!(a, b);
    }

    #[test]
    fn order_ids_are_unique() {
        let a = generate_order_id();
        let b = generate_order_id();
        assert!(a.starts_with("ORDER_"));
        assert_ne!(a, b);
    }
}
