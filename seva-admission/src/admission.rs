use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use seva_core::booking::{generate_order_id, generate_receipt_number};
use seva_core::{
    Booking, BookingRepository, BookingRequest, Capacity, CatalogRepository, Category, Offering,
    PaymentStatus,
};

use crate::availability::Availability;
use crate::error::{BookingError, NotBookableReason, RestrictionReason};
use crate::locks::SlotLocks;

/// Decides whether a booking request is admitted, assigns its sequence
/// number and persists it in pending state. Shares its slot locks with the
/// settlement service so the capacity read-then-write is serialized per
/// (offering, date) across both.
pub struct AdmissionService {
    catalog: Arc<dyn CatalogRepository>,
    bookings: Arc<dyn BookingRepository>,
    locks: Arc<SlotLocks>,
    receipt_prefix: String,
}

impl AdmissionService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        bookings: Arc<dyn BookingRepository>,
        locks: Arc<SlotLocks>,
        receipt_prefix: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            bookings,
            locks,
            receipt_prefix: receipt_prefix.into(),
        }
    }

    /// Completed-count and remaining slots for an offering, optionally
    /// scoped to a date. Read-only; runs unserialized.
    pub async fn availability(
        &self,
        offering_id: i32,
        date: Option<NaiveDate>,
    ) -> Result<Availability, BookingError> {
        let offering = self.load_offering(offering_id).await?;
        let scope = date.or(offering.bookable_date);
        let completed = self
            .bookings
            .count(offering_id, scope, Some(PaymentStatus::Completed))
            .await
            .map_err(BookingError::store)?;

        Ok(match offering.capacity {
            Capacity::Unlimited => Availability::unlimited(completed),
            Capacity::Limited(capacity) => Availability::limited(completed, capacity),
        })
    }

    /// Admit or reject a booking request. Preconditions are checked in a
    /// fixed order and short-circuit on the first failure; nothing is
    /// persisted unless every check passes.
    pub async fn admit(&self, request: &BookingRequest) -> Result<Booking, BookingError> {
        let (devotee_name, star_sign, payment_method) = validate_fields(request)?;

        let offering = self.load_offering(request.offering_id).await?;

        if offering.category == Category::Parent {
            debug!(offering_id = offering.id, "rejecting booking against parent category");
            return Err(BookingError::NotBookable {
                id: offering.id,
                reason: NotBookableReason::ParentCategory,
            });
        }

        let amount = offering.amount.ok_or(BookingError::NotBookable {
            id: offering.id,
            reason: NotBookableReason::Unpriced,
        })?;

        check_online_gates(&offering)?;

        let requested_date = check_date(&offering, request.requested_date)?;

        // Capacity check and numbering are a read-then-decide against the
        // completed count; hold the slot lock until the pending row is in.
        let _slot = self
            .locks
            .acquire(offering.id, requested_date)
            .await;

        let sequence_number = match offering.capacity {
            Capacity::Limited(capacity) => {
                let completed = self
                    .bookings
                    .count(offering.id, requested_date, Some(PaymentStatus::Completed))
                    .await
                    .map_err(BookingError::store)?;
                if completed >= capacity {
                    info!(
                        offering_id = offering.id,
                        completed, capacity, "offering fully booked"
                    );
                    return Err(BookingError::FullyBooked {
                        booked: completed,
                        capacity,
                    });
                }
                completed + 1
            }
            Capacity::Unlimited => {
                // Informational ordering only, so count every booking ever
                // admitted, whatever its payment state. Scoped to the same
                // (offering, date) domain as the capacity check, so any-day
                // offerings number per requested date.
                let total = self
                    .bookings
                    .count(offering.id, requested_date, None)
                    .await
                    .map_err(BookingError::store)?;
                total + 1
            }
        };

        let booking = Booking {
            id: Uuid::new_v4(),
            receipt_number: generate_receipt_number(&self.receipt_prefix),
            order_id: generate_order_id(),
            offering_id: offering.id,
            devotee_name,
            star_sign,
            payment_method,
            requested_date,
            sequence_number,
            payment_status: PaymentStatus::Pending,
            amount,
            transaction_id: None,
            failure_reason: None,
            completed_at: None,
            created_at: Utc::now(),
        };

        self.bookings
            .insert(&booking)
            .await
            .map_err(BookingError::store)?;

        info!(
            booking_id = %booking.id,
            offering_id = offering.id,
            sequence_number,
            "booking admitted as pending"
        );

        Ok(booking)
    }

    async fn load_offering(&self, id: i32) -> Result<Offering, BookingError> {
        self.catalog
            .find_by_id(id)
            .await
            .map_err(BookingError::store)?
            .ok_or(BookingError::OfferingNotFound(id))
    }
}

fn validate_fields(request: &BookingRequest) -> Result<(String, String, String), BookingError> {
    let devotee_name = request.devotee_name.trim();
    let star_sign = request.star_sign.trim();
    let payment_method = request.payment_method.trim();

    if devotee_name.is_empty() || star_sign.is_empty() || payment_method.is_empty() {
        return Err(BookingError::Validation(
            "all required fields must be provided".to_string(),
        ));
    }
    if devotee_name.chars().count() < 2 {
        return Err(BookingError::Validation(
            "devotee name must be at least 2 characters".to_string(),
        ));
    }

    Ok((
        devotee_name.to_string(),
        star_sign.to_string(),
        payment_method.to_string(),
    ))
}

fn check_online_gates(offering: &Offering) -> Result<(), BookingError> {
    if offering.online_booking_available {
        // The requirement flags stay informational once online booking is
        // explicitly enabled.
        return Ok(());
    }
    let reason = if offering.requires_direct_visit {
        RestrictionReason::DirectVisitRequired
    } else if offering.requires_notification {
        RestrictionReason::NotificationRequired
    } else {
        RestrictionReason::OnlineBookingDisabled
    };
    Err(BookingError::BookingRestricted { reason })
}

fn check_date(
    offering: &Offering,
    requested: Option<NaiveDate>,
) -> Result<Option<NaiveDate>, BookingError> {
    match (offering.bookable_date, requested) {
        (Some(required), Some(date)) if required == date => Ok(Some(date)),
        (Some(required), _) => Err(BookingError::DateMismatch { required }),
        (None, date) => Ok(date),
    }
}
