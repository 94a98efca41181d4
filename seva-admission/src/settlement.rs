use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use seva_core::{Booking, BookingRepository, Capacity, CatalogRepository, PaymentStatus};

use crate::error::BookingError;
use crate::locks::SlotLocks;

/// Transitions bookings between pending, completed and failed payment
/// states, idempotently. The webhook path and the client-driven path both
/// land here; whichever arrives first wins and the second is a no-op.
pub struct SettlementService {
    catalog: Arc<dyn CatalogRepository>,
    bookings: Arc<dyn BookingRepository>,
    locks: Arc<SlotLocks>,
}

impl SettlementService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        bookings: Arc<dyn BookingRepository>,
        locks: Arc<SlotLocks>,
    ) -> Self {
        Self {
            catalog,
            bookings,
            locks,
        }
    }

    pub async fn complete(
        &self,
        booking_id: Uuid,
        transaction_id: &str,
    ) -> Result<Booking, BookingError> {
        let booking = self.load(booking_id).await?;
        self.complete_booking(booking, transaction_id).await
    }

    /// Webhook path: the gateway reports on its order id, not our booking
    /// id.
    pub async fn complete_by_order(
        &self,
        order_id: &str,
        transaction_id: &str,
    ) -> Result<Booking, BookingError> {
        let booking = self.load_by_order(order_id).await?;
        self.complete_booking(booking, transaction_id).await
    }

    pub async fn fail(&self, booking_id: Uuid, reason: &str) -> Result<Booking, BookingError> {
        let booking = self.load(booking_id).await?;
        self.fail_booking(booking, reason).await
    }

    pub async fn fail_by_order(
        &self,
        order_id: &str,
        reason: &str,
    ) -> Result<Booking, BookingError> {
        let booking = self.load_by_order(order_id).await?;
        self.fail_booking(booking, reason).await
    }

    /// Completion is the only mutation that affects the capacity
    /// invariant, so the completed-count check and the status flip run
    /// under the same per-slot lock the admission check uses.
    async fn complete_booking(
        &self,
        booking: Booking,
        transaction_id: &str,
    ) -> Result<Booking, BookingError> {
        match booking.payment_status {
            PaymentStatus::Completed => {
                debug!(booking_id = %booking.id, "payment already settled, no-op");
                return Ok(booking);
            }
            PaymentStatus::Failed => {
                return Err(BookingError::InvalidState {
                    from: PaymentStatus::Failed,
                    to: PaymentStatus::Completed,
                });
            }
            PaymentStatus::Pending => {}
        }

        let _slot = self
            .locks
            .acquire(booking.offering_id, booking.requested_date)
            .await;

        // Re-read under the lock; the other settlement path may have won.
        let mut booking = self.load(booking.id).await?;
        match booking.payment_status {
            PaymentStatus::Completed => return Ok(booking),
            PaymentStatus::Failed => {
                return Err(BookingError::InvalidState {
                    from: PaymentStatus::Failed,
                    to: PaymentStatus::Completed,
                });
            }
            PaymentStatus::Pending => {}
        }

        let offering = self
            .catalog
            .find_by_id(booking.offering_id)
            .await
            .map_err(BookingError::store)?
            .ok_or(BookingError::OfferingNotFound(booking.offering_id))?;

        let completed = self
            .bookings
            .count(
                booking.offering_id,
                booking.requested_date,
                Some(PaymentStatus::Completed),
            )
            .await
            .map_err(BookingError::store)?;

        if let Capacity::Limited(capacity) = offering.capacity {
            if completed >= capacity {
                // Over-admitted pendings lose the race here; the booking
                // stays pending and is eligible for failure or refund.
                warn!(
                    booking_id = %booking.id,
                    offering_id = offering.id,
                    completed,
                    capacity,
                    "completion would exceed capacity"
                );
                return Err(BookingError::FullyBooked {
                    booked: completed,
                    capacity,
                });
            }
            // The admission-time number was provisional; stamping
            // completed + 1 here is what keeps numbers unique among
            // completed bookings.
            booking.sequence_number = completed + 1;
        }

        booking.payment_status = PaymentStatus::Completed;
        booking.transaction_id = Some(transaction_id.to_string());
        booking.completed_at = Some(Utc::now());

        self.bookings
            .update(&booking)
            .await
            .map_err(BookingError::store)?;

        info!(
            booking_id = %booking.id,
            offering_id = booking.offering_id,
            sequence_number = booking.sequence_number,
            transaction_id,
            "payment completed"
        );

        Ok(booking)
    }

    async fn fail_booking(
        &self,
        booking: Booking,
        reason: &str,
    ) -> Result<Booking, BookingError> {
        match booking.payment_status {
            PaymentStatus::Failed => {
                debug!(booking_id = %booking.id, "payment already failed, no-op");
                return Ok(booking);
            }
            PaymentStatus::Completed => {
                return Err(BookingError::InvalidState {
                    from: PaymentStatus::Completed,
                    to: PaymentStatus::Failed,
                });
            }
            PaymentStatus::Pending => {}
        }

        let _slot = self
            .locks
            .acquire(booking.offering_id, booking.requested_date)
            .await;

        // Re-read under the lock; a completion may have won since the
        // pre-check and must not be overwritten with a stale copy.
        let mut booking = self.load(booking.id).await?;
        match booking.payment_status {
            PaymentStatus::Failed => return Ok(booking),
            PaymentStatus::Completed => {
                return Err(BookingError::InvalidState {
                    from: PaymentStatus::Completed,
                    to: PaymentStatus::Failed,
                });
            }
            PaymentStatus::Pending => {}
        }

        booking.payment_status = PaymentStatus::Failed;
        booking.failure_reason = Some(reason.to_string());

        self.bookings
            .update(&booking)
            .await
            .map_err(BookingError::store)?;

        info!(booking_id = %booking.id, reason, "payment failed");

        // The sequence number is retired with the booking; a devotee who
        // retries starts a fresh booking with a fresh number.
        Ok(booking)
    }

    async fn load(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.bookings
            .find_by_id(id)
            .await
            .map_err(BookingError::store)?
            .ok_or(BookingError::BookingNotFound(id))
    }

    async fn load_by_order(&self, order_id: &str) -> Result<Booking, BookingError> {
        self.bookings
            .find_by_order_id(order_id)
            .await
            .map_err(BookingError::store)?
            .ok_or_else(|| BookingError::OrderNotFound(order_id.to_string()))
    }
}
