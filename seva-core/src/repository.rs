use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::booking::{Booking, PaymentStatus};
use crate::offering::{Category, Offering};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Read-only access to the offering catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Offering>, RepoError>;

    async fn list_all(&self) -> Result<Vec<Offering>, RepoError>;

    async fn list_by_category(&self, category: Category) -> Result<Vec<Offering>, RepoError>;

    /// Subcategories grouped under a parent offering's key.
    async fn find_subcategories(&self, parent_key: &str) -> Result<Vec<Offering>, RepoError>;

    /// Nakshatra names for the booking form.
    async fn list_stars(&self) -> Result<Vec<String>, RepoError>;
}

/// Filter for the admin booking listing.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub offering_id: Option<i32>,
    pub status: Option<PaymentStatus>,
    pub page: u32,
    pub limit: u32,
}

/// Booking persistence. The count + insert / count + update sequences are
/// serialized per (offering, date) by the admission component; the store
/// itself only has to be individually consistent.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Count bookings for an offering, optionally scoped to a requested
    /// date and/or a payment status.
    async fn count(
        &self,
        offering_id: i32,
        date: Option<NaiveDate>,
        status: Option<PaymentStatus>,
    ) -> Result<u32, RepoError>;

    async fn count_all(&self, status: Option<PaymentStatus>) -> Result<u32, RepoError>;

    /// Total amount across completed bookings.
    async fn completed_revenue(&self) -> Result<i64, RepoError>;

    async fn insert(&self, booking: &Booking) -> Result<(), RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, RepoError>;

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Booking>, RepoError>;

    async fn update(&self, booking: &Booking) -> Result<(), RepoError>;

    /// Completed bookings for an offering, in sequence-number order.
    async fn list_completed(&self, offering_id: i32) -> Result<Vec<Booking>, RepoError>;

    /// Most recent completed bookings across all offerings.
    async fn list_recent_completed(&self, limit: u32) -> Result<Vec<Booking>, RepoError>;

    /// Paginated listing; returns the page and the total match count.
    async fn list(&self, filter: &BookingFilter) -> Result<(Vec<Booking>, u32), RepoError>;
}
