//! In-memory repository implementations, used by the test suites and for
//! running the server against seed data without a database.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use seva_core::{
    Booking, BookingFilter, BookingRepository, CatalogRepository, Category, Offering,
    PaymentStatus, RepoError,
};

pub struct InMemoryCatalog {
    offerings: RwLock<HashMap<i32, Offering>>,
    stars: Vec<String>,
}

impl InMemoryCatalog {
    pub fn with_offerings(offerings: Vec<Offering>, stars: Vec<String>) -> Self {
        Self {
            offerings: RwLock::new(offerings.into_iter().map(|o| (o.id, o)).collect()),
            stars,
        }
    }

    pub fn insert(&self, offering: Offering) {
        self.offerings
            .write()
            .expect("catalog lock poisoned")
            .insert(offering.id, offering);
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn find_by_id(&self, id: i32) -> Result<Option<Offering>, RepoError> {
        Ok(self
            .offerings
            .read()
            .expect("catalog lock poisoned")
            .get(&id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Offering>, RepoError> {
        let mut all: Vec<Offering> = self
            .offerings
            .read()
            .expect("catalog lock poisoned")
            .values()
            .cloned()
            .collect();
        all.sort_by_key(|o| o.id);
        Ok(all)
    }

    async fn list_by_category(&self, category: Category) -> Result<Vec<Offering>, RepoError> {
        let mut matches: Vec<Offering> = self
            .offerings
            .read()
            .expect("catalog lock poisoned")
            .values()
            .filter(|o| o.category == category)
            .cloned()
            .collect();
        matches.sort_by_key(|o| o.id);
        Ok(matches)
    }

    async fn find_subcategories(&self, parent_key: &str) -> Result<Vec<Offering>, RepoError> {
        let mut matches: Vec<Offering> = self
            .offerings
            .read()
            .expect("catalog lock poisoned")
            .values()
            .filter(|o| o.parent_key.as_deref() == Some(parent_key))
            .cloned()
            .collect();
        matches.sort_by_key(|o| o.id);
        Ok(matches)
    }

    async fn list_stars(&self) -> Result<Vec<String>, RepoError> {
        Ok(self.stars.clone())
    }
}

#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(
        booking: &Booking,
        offering_id: i32,
        date: Option<NaiveDate>,
        status: Option<PaymentStatus>,
    ) -> bool {
        booking.offering_id == offering_id
            && date.is_none_or(|d| booking.requested_date == Some(d))
            && status.is_none_or(|s| booking.payment_status == s)
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingStore {
    async fn count(
        &self,
        offering_id: i32,
        date: Option<NaiveDate>,
        status: Option<PaymentStatus>,
    ) -> Result<u32, RepoError> {
        Ok(self
            .bookings
            .read()
            .expect("booking lock poisoned")
            .values()
            .filter(|b| Self::matches(b, offering_id, date, status))
            .count() as u32)
    }

    async fn count_all(&self, status: Option<PaymentStatus>) -> Result<u32, RepoError> {
        Ok(self
            .bookings
            .read()
            .expect("booking lock poisoned")
            .values()
            .filter(|b| status.is_none_or(|s| b.payment_status == s))
            .count() as u32)
    }

    async fn completed_revenue(&self) -> Result<i64, RepoError> {
        Ok(self
            .bookings
            .read()
            .expect("booking lock poisoned")
            .values()
            .filter(|b| b.payment_status == PaymentStatus::Completed)
            .map(|b| b.amount as i64)
            .sum())
    }

    async fn insert(&self, booking: &Booking) -> Result<(), RepoError> {
        let mut map = self.bookings.write().expect("booking lock poisoned");
        if map.contains_key(&booking.id) {
            return Err(format!("duplicate booking id {}", booking.id).into());
        }
        map.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        Ok(self
            .bookings
            .read()
            .expect("booking lock poisoned")
            .get(&id)
            .cloned())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Booking>, RepoError> {
        Ok(self
            .bookings
            .read()
            .expect("booking lock poisoned")
            .values()
            .find(|b| b.order_id == order_id)
            .cloned())
    }

    async fn update(&self, booking: &Booking) -> Result<(), RepoError> {
        let mut map = self.bookings.write().expect("booking lock poisoned");
        match map.get_mut(&booking.id) {
            Some(existing) => {
                *existing = booking.clone();
                Ok(())
            }
            None => Err(format!("booking {} does not exist", booking.id).into()),
        }
    }

    async fn list_completed(&self, offering_id: i32) -> Result<Vec<Booking>, RepoError> {
        let mut completed: Vec<Booking> = self
            .bookings
            .read()
            .expect("booking lock poisoned")
            .values()
            .filter(|b| {
                b.offering_id == offering_id && b.payment_status == PaymentStatus::Completed
            })
            .cloned()
            .collect();
        completed.sort_by_key(|b| b.sequence_number);
        Ok(completed)
    }

    async fn list_recent_completed(&self, limit: u32) -> Result<Vec<Booking>, RepoError> {
        let mut completed: Vec<Booking> = self
            .bookings
            .read()
            .expect("booking lock poisoned")
            .values()
            .filter(|b| b.payment_status == PaymentStatus::Completed)
            .cloned()
            .collect();
        completed.sort_by_key(|b| std::cmp::Reverse(b.created_at));
        completed.truncate(limit as usize);
        Ok(completed)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<(Vec<Booking>, u32), RepoError> {
        let mut matches: Vec<Booking> = self
            .bookings
            .read()
            .expect("booking lock poisoned")
            .values()
            .filter(|b| {
                filter.offering_id.is_none_or(|id| b.offering_id == id)
                    && filter.status.is_none_or(|s| b.payment_status == s)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|b| std::cmp::Reverse(b.created_at));

        let total = matches.len() as u32;
        let limit = filter.limit.max(1) as usize;
        let skip = (filter.page.max(1) as usize - 1) * limit;
        let page: Vec<Booking> = matches.into_iter().skip(skip).take(limit).collect();
        Ok((page, total))
    }
}
