//! In-memory wiring shared by the admission and settlement tests.

use std::sync::Arc;

use seva_core::{BookingRepository, CatalogRepository, Offering};
use seva_store::memory::{InMemoryBookingStore, InMemoryCatalog};

use crate::{AdmissionService, SlotLocks};

pub fn setup(
    offerings: Vec<Offering>,
) -> (
    AdmissionService,
    Arc<dyn CatalogRepository>,
    Arc<dyn BookingRepository>,
) {
    let catalog: Arc<dyn CatalogRepository> =
        Arc::new(InMemoryCatalog::with_offerings(offerings, Vec::new()));
    let bookings: Arc<dyn BookingRepository> = Arc::new(InMemoryBookingStore::new());
    let locks = Arc::new(SlotLocks::new());
    let admission = AdmissionService::new(
        Arc::clone(&catalog),
        Arc::clone(&bookings),
        locks,
        "VST",
    );
    (admission, catalog, bookings)
}

pub mod fixtures {
    use chrono::NaiveDate;
    use seva_core::{BookingRequest, Capacity, Category, Offering};

    pub fn unlimited(id: i32, amount: i32) -> Offering {
        Offering {
            id,
            name: format!("Offering {id}"),
            name_malayalam: format!("Pooja {id}"),
            malayalam_date: "Medam 1".to_string(),
            day: "Sunday".to_string(),
            bookable_date: None,
            amount: Some(amount),
            category: Category::Regular,
            parent_key: None,
            description: None,
            description_english: None,
            capacity: Capacity::Unlimited,
            online_booking_available: true,
            requires_direct_visit: false,
            requires_notification: false,
            requires_advance_booking: false,
            requires_booking: true,
            is_comprehensive_ritual: false,
        }
    }

    pub fn limited(id: i32, amount: i32, capacity: u32) -> Offering {
        Offering {
            capacity: Capacity::Limited(capacity),
            ..unlimited(id, amount)
        }
    }

    pub fn fixed_date(id: i32, amount: i32, date: NaiveDate) -> Offering {
        Offering {
            bookable_date: Some(date),
            ..unlimited(id, amount)
        }
    }

    pub fn request(offering_id: i32, devotee_name: &str) -> BookingRequest {
        BookingRequest {
            offering_id,
            devotee_name: devotee_name.to_string(),
            star_sign: "Rohini".to_string(),
            payment_method: "upi".to_string(),
            requested_date: None,
        }
    }
}
