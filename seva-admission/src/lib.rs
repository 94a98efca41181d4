pub mod admission;
pub mod availability;
pub mod error;
pub mod locks;
pub mod settlement;

#[cfg(test)]
mod testing;

pub use admission::AdmissionService;
pub use availability::{Availability, Remaining};
pub use error::{BookingError, NotBookableReason, RestrictionReason};
pub use locks::SlotLocks;
pub use settlement::SettlementService;
