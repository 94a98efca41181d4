pub mod booking;
pub mod offering;
pub mod payment;
pub mod repository;

pub use booking::{Booking, BookingRequest, PaymentStatus};
pub use offering::{Capacity, Category, Offering};
pub use payment::{CustomerDetails, GatewayError, GatewayOrder, PaymentGateway};
pub use repository::{BookingFilter, BookingRepository, CatalogRepository, RepoError};
