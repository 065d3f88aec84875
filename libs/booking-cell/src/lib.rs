pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::appointment_routes;
pub use services::booking::BookingService;
pub use services::breaker::{BreakerState, CircuitBreaker, CircuitBreakerConfig};
pub use services::client::{AvailabilityPort, RemoteAvailabilityClient};
pub use services::publisher::AppointmentEventPublisher;
pub use services::repository::{AppointmentRepository, InMemoryAppointmentRepository};
