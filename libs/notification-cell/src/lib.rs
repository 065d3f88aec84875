pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::notification_routes;
pub use services::listener::NotificationListener;
pub use services::log_store::NotificationLogStore;
pub use services::notification::{NotificationSender, NotificationService, SimulatedSender};
