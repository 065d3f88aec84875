pub mod booking;
pub mod breaker;
pub mod client;
pub mod publisher;
pub mod repository;
