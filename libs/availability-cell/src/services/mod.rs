pub mod availability;
pub mod generator;
pub mod store;
