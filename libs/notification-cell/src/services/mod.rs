pub mod listener;
pub mod log_store;
pub mod notification;
