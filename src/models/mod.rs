pub mod api;
pub mod log_entry;
pub mod session;
pub mod user;
