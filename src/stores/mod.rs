pub mod client;
pub mod memory_store;
pub mod session_store;
