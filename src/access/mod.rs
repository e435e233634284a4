pub mod log_writer;
pub mod relock;
pub mod service;
