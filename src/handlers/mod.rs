pub mod dashboard;
pub mod fallback;
pub mod health;
pub mod lock;
pub mod logs;
pub mod metrics;
pub mod session;
pub mod users;
