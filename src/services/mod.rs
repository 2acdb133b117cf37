//! Business services

pub mod auth;
pub mod lifecycle;

pub use auth::AuthService;
pub use lifecycle::LifecycleService;
