//! Per-user notification inbox. Other cells append entries through
//! [`NotificationWriter`]; clients read and mark them through the router.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::Notification;
pub use services::writer::NotificationWriter;
