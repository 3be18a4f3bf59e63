//! Session closure: video access tokens for confirmed appointments,
//! consultant-driven completion, and the bidirectional post-session ratings.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use services::session::SessionService;
