//! Reminder sweep: a fixed-interval background loop that finds confirmed
//! appointments whose start time is exactly one configured lead time away and
//! fans out in-app notifications plus best-effort emails to both parties.

pub mod services;

pub use services::sweeper::ReminderService;
