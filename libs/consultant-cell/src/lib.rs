//! Consultant directory and availability. Owns the recurring/override
//! availability templates and the slot generator that turns them into
//! bookable windows for a calendar date.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use services::availability::AvailabilityService;
