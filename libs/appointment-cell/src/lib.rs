//! Booking lifecycle: appointment creation, the status state machine with
//! role-gated transitions, list/detail reads scoped to the parties, and the
//! per-month calendar view.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use services::booking::BookingService;
