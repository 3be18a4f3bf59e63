pub mod booking;
pub mod calendar;
pub mod lifecycle;
