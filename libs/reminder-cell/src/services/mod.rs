pub mod mailer;
pub mod schedule;
pub mod sweeper;
