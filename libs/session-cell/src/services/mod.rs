pub mod session;
pub mod video;
