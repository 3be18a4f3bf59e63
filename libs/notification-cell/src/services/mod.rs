pub mod inbox;
pub mod writer;
