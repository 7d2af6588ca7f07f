//! Utilities shared by the chatrelay crates.

pub mod logger;
pub mod time;
