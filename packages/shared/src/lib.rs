//! Utilities shared by the Antenna server and client binaries.

pub mod logger;
pub mod time;
