//! Terminal client for Antenna room channels.

pub mod command;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;

pub use runner::run_client;
