//! Antenna room server.
//!
//! Runs independent, real-time rooms of a turn-based role-play card game.
//! Each live room is an actor that owns its gameplay state and pushes
//! per-recipient updates to every connected client over WebSocket.

// layers
pub mod domain;
pub mod game;
pub mod infrastructure;
pub mod room;
pub mod ui;
pub mod usecase;

pub mod config;
