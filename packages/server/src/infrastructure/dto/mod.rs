//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `websocket`: room channel messages, both directions
//! - `http`: HTTP API requests and responses, and the resource
//!   representations shared with the room channel

pub mod conversion;
pub mod http;
pub mod websocket;
