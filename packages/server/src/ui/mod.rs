//! HTTP and WebSocket surface.

mod handler;
mod server;
mod signal;
pub mod state;

pub use handler::websocket::parse_client_message;
pub use server::{Server, build_router};
pub use state::AppState;
