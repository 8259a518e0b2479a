//! In-memory record stores.
//!
//! Each store keeps its records in a `HashMap` behind a `tokio::sync::Mutex`
//! and assigns sequential ids starting at 1. Everything is lost on restart.

mod profile;
mod room;
mod session;
mod user;

pub use profile::InMemoryProfileRepository;
pub use room::InMemoryRoomRepository;
pub use session::InMemorySessionRepository;
pub use user::InMemoryUserRepository;
