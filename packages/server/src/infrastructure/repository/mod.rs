//! Record-store implementations.

pub mod inmemory;

pub use inmemory::{
    InMemoryProfileRepository, InMemoryRoomRepository, InMemorySessionRepository,
    InMemoryUserRepository,
};
