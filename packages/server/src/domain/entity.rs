//! Entities backed by the record stores.

use super::value_object::{Nickname, ProfileId, RoomId, Timestamp, TraitStats, UserId};

/// A registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub nickname: Nickname,
}

impl User {
    pub fn new(id: UserId, nickname: Nickname) -> Self {
        Self { id, nickname }
    }
}

/// A character profile a user can take a seat with.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: ProfileId,
    pub creator: UserId,
    /// Free-form character sheet, stored as JSON and echoed back verbatim.
    pub details: serde_json::Value,
    pub stats: TraitStats,
    pub traits: Vec<String>,
}

impl Profile {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.creator == user_id
    }
}

/// Fields needed to create a profile; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub creator: UserId,
    pub details: serde_json::Value,
    pub stats: TraitStats,
    pub traits: Vec<String>,
}

/// Persisted identity and metadata of a game session.
///
/// Independent of whether a live game room currently exists for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub creator: UserId,
    pub created_at: Timestamp,
    pub title: String,
    pub tags: Vec<String>,
    pub description: String,
}

impl Room {
    pub fn is_created_by(&self, user_id: UserId) -> bool {
        self.creator == user_id
    }
}

/// Fields needed to create a room; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    pub creator: UserId,
    pub created_at: Timestamp,
    pub title: String,
    pub tags: Vec<String>,
    pub description: String,
}
