//! Room channel messages.
//!
//! Inbound messages are a single internally tagged enum. Outbound messages
//! are one struct per message kind, each carrying its `type` tag.

use serde::{Deserialize, Serialize};

use super::http::{RoomInfo, UserInfo};

/// `type` tag of outbound messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    RoomState,
    Log,
    AssemblyUpdate,
    Start,
    AppointmentAccept,
    AppointmentPass,
    GameplayProgress,
    GameEnd,
}

/// Messages sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Seat {
        profile_id: i64,
    },
    Withdraw,
    Start,
    AppointmentAccept,
    AppointmentPass,
    Action {
        hand_index: i64,
        arena_index: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<i64>,
    },
    StorytellingEnd,
    Queue,
    Comment {
        text: String,
    },
}

/// What caused a `gameplay_progress` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressEvent {
    ActionCheck,
    StorytellingEndNewMove,
    StorytellingEndNextStoryteller,
    Queue,
    None,
}

/// A roster entry.
///
/// Connected users who have not taken a seat are listed during assembly
/// with `id: null` and only their `creator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Profile id, `null` for an unseated user.
    pub id: Option<i64>,
    pub creator: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntryInfo {
    pub id: u64,
    pub timestamp: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentStatusInfo {
    pub holder: usize,
    /// Seconds left, one decimal.
    pub timer: f64,
}

/// Gameplay status as seen from one seat.
///
/// Per-player fields are `null` for recipients without a seat. Action fields
/// are `null` during the selection step; target fields are also `null` when
/// the action has no target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameplayStatusInfo {
    pub event: ProgressEvent,
    pub act_count: u32,
    pub round_count: u32,
    pub move_count: u32,
    pub relationship: Option<Vec<[f32; 3]>>,
    pub action_points: Option<u32>,
    pub hand: Option<Vec<String>>,
    pub arena: Vec<String>,
    pub holder: usize,
    pub step: String,
    pub action: Option<String>,
    pub keyword: Option<usize>,
    pub target: Option<usize>,
    pub holder_difficulty: Option<i32>,
    pub holder_result: Option<i8>,
    pub target_difficulty: Option<i32>,
    pub target_result: Option<i8>,
    /// Seconds left, one decimal.
    pub timer: f64,
    pub queue: Vec<usize>,
}

/// Full per-recipient snapshot, sent on join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomStateMessage {
    pub r#type: MessageType,
    pub room: RoomInfo,
    pub my_index: Option<usize>,
    pub players: Vec<PlayerInfo>,
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_status: Option<AppointmentStatusInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gameplay_status: Option<GameplayStatusInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub r#type: MessageType,
    pub log: Vec<LogEntryInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyUpdateMessage {
    pub r#type: MessageType,
    pub players: Vec<PlayerInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartMessage {
    pub r#type: MessageType,
    pub holder: usize,
    pub my_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentAcceptMessage {
    pub r#type: MessageType,
    /// Set when the start was forced by the final pass.
    pub prev_holder: Option<usize>,
    pub gameplay_status: GameplayStatusInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentPassMessage {
    pub r#type: MessageType,
    pub prev_holder: usize,
    pub next_holder: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameplayProgressMessage {
    pub r#type: MessageType,
    pub gameplay_status: GameplayStatusInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEndMessage {
    pub r#type: MessageType,
    /// The recipient's final relationship row, `null` without a seat.
    pub relationship: Option<Vec<[f32; 3]>>,
}

/// Sent only to the connection whose message was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub error: String,
}
