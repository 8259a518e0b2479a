//! Per-room actor: live rooms, their connections and their control loops.

pub mod broadcast;
mod control;
pub mod directory;
pub mod game_room;
pub mod registry;

pub use broadcast::RoomInner;
pub use directory::RoomDirectory;
pub use game_room::{GameRoom, InboundMessage, RoomContext, RoomSignal};
pub use registry::{ConnectionId, ConnectionRegistry, OutboundFrame, OutboundReceiver, OutboundSender};
