//! The live instance of a room.
//!
//! A `GameRoom` is a handle: the state behind its lock is mutated by the
//! control loop (gameplay) and by connection admission (registry only).
//! Everything else talks to the loop through its two queues.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use antenna_shared::time::Clock;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, mpsc};

use crate::{
    config::GameTimings,
    domain::{ProfileRepository, Room, RoomId, Timestamp, User, UserId},
    game::{CardCatalog, DeadlineFired},
    infrastructure::dto::websocket::ClientMessage,
};

use super::{
    broadcast::RoomInner,
    registry::{ConnectionId, OutboundFrame, OutboundSender, next_connection_id},
};

/// Capacity of the inbound message queue of one room.
pub const INBOUND_QUEUE_SIZE: usize = 64;

/// Collaborators shared by every room.
#[derive(Clone)]
pub struct RoomContext {
    pub profiles: Arc<dyn ProfileRepository>,
    pub catalog: Arc<CardCatalog>,
    pub timings: GameTimings,
    pub clock: Arc<dyn Clock>,
    /// Fixed seed for the gameplay random source, for reproducible rooms.
    pub seed: Option<u64>,
}

impl RoomContext {
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_unix_secs())
    }
}

impl fmt::Debug for RoomContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomContext")
            .field("timings", &self.timings)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

/// A client frame forwarded by an inbound pump.
///
/// `message` is `Err` for well-formed JSON that is not a known message.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub user_id: UserId,
    pub message: Result<ClientMessage, String>,
}

/// Internal events processed by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomSignal {
    NewConn {
        user_id: UserId,
        conn_id: ConnectionId,
    },
    LostConn {
        user_id: UserId,
        conn_id: ConnectionId,
    },
    Deadline(DeadlineFired),
}

pub struct GameRoom {
    id: RoomId,
    creator_id: UserId,
    inner: RwLock<RoomInner>,
    inbound: mpsc::Sender<InboundMessage>,
    signals: mpsc::UnboundedSender<RoomSignal>,
    closed: AtomicBool,
}

impl GameRoom {
    pub(super) fn new(
        room: Room,
        inner: RoomInner,
        inbound: mpsc::Sender<InboundMessage>,
        signals: mpsc::UnboundedSender<RoomSignal>,
    ) -> Self {
        Self {
            id: room.id,
            creator_id: room.creator,
            inner: RwLock::new(inner),
            inbound,
            signals,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn creator_id(&self) -> UserId {
        self.creator_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(super) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, RoomInner> {
        self.inner.read().await
    }

    pub(super) async fn write(&self) -> RwLockWriteGuard<'_, RoomInner> {
        self.inner.write().await
    }

    /// Register a connection for `user` and queue the room snapshot to it.
    ///
    /// A previous connection of the same user is told to close. The roster
    /// update for everyone else is sent by the control loop. A connection to
    /// a room that has already closed is told to close and never registered.
    pub async fn join(&self, user: User, sender: OutboundSender) -> ConnectionId {
        let user_id = user.id;
        let mut inner = self.inner.write().await;
        if self.is_closed() {
            tracing::info!("Room {}: user {} joined after close", self.id, user_id);
            let _ = sender.send(OutboundFrame::Close);
            return next_connection_id();
        }
        let (conn_id, previous) = inner.registry.insert(user, sender);
        if let Some(previous) = previous {
            tracing::info!(
                "Room {}: user {} reconnected, closing connection {}",
                self.id,
                user_id,
                previous.id
            );
            previous.close();
        }
        let state = inner.state_message(user_id);
        let log = inner.log_message();
        inner.registry.push_to(user_id, &state);
        inner.registry.push_to(user_id, &log);
        drop(inner);

        tracing::info!("Room {}: user {} joined (connection {})", self.id, user_id, conn_id);
        self.signal(RoomSignal::NewConn { user_id, conn_id });
        conn_id
    }

    /// Report that a connection's pumps have ended.
    pub fn lost(&self, user_id: UserId, conn_id: ConnectionId) {
        if self.is_closed() {
            return;
        }
        tracing::info!("Room {}: user {} lost connection {}", self.id, user_id, conn_id);
        self.signal(RoomSignal::LostConn { user_id, conn_id });
    }

    /// Forward a client message to the control loop.
    ///
    /// Returns `false` once the room is closed.
    pub async fn submit(&self, message: InboundMessage) -> bool {
        if self.is_closed() {
            return false;
        }
        self.inbound.send(message).await.is_ok()
    }

    /// Replace the room metadata shown in snapshots.
    pub async fn update_room(&self, room: Room) {
        self.inner.write().await.room = room;
    }

    pub(super) fn signal(&self, signal: RoomSignal) {
        if self.signals.send(signal).is_err() {
            tracing::debug!("Room {}: control loop is gone, dropping {:?}", self.id, signal);
        }
    }
}

impl fmt::Debug for GameRoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameRoom")
            .field("id", &self.id)
            .field("creator_id", &self.creator_id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
