//! Connection registry: the live delivery queue of every connected user.
//!
//! Delivery is a non-blocking send on an unbounded channel; the outbound
//! pump of each connection drains it to the wire. A slow client therefore
//! never stalls the room loop.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::Serialize;
use tokio::sync::mpsc;

use crate::domain::{User, UserId};

/// Frames queued for a connection's outbound pump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    /// Close the transport and stop the pump.
    Close,
}

pub type OutboundSender = mpsc::UnboundedSender<OutboundFrame>;
pub type OutboundReceiver = mpsc::UnboundedReceiver<OutboundFrame>;

/// Identifies one connection of a user; a reconnect gets a new id.
pub type ConnectionId = u64;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A process-wide unique connection id.
pub fn next_connection_id() -> ConnectionId {
    NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug)]
pub struct Connection {
    pub user: User,
    pub id: ConnectionId,
    sender: OutboundSender,
}

impl Connection {
    /// Queue a message. Returns `false` if the pump is gone.
    pub fn push<T: Serialize>(&self, message: &T) -> bool {
        match serde_json::to_string(message) {
            Ok(text) => self.sender.send(OutboundFrame::Text(text)).is_ok(),
            Err(e) => {
                tracing::warn!("Failed to serialize message for user {}: {}", self.user.id, e);
                false
            }
        }
    }

    pub fn close(&self) {
        let _ = self.sender.send(OutboundFrame::Close);
    }
}

/// At most one connection per user, iterated in user id order.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: BTreeMap<UserId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection, replacing and returning any previous one for
    /// the same user.
    pub fn insert(&mut self, user: User, sender: OutboundSender) -> (ConnectionId, Option<Connection>) {
        let id = next_connection_id();
        let previous = self
            .connections
            .insert(user.id, Connection { user, id, sender });
        (id, previous)
    }

    /// Remove the user's connection only if it is still `id`.
    pub fn remove(&mut self, user_id: UserId, id: ConnectionId) -> Option<Connection> {
        match self.connections.get(&user_id) {
            Some(connection) if connection.id == id => self.connections.remove(&user_id),
            _ => None,
        }
    }

    pub fn get(&self, user_id: UserId) -> Option<&Connection> {
        self.connections.get(&user_id)
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.connections.contains_key(&user_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn user_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.connections.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Queue a message to one user. Missing users are ignored.
    pub fn push_to<T: Serialize>(&self, user_id: UserId, message: &T) {
        if let Some(connection) = self.connections.get(&user_id)
            && !connection.push(message)
        {
            tracing::warn!("Failed to deliver message to user {}", user_id);
        }
    }

    /// Queue a per-recipient message to every connection except `skip`.
    pub fn broadcast_with<T, F>(&self, skip: Option<UserId>, mut build: F)
    where
        T: Serialize,
        F: FnMut(&Connection) -> T,
    {
        for connection in self.iter() {
            if Some(connection.user.id) == skip {
                continue;
            }
            if !connection.push(&build(connection)) {
                tracing::warn!("Failed to deliver message to user {}", connection.user.id);
            }
        }
    }

    /// Queue the same message to every connection.
    pub fn broadcast<T: Serialize>(&self, message: &T) {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to serialize broadcast: {}", e);
                return;
            }
        };
        for connection in self.iter() {
            if connection
                .sender
                .send(OutboundFrame::Text(text.clone()))
                .is_err()
            {
                tracing::warn!("Failed to deliver message to user {}", connection.user.id);
            }
        }
    }

    /// Send the close sentinel to every connection and forget them.
    pub fn close_all(&mut self) {
        for connection in self.connections.values() {
            connection.close();
        }
        self.connections.clear();
    }
}
