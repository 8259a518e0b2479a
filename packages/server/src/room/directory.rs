//! Process-wide map of live rooms.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{Room, RoomId, User},
    game::{DeadlineHook, GameplayState},
};

use super::{
    broadcast::RoomInner,
    control::RoomLoop,
    game_room::{GameRoom, INBOUND_QUEUE_SIZE, RoomContext, RoomSignal},
};

#[derive(Debug)]
pub struct RoomDirectory {
    rooms: Mutex<HashMap<RoomId, Arc<GameRoom>>>,
    context: RoomContext,
}

impl RoomDirectory {
    pub fn new(context: RoomContext) -> Arc<Self> {
        Arc::new(Self {
            rooms: Mutex::new(HashMap::new()),
            context,
        })
    }

    pub fn context(&self) -> &RoomContext {
        &self.context
    }

    /// Return the live room for `room`, starting a fresh one in assembly if
    /// there is none.
    pub async fn open(self: &Arc<Self>, room: Room, creator: User) -> Arc<GameRoom> {
        let mut rooms = self.rooms.lock().await;
        if let Some(existing) = rooms.get(&room.id)
            && !existing.is_closed()
        {
            return Arc::clone(existing);
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE_SIZE);
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let hook_tx = signal_tx.clone();
        let hook: DeadlineHook = Arc::new(move |fired| {
            let _ = hook_tx.send(RoomSignal::Deadline(fired));
        });

        let mut gameplay = GameplayState::new(
            Arc::clone(&self.context.catalog),
            self.context.timings,
            hook,
        );
        if let Some(seed) = self.context.seed {
            gameplay = gameplay.with_seed(seed);
        }

        let room_id = room.id;
        let inner = RoomInner::new(room.clone(), creator, gameplay);
        let game_room = Arc::new(GameRoom::new(room, inner, inbound_tx, signal_tx));
        rooms.insert(room_id, Arc::clone(&game_room));
        drop(rooms);

        let control = RoomLoop::new(Arc::clone(&game_room), Arc::clone(self), inbound_rx, signal_rx);
        tokio::spawn(control.run());
        tracing::info!("Room {} opened", room_id);
        game_room
    }

    /// The live room with `id`, if any.
    pub async fn find(&self, id: RoomId) -> Option<Arc<GameRoom>> {
        self.rooms
            .lock()
            .await
            .get(&id)
            .filter(|room| !room.is_closed())
            .cloned()
    }

    /// Forget `room`, unless it was already replaced by a newer instance.
    pub async fn remove(&self, room: &Arc<GameRoom>) {
        let mut rooms = self.rooms.lock().await;
        if rooms
            .get(&room.id())
            .is_some_and(|current| Arc::ptr_eq(current, room))
        {
            rooms.remove(&room.id());
        }
    }

    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.lock().await.is_empty()
    }
}
