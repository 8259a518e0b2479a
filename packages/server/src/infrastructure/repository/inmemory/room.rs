//! In-memory room store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{NewRoom, RepositoryError, Room, RoomId, RoomRepository};

#[derive(Debug, Default)]
struct Rooms {
    records: HashMap<RoomId, Room>,
    last_id: i64,
}

/// In-memory `RoomRepository` implementation.
#[derive(Debug, Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<Rooms>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create(&self, room: NewRoom) -> Result<Room, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        rooms.last_id += 1;
        let room = Room {
            id: RoomId::new(rooms.last_id),
            creator: room.creator,
            created_at: room.created_at,
            title: room.title,
            tags: room.tags,
            description: room.description,
        };
        rooms.records.insert(room.id, room.clone());
        Ok(room)
    }

    async fn find(&self, id: RoomId) -> Result<Option<Room>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.records.get(&id).cloned())
    }

    async fn save(&self, room: Room) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        match rooms.records.get_mut(&room.id) {
            Some(record) => {
                *record = room;
                Ok(())
            }
            None => Err(RepositoryError::RoomNotFound(room.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Timestamp, UserId};

    fn new_room(title: &str) -> NewRoom {
        NewRoom {
            creator: UserId::new(1),
            created_at: Timestamp::new(1_700_000_000),
            title: title.to_string(),
            tags: vec!["slow".to_string()],
            description: "A quiet evening".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_find_and_save() {
        // テスト項目: ルームの作成・取得・保存ができる
        // given (前提条件):
        let repository = InMemoryRoomRepository::new();
        let mut room = repository.create(new_room("Rainy day")).await.unwrap();

        // when (操作):
        room.title = "Sunny day".to_string();
        repository.save(room.clone()).await.unwrap();
        let found = repository.find(room.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(room.id, RoomId::new(1));
        assert_eq!(found.map(|room| room.title), Some("Sunny day".to_string()));
    }

    #[tokio::test]
    async fn test_save_missing_room() {
        // テスト項目: 存在しないルームの保存はエラーになる
        // given (前提条件):
        let repository = InMemoryRoomRepository::new();
        let mut room = repository.create(new_room("Rainy day")).await.unwrap();
        room.id = RoomId::new(5);

        // when (操作):
        let result = repository.save(room).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::RoomNotFound(RoomId::new(5))));
    }
}
