//! UseCase: ルームチャンネルへの接続先を決める
//!
//! - ライブのルームがあればそれに参加する
//! - ライブのルームがなければ、作成者だけが新しいルームを開き直せる

use std::sync::Arc;

use crate::{
    domain::{RoomId, RoomRepository, User},
    room::{GameRoom, RoomDirectory},
};

use super::error::ChannelError;

/// チャンネル接続のユースケース
pub struct OpenChannelUseCase {
    rooms: Arc<dyn RoomRepository>,
    directory: Arc<RoomDirectory>,
}

impl OpenChannelUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, directory: Arc<RoomDirectory>) -> Self {
        Self { rooms, directory }
    }

    pub async fn execute(&self, room_id: RoomId, user: &User) -> Result<Arc<GameRoom>, ChannelError> {
        let room = self
            .rooms
            .find(room_id)
            .await?
            .ok_or(ChannelError::NotFound(room_id))?;
        if let Some(live) = self.directory.find(room_id).await {
            return Ok(live);
        }
        if !room.is_created_by(user.id) {
            return Err(ChannelError::Closed);
        }
        tracing::info!("User {} reopens room {}", user.id, room_id);
        Ok(self.directory.open(room, user.clone()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GameTimings,
        domain::{NewRoom, Nickname, Timestamp, UserId},
        game::CardCatalog,
        infrastructure::repository::{InMemoryProfileRepository, InMemoryRoomRepository},
        room::RoomContext,
    };
    use antenna_shared::time::FixedClock;

    fn user(id: i64, nickname: &str) -> User {
        User::new(UserId::new(id), Nickname::new(nickname.to_string()).unwrap())
    }

    async fn setup() -> (OpenChannelUseCase, Arc<RoomDirectory>, RoomId) {
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let room = rooms
            .create(NewRoom {
                creator: UserId::new(1),
                created_at: Timestamp::new(0),
                title: "Harbor".to_string(),
                tags: Vec::new(),
                description: String::new(),
            })
            .await
            .unwrap();
        let directory = RoomDirectory::new(RoomContext {
            profiles: Arc::new(InMemoryProfileRepository::new()),
            catalog: Arc::new(CardCatalog::builtin().unwrap()),
            timings: GameTimings::default(),
            clock: Arc::new(FixedClock::new(0)),
            seed: None,
        });
        (
            OpenChannelUseCase::new(rooms, directory.clone()),
            directory,
            room.id,
        )
    }

    #[tokio::test]
    async fn test_missing_room_is_not_found() {
        // テスト項目: 存在しないルームへの接続は NotFound になる
        // given (前提条件):
        let (usecase, _, _) = setup().await;

        // when (操作):
        let result = usecase.execute(RoomId::new(99), &user(1, "alice")).await;

        // then (期待する結果):
        assert_eq!(result.map(|_| ()), Err(ChannelError::NotFound(RoomId::new(99))));
    }

    #[tokio::test]
    async fn test_only_creator_reopens_closed_room() {
        // テスト項目: ライブのルームがない場合、作成者以外は Closed、作成者は開き直せる
        // given (前提条件):
        let (usecase, directory, room_id) = setup().await;

        // when (操作):
        let by_other = usecase.execute(room_id, &user(2, "bob")).await;
        let by_creator = usecase.execute(room_id, &user(1, "alice")).await.unwrap();
        let by_other_again = usecase.execute(room_id, &user(2, "bob")).await.unwrap();

        // then (期待する結果):
        assert_eq!(by_other.map(|_| ()), Err(ChannelError::Closed));
        assert!(Arc::ptr_eq(&by_creator, &by_other_again));
        assert_eq!(directory.len().await, 1);
    }
}
