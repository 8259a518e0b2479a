//! UseCase: ルームの作成・取得・更新
//!
//! ルームの作成はレコードの保存と同時にライブの `GameRoom` を開く。

use std::sync::Arc;

use antenna_shared::time::Clock;

use crate::{
    domain::{NewRoom, RepositoryError, Room, RoomId, RoomRepository, Timestamp, User, UserRepository},
    room::RoomDirectory,
};

use super::error::RoomError;

/// ルームの部分更新（`None` の項目は現在の値を保つ）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomChanges {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
}

/// ルーム管理のユースケース
pub struct RoomUseCase {
    users: Arc<dyn UserRepository>,
    rooms: Arc<dyn RoomRepository>,
    directory: Arc<RoomDirectory>,
    clock: Arc<dyn Clock>,
    /// 作成したルームへの開発用接続方法をログに出すか
    debug: bool,
}

impl RoomUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        rooms: Arc<dyn RoomRepository>,
        directory: Arc<RoomDirectory>,
        clock: Arc<dyn Clock>,
        debug: bool,
    ) -> Self {
        Self {
            users,
            rooms,
            directory,
            clock,
            debug,
        }
    }

    /// ルームを保存し、そのライブのルームを開く
    pub async fn create(
        &self,
        creator: &User,
        title: String,
        tags: Vec<String>,
        description: String,
    ) -> Result<Room, RoomError> {
        let title = validate_title(title)?;
        let room = self
            .rooms
            .create(NewRoom {
                creator: creator.id,
                created_at: Timestamp::new(self.clock.now_unix_secs()),
                title,
                tags,
                description,
            })
            .await?;
        self.directory.open(room.clone(), creator.clone()).await;
        tracing::info!("User {} created room {}", creator.id, room.id);
        if self.debug {
            tracing::info!(
                "Join room {} with: antenna-client --url ws://<host>/room/{}/channel --token !{}",
                room.id,
                room.id,
                creator.id
            );
        }
        Ok(room)
    }

    /// ルームとその作成者
    pub async fn get(&self, id: RoomId) -> Result<(Room, User), RoomError> {
        let room = self.find(id).await?;
        let creator = self
            .users
            .find(room.creator)
            .await?
            .ok_or(RoomError::Repository(RepositoryError::UserNotFound(room.creator)))?;
        Ok((room, creator))
    }

    /// メタデータを更新する（ライブのルームがあればそちらにも反映する）
    pub async fn update(
        &self,
        caller: &User,
        id: RoomId,
        changes: RoomChanges,
    ) -> Result<Room, RoomError> {
        let mut room = self.find(id).await?;
        if !room.is_created_by(caller.id) {
            return Err(RoomError::NotCreator);
        }
        if let Some(title) = changes.title {
            room.title = validate_title(title)?;
        }
        if let Some(tags) = changes.tags {
            room.tags = tags;
        }
        if let Some(description) = changes.description {
            room.description = description;
        }
        self.rooms.save(room.clone()).await?;
        if let Some(live) = self.directory.find(id).await {
            live.update_room(room.clone()).await;
        }
        Ok(room)
    }

    async fn find(&self, id: RoomId) -> Result<Room, RoomError> {
        self.rooms.find(id).await?.ok_or(RoomError::NotFound(id))
    }
}

fn validate_title(title: String) -> Result<String, RoomError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RoomError::EmptyTitle);
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GameTimings,
        domain::{Nickname, PasswordDigest, repository::MockRoomRepository},
        game::CardCatalog,
        infrastructure::repository::{
            InMemoryProfileRepository, InMemoryRoomRepository, InMemoryUserRepository,
        },
        room::RoomContext,
    };
    use antenna_shared::time::FixedClock;

    const NOW: i64 = 1_700_000_000;

    fn directory() -> Arc<RoomDirectory> {
        RoomDirectory::new(RoomContext {
            profiles: Arc::new(InMemoryProfileRepository::new()),
            catalog: Arc::new(CardCatalog::builtin().unwrap()),
            timings: GameTimings::default(),
            clock: Arc::new(FixedClock::new(NOW)),
            seed: Some(1),
        })
    }

    async fn setup(
        rooms: Arc<dyn RoomRepository>,
    ) -> (RoomUseCase, Arc<RoomDirectory>, User, User) {
        let users = Arc::new(InMemoryUserRepository::new());
        let alice = users
            .create(
                Nickname::new("alice".to_string()).unwrap(),
                PasswordDigest::generate("secret").unwrap(),
            )
            .await
            .unwrap();
        let bob = users
            .create(
                Nickname::new("bob".to_string()).unwrap(),
                PasswordDigest::generate("secret").unwrap(),
            )
            .await
            .unwrap();
        let directory = directory();
        let usecase = RoomUseCase::new(
            users,
            rooms,
            directory.clone(),
            Arc::new(FixedClock::new(NOW)),
            false,
        );
        (usecase, directory, alice, bob)
    }

    #[tokio::test]
    async fn test_create_opens_live_room() {
        // テスト項目: ルーム作成でレコードが保存され、ライブのルームが開かれる
        // given (前提条件):
        let (usecase, directory, alice, _) = setup(Arc::new(InMemoryRoomRepository::new())).await;

        // when (操作):
        let room = usecase
            .create(&alice, " Night train ".to_string(), vec!["mystery".to_string()], String::new())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(room.title, "Night train");
        assert_eq!(room.created_at, Timestamp::new(NOW));
        let live = directory.find(room.id).await.unwrap();
        assert_eq!(live.creator_id(), alice.id);
        let (fetched, creator) = usecase.get(room.id).await.unwrap();
        assert_eq!(fetched, room);
        assert_eq!(creator, alice);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        // テスト項目: 空白だけのタイトルではルームを作成できない
        // given (前提条件):
        let mut rooms = MockRoomRepository::new();
        rooms.expect_create().never();
        let (usecase, _, alice, _) = setup(Arc::new(rooms)).await;

        // when (操作):
        let result = usecase
            .create(&alice, "   ".to_string(), Vec::new(), String::new())
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RoomError::EmptyTitle));
    }

    #[tokio::test]
    async fn test_update_is_creator_only_and_reaches_live_room() {
        // テスト項目: 更新は作成者のみ可能で、ライブのルームにも反映される
        // given (前提条件):
        let (usecase, directory, alice, bob) =
            setup(Arc::new(InMemoryRoomRepository::new())).await;
        let room = usecase
            .create(&alice, "Old".to_string(), Vec::new(), String::new())
            .await
            .unwrap();
        let changes = RoomChanges {
            title: Some("New".to_string()),
            ..RoomChanges::default()
        };

        // when (操作):
        let by_other = usecase.update(&bob, room.id, changes.clone()).await;
        let updated = usecase.update(&alice, room.id, changes).await.unwrap();

        // then (期待する結果):
        assert_eq!(by_other, Err(RoomError::NotCreator));
        assert_eq!(updated.title, "New");
        let live = directory.find(room.id).await.unwrap();
        assert_eq!(live.read().await.room.title, "New");
    }

    #[tokio::test]
    async fn test_get_missing_room() {
        // テスト項目: 存在しないルームの取得は NotFound になる
        // given (前提条件):
        let (usecase, _, _, _) = setup(Arc::new(InMemoryRoomRepository::new())).await;

        // when (操作):
        let result = usecase.get(RoomId::new(42)).await;

        // then (期待する結果):
        assert_eq!(result.map(|_| ()), Err(RoomError::NotFound(RoomId::new(42))));
    }
}
