//! Shared application state.

use std::sync::Arc;

use antenna_shared::time::Clock;

use crate::{
    config::{GameTimings, ServerConfig},
    game::CardCatalog,
    infrastructure::repository::{
        InMemoryProfileRepository, InMemoryRoomRepository, InMemorySessionRepository,
        InMemoryUserRepository,
    },
    room::{RoomContext, RoomDirectory},
    usecase::{
        AuthenticateUseCase, LogInUseCase, OpenChannelUseCase, ProfileUseCase, RoomUseCase,
        SignUpUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// SignUpUseCase（サインアップのユースケース）
    pub sign_up_usecase: Arc<SignUpUseCase>,
    /// LogInUseCase（パスワードログインのユースケース）
    pub log_in_usecase: Arc<LogInUseCase>,
    /// AuthenticateUseCase（トークン認証のユースケース）
    pub authenticate_usecase: Arc<AuthenticateUseCase>,
    /// ProfileUseCase（プロフィール管理のユースケース）
    pub profile_usecase: Arc<ProfileUseCase>,
    /// RoomUseCase（ルーム管理のユースケース）
    pub room_usecase: Arc<RoomUseCase>,
    /// OpenChannelUseCase（チャンネル接続のユースケース）
    pub open_channel_usecase: Arc<OpenChannelUseCase>,
    /// 接続ごとの keepalive と読み取り期限
    pub timings: GameTimings,
}

impl AppState {
    /// Wire every use case on top of fresh in-memory record stores.
    pub fn in_memory(config: &ServerConfig, catalog: CardCatalog, clock: Arc<dyn Clock>) -> Self {
        Self::in_memory_seeded(config, catalog, clock, None)
    }

    /// Like [`AppState::in_memory`], with a fixed gameplay seed for every room.
    pub fn in_memory_seeded(
        config: &ServerConfig,
        catalog: CardCatalog,
        clock: Arc<dyn Clock>,
        seed: Option<u64>,
    ) -> Self {
        // 1. Record stores
        let users = Arc::new(InMemoryUserRepository::new());
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new());

        // 2. Live room directory
        let directory = RoomDirectory::new(RoomContext {
            profiles: profiles.clone(),
            catalog: Arc::new(catalog),
            timings: config.timings,
            clock: clock.clone(),
            seed,
        });

        // 3. UseCases
        Self {
            sign_up_usecase: Arc::new(SignUpUseCase::new(users.clone(), sessions.clone())),
            log_in_usecase: Arc::new(LogInUseCase::new(users.clone(), sessions.clone())),
            authenticate_usecase: Arc::new(AuthenticateUseCase::new(
                users.clone(),
                sessions,
                config.debug,
            )),
            profile_usecase: Arc::new(ProfileUseCase::new(users.clone(), profiles)),
            room_usecase: Arc::new(RoomUseCase::new(
                users,
                rooms.clone(),
                directory.clone(),
                clock,
                config.debug,
            )),
            open_channel_usecase: Arc::new(OpenChannelUseCase::new(rooms, directory)),
            timings: config.timings,
        }
    }
}
