//! UseCase 層: HTTP 面から呼び出されるアプリケーション操作

mod account;
mod error;
mod open_channel;
mod profile;
mod room;

pub use account::{AuthenticateUseCase, DEBUG_TOKEN_PREFIX, LogInUseCase, SignUpUseCase};
pub use error::{AccountError, ChannelError, ProfileError, RoomError};
pub use open_channel::OpenChannelUseCase;
pub use profile::{ProfileChanges, ProfileUseCase};
pub use room::{RoomChanges, RoomUseCase};
