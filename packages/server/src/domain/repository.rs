//! Record-store trait definitions
//!
//! The domain defines the data-access interfaces it needs; the
//! infrastructure layer provides the implementations (dependency inversion).
//! Use cases and the room actor only ever see these traits.

use async_trait::async_trait;

use super::{
    NewProfile, NewRoom, Nickname, PasswordDigest, Profile, ProfileId, RepositoryError, Room,
    RoomId, SessionToken, User, UserId,
};

/// User record store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user with a freshly assigned id
    async fn create(
        &self,
        nickname: Nickname,
        password: PasswordDigest,
    ) -> Result<User, RepositoryError>;

    /// Load a user by id
    async fn find(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Load the password digest of a user
    async fn find_password(&self, id: UserId) -> Result<Option<PasswordDigest>, RepositoryError>;
}

/// Profile record store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Create a profile with a freshly assigned id
    async fn create(&self, profile: NewProfile) -> Result<Profile, RepositoryError>;

    /// Load a profile by id
    async fn find(&self, id: ProfileId) -> Result<Option<Profile>, RepositoryError>;

    /// Overwrite an existing profile
    async fn save(&self, profile: Profile) -> Result<(), RepositoryError>;

    /// Delete a profile; deleting a missing profile is not an error
    async fn delete(&self, id: ProfileId) -> Result<(), RepositoryError>;

    /// All profiles created by `creator`, ordered by id
    async fn list_by_creator(&self, creator: UserId) -> Result<Vec<Profile>, RepositoryError>;
}

/// Room record store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Create a room with a freshly assigned id
    async fn create(&self, room: NewRoom) -> Result<Room, RepositoryError>;

    /// Load a room by id
    async fn find(&self, id: RoomId) -> Result<Option<Room>, RepositoryError>;

    /// Overwrite an existing room
    async fn save(&self, room: Room) -> Result<(), RepositoryError>;
}

/// Authentication session store (token issuance and resolution)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Issue a new token for `user_id`
    async fn issue(&self, user_id: UserId) -> Result<SessionToken, RepositoryError>;

    /// Resolve a token to the user it was issued for
    async fn resolve(&self, token: &SessionToken) -> Result<Option<UserId>, RepositoryError>;
}
