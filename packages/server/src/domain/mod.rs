//! Domain layer: entities, value objects, errors and record-store interfaces.
//!
//! Nothing in here performs I/O. Concrete stores live in the infrastructure
//! layer and are injected as trait objects.

pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use entity::{NewProfile, NewRoom, Profile, Room, User};
pub use error::{ErrorKind, GameError, RepositoryError, ValueObjectError};
pub use repository::{ProfileRepository, RoomRepository, SessionRepository, UserRepository};
pub use value_object::{
    Nickname, PasswordDigest, ProfileId, RoomId, SessionToken, TRAIT_COUNT, Timestamp,
    TraitStats, UserId,
};
