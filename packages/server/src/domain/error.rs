//! Domain error types.

use thiserror::Error;

use super::value_object::{ProfileId, RoomId, UserId};

/// Validation failures raised while constructing value objects.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("Nickname must not be empty")]
    EmptyNickname,

    #[error("Nickname must be at most {max} characters (got {actual})")]
    NicknameTooLong { max: usize, actual: usize },

    #[error("Stats should be of length 8 (got {0})")]
    StatsLength(usize),

    #[error("Incorrect stat value \"{0}\"")]
    StatValue(String),

    #[error("Session token must not be empty")]
    EmptyToken,

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),
}

/// Record-store failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("No such user (ID {0})")]
    UserNotFound(UserId),

    #[error("No such profile (ID {0})")]
    ProfileNotFound(ProfileId),

    #[error("No such room (ID {0})")]
    RoomNotFound(RoomId),

    #[error("Storage failure: {0}")]
    Storage(String),
}

/// Classification of [`GameError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The operation is not valid in the current phase or step.
    PhaseMismatch,
    /// The actor is not allowed to perform the operation.
    Authorization,
    /// A field is malformed or out of range.
    Validation,
    /// The actor already did this, or has nothing left to spend.
    StateExhaustion,
    /// A referenced record is missing or the stores disagree.
    Consistency,
}

/// A rejected room operation.
///
/// Always scoped to the request that caused it; the room keeps running and
/// its state is left untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Not in assembly phase")]
    NotInAssembly,

    #[error("Not in appointment phase")]
    NotInAppointment,

    #[error("Not in gameplay phase")]
    NotInGameplay,

    #[error("Not in selection step")]
    NotInSelectionStep,

    #[error("Not in storytelling step")]
    NotInStorytellingStep,

    #[error("Not move holder")]
    NotHolder,

    #[error("Not storyteller")]
    NotStoryteller,

    #[error("Not room creator")]
    NotCreator,

    #[error("Not seated")]
    NotSeated,

    #[error("Profile is not owned by the sender")]
    NotProfileOwner,

    #[error("Player (ID {0}) is not seated")]
    PlayerNotSeated(UserId),

    #[error("No seated players")]
    NoPlayers,

    #[error("`{0}` out of range")]
    OutOfRange(&'static str),

    #[error("Incorrect message: {0}")]
    MalformedMessage(String),

    #[error("Already seated")]
    AlreadySeated,

    #[error("Already in queue (position {0})")]
    AlreadyQueued(usize),

    #[error("No action points remaining")]
    NoActionPoints,

    #[error("No such profile")]
    ProfileNotFound(ProfileId),

    #[error("Inconsistent records: {0}")]
    Inconsistent(String),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInAssembly
            | Self::NotInAppointment
            | Self::NotInGameplay
            | Self::NotInSelectionStep
            | Self::NotInStorytellingStep => ErrorKind::PhaseMismatch,
            Self::NotHolder
            | Self::NotStoryteller
            | Self::NotCreator
            | Self::NotSeated
            | Self::NotProfileOwner => ErrorKind::Authorization,
            Self::PlayerNotSeated(_)
            | Self::NoPlayers
            | Self::OutOfRange(_)
            | Self::MalformedMessage(_) => ErrorKind::Validation,
            Self::AlreadySeated | Self::AlreadyQueued(_) | Self::NoActionPoints => {
                ErrorKind::StateExhaustion
            }
            Self::ProfileNotFound(_) | Self::Inconsistent(_) => ErrorKind::Consistency,
        }
    }
}

impl From<RepositoryError> for GameError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::ProfileNotFound(id) => Self::ProfileNotFound(id),
            other => Self::Inconsistent(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_errors_are_classified_as_phase_mismatch() {
        // テスト項目: フェーズ不一致のエラーが PhaseMismatch に分類される
        // given (前提条件):
        let errors = [
            GameError::NotInAssembly,
            GameError::NotInAppointment,
            GameError::NotInGameplay,
            GameError::NotInSelectionStep,
            GameError::NotInStorytellingStep,
        ];

        // when (操作):
        let kinds: Vec<ErrorKind> = errors.iter().map(GameError::kind).collect();

        // then (期待する結果):
        assert!(kinds.iter().all(|k| *k == ErrorKind::PhaseMismatch));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        // テスト項目: エラーメッセージがクライアント向けに読める形式になっている
        // given (前提条件):
        let out_of_range = GameError::OutOfRange("hand_index");
        let queued = GameError::AlreadyQueued(1);

        // when (操作):
        let out_of_range_msg = out_of_range.to_string();
        let queued_msg = queued.to_string();

        // then (期待する結果):
        assert_eq!(out_of_range_msg, "`hand_index` out of range");
        assert_eq!(queued_msg, "Already in queue (position 1)");
        assert_eq!(out_of_range.kind(), ErrorKind::Validation);
        assert_eq!(queued.kind(), ErrorKind::StateExhaustion);
    }

    #[test]
    fn test_repository_errors_map_to_consistency() {
        // テスト項目: Repository エラーは Consistency 分類の GameError に変換される
        // given (前提条件):
        let missing_profile = RepositoryError::ProfileNotFound(ProfileId::new(3));
        let storage = RepositoryError::Storage("disk full".to_string());

        // when (操作):
        let e1: GameError = missing_profile.into();
        let e2: GameError = storage.into();

        // then (期待する結果):
        assert_eq!(e1, GameError::ProfileNotFound(ProfileId::new(3)));
        assert_eq!(e1.kind(), ErrorKind::Consistency);
        assert_eq!(e2.kind(), ErrorKind::Consistency);
    }
}
