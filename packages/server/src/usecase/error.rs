//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{ProfileId, RepositoryError, RoomId, ValueObjectError};

/// サインアップ・ログイン・認証のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error(transparent)]
    Invalid(#[from] ValueObjectError),

    #[error("Unauthenticated")]
    Unauthenticated,

    /// ユーザーが存在しないかパスワードが違う（どちらかは区別しない）
    #[error("Incorrect id or password")]
    InvalidCredentials,

    /// パスワードのハッシュ計算タスクが失敗した
    #[error("Password task failed: {0}")]
    Internal(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// プロフィール操作のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error(transparent)]
    Invalid(#[from] ValueObjectError),

    #[error("No such profile (ID {0})")]
    NotFound(ProfileId),

    #[error("Not profile creator")]
    NotCreator,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// ルーム操作のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room title must not be empty")]
    EmptyTitle,

    #[error("No such room (ID {0})")]
    NotFound(RoomId),

    #[error("Not room creator")]
    NotCreator,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// ルームチャンネル接続のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("No such room (ID {0})")]
    NotFound(RoomId),

    #[error("Room closed")]
    Closed,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
