//! UseCase: サインアップ・ログイン・認証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ユーザー作成とトークン発行、パスワードでのログイン、トークンからのユーザー解決
//! - 異常系：不正なニックネーム、空のパスワード、誤ったパスワード、未知のトークン、Repository の障害
//! - デバッグモード：`!<user_id>` 形式の開発用トークン

use std::sync::Arc;

use crate::domain::{
    Nickname, PasswordDigest, SessionRepository, SessionToken, User, UserId, UserRepository,
};

use super::error::AccountError;

/// デバッグモードで受け付ける開発用トークンの接頭辞
pub const DEBUG_TOKEN_PREFIX: char = '!';

/// パスワードのハッシュ計算は重いので、ブロッキング用スレッドで実行する
async fn hash_password(password: String) -> Result<PasswordDigest, AccountError> {
    tokio::task::spawn_blocking(move || PasswordDigest::generate(&password))
        .await
        .map_err(|e| AccountError::Internal(e.to_string()))?
        .map_err(AccountError::from)
}

/// ハッシュとの照合もブロッキング用スレッドで実行する
async fn verify_password(digest: PasswordDigest, password: String) -> Result<bool, AccountError> {
    tokio::task::spawn_blocking(move || digest.verify(&password))
        .await
        .map_err(|e| AccountError::Internal(e.to_string()))
}

/// サインアップのユースケース
pub struct SignUpUseCase {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl SignUpUseCase {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    /// ユーザーを作成し、そのユーザーのトークンを発行する
    ///
    /// パスワードはハッシュのみを保存する
    pub async fn execute(
        &self,
        nickname: String,
        password: String,
    ) -> Result<(User, SessionToken), AccountError> {
        let nickname = Nickname::new(nickname)?;
        let digest = hash_password(password).await?;
        let user = self.users.create(nickname, digest).await?;
        let token = self.sessions.issue(user.id).await?;
        tracing::info!("User {} [{}] signed up", user.id, user.nickname);
        Ok((user, token))
    }
}

/// パスワードでログインし、新しいトークンを発行するユースケース
pub struct LogInUseCase {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl LogInUseCase {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    /// ユーザー ID とパスワードを照合し、成功すればトークンを発行する
    ///
    /// 未知のユーザーと誤ったパスワードは同じエラーになる
    pub async fn execute(
        &self,
        user_id: UserId,
        password: String,
    ) -> Result<(User, SessionToken), AccountError> {
        if password.is_empty() {
            return Err(crate::domain::ValueObjectError::EmptyPassword.into());
        }
        let Some(digest) = self.users.find_password(user_id).await? else {
            tracing::debug!("Log-in for unknown user {}", user_id);
            return Err(AccountError::InvalidCredentials);
        };
        if !verify_password(digest, password).await? {
            tracing::warn!("Log-in for user {} with a wrong password", user_id);
            return Err(AccountError::InvalidCredentials);
        }
        let user = self
            .users
            .find(user_id)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;
        let token = self.sessions.issue(user.id).await?;
        tracing::info!("User {} [{}] logged in", user.id, user.nickname);
        Ok((user, token))
    }
}

/// トークンからユーザーを解決するユースケース
pub struct AuthenticateUseCase {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    /// `!<user_id>` トークンを受け付けるか
    debug: bool,
}

impl AuthenticateUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        debug: bool,
    ) -> Self {
        Self {
            users,
            sessions,
            debug,
        }
    }

    /// トークンを呼び出し元のユーザーに解決する
    pub async fn execute(&self, token: &str) -> Result<User, AccountError> {
        let user_id = match self.debug_user_id(token) {
            Some(user_id) => user_id,
            None => {
                let token = SessionToken::new(token.to_string())
                    .map_err(|_| AccountError::Unauthenticated)?;
                self.sessions
                    .resolve(&token)
                    .await?
                    .ok_or(AccountError::Unauthenticated)?
            }
        };
        self.users
            .find(user_id)
            .await?
            .ok_or(AccountError::Unauthenticated)
    }

    fn debug_user_id(&self, token: &str) -> Option<UserId> {
        if !self.debug {
            return None;
        }
        token
            .strip_prefix(DEBUG_TOKEN_PREFIX)
            .and_then(|id| id.parse::<i64>().ok())
            .map(UserId::new)
    }
}
