//! In-memory user store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Nickname, PasswordDigest, RepositoryError, User, UserId, UserRepository};

#[derive(Debug)]
struct UserRecord {
    user: User,
    password: PasswordDigest,
}

#[derive(Debug, Default)]
struct Users {
    records: HashMap<UserId, UserRecord>,
    last_id: i64,
}

/// In-memory `UserRepository` implementation.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Users>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(
        &self,
        nickname: Nickname,
        password: PasswordDigest,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().await;
        users.last_id += 1;
        let user = User::new(UserId::new(users.last_id), nickname);
        users.records.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password,
            },
        );
        tracing::debug!("User {} created", user.id);
        Ok(user)
    }

    async fn find(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.records.get(&id).map(|record| record.user.clone()))
    }

    async fn find_password(&self, id: UserId) -> Result<Option<PasswordDigest>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.records.get(&id).map(|record| record.password.clone()))
    }
}
