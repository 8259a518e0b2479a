//! In-memory session store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, SessionRepository, SessionToken, UserId};

/// In-memory `SessionRepository` implementation issuing random UUID tokens.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<String, UserId>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn issue(&self, user_id: UserId) -> Result<SessionToken, RepositoryError> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let mut sessions = self.sessions.lock().await;
        sessions.insert(token.clone(), user_id);
        SessionToken::new(token).map_err(|e| RepositoryError::Storage(e.to_string()))
    }

    async fn resolve(&self, token: &SessionToken) -> Result<Option<UserId>, RepositoryError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(token.as_str()).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_and_resolve() {
        // テスト項目: 発行したトークンからユーザー ID を解決できる
        // given (前提条件):
        let repository = InMemorySessionRepository::new();

        // when (操作):
        let first = repository.issue(UserId::new(1)).await.unwrap();
        let second = repository.issue(UserId::new(1)).await.unwrap();

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(
            repository.resolve(&first).await.unwrap(),
            Some(UserId::new(1))
        );
        assert_eq!(
            repository.resolve(&second).await.unwrap(),
            Some(UserId::new(1))
        );
    }

    #[tokio::test]
    async fn test_unknown_token() {
        // テスト項目: 未発行のトークンは解決できない
        // given (前提条件):
        let repository = InMemorySessionRepository::new();
        let token = SessionToken::new("forged".to_string()).unwrap();

        // when (操作):
        let result = repository.resolve(&token).await.unwrap();

        // then (期待する結果):
        assert!(result.is_none());
    }
}
