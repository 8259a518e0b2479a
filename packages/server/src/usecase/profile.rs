//! UseCase: プロフィールの作成・取得・更新・削除
//!
//! 更新と削除は作成者のみが行える。

use std::sync::Arc;

use crate::domain::{
    NewProfile, Profile, ProfileId, ProfileRepository, RepositoryError, TraitStats, User, UserId,
    UserRepository,
};

use super::error::ProfileError;

/// プロフィールの部分更新（`None` の項目は現在の値を保つ）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub details: Option<serde_json::Value>,
    pub stats: Option<TraitStats>,
    pub traits: Option<Vec<String>>,
}

/// プロフィール管理のユースケース
pub struct ProfileUseCase {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileUseCase {
    pub fn new(users: Arc<dyn UserRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { users, profiles }
    }

    pub async fn create(
        &self,
        creator: &User,
        details: serde_json::Value,
        stats: TraitStats,
        traits: Vec<String>,
    ) -> Result<Profile, ProfileError> {
        let profile = self
            .profiles
            .create(NewProfile {
                creator: creator.id,
                details,
                stats,
                traits,
            })
            .await?;
        tracing::debug!("User {} created profile {}", creator.id, profile.id);
        Ok(profile)
    }

    /// プロフィールとその作成者
    pub async fn get(&self, id: ProfileId) -> Result<(Profile, User), ProfileError> {
        let profile = self.find(id).await?;
        let creator = self.creator_of(profile.creator).await?;
        Ok((profile, creator))
    }

    pub async fn update(
        &self,
        caller: &User,
        id: ProfileId,
        changes: ProfileChanges,
    ) -> Result<Profile, ProfileError> {
        let mut profile = self.find(id).await?;
        if !profile.is_owned_by(caller.id) {
            return Err(ProfileError::NotCreator);
        }
        if let Some(details) = changes.details {
            profile.details = details;
        }
        if let Some(stats) = changes.stats {
            profile.stats = stats;
        }
        if let Some(traits) = changes.traits {
            profile.traits = traits;
        }
        self.profiles.save(profile.clone()).await?;
        Ok(profile)
    }

    pub async fn delete(&self, caller: &User, id: ProfileId) -> Result<(), ProfileError> {
        let profile = self.find(id).await?;
        if !profile.is_owned_by(caller.id) {
            return Err(ProfileError::NotCreator);
        }
        self.profiles.delete(id).await?;
        tracing::debug!("User {} deleted profile {}", caller.id, id);
        Ok(())
    }

    /// `caller` が作成したプロフィール（ID 順）
    pub async fn list_mine(&self, caller: &User) -> Result<Vec<Profile>, ProfileError> {
        Ok(self.profiles.list_by_creator(caller.id).await?)
    }

    async fn find(&self, id: ProfileId) -> Result<Profile, ProfileError> {
        self.profiles
            .find(id)
            .await?
            .ok_or(ProfileError::NotFound(id))
    }

    async fn creator_of(&self, id: UserId) -> Result<User, ProfileError> {
        self.users
            .find(id)
            .await?
            .ok_or(ProfileError::Repository(RepositoryError::UserNotFound(id)))
    }
}
