//! In-memory profile store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{NewProfile, Profile, ProfileId, ProfileRepository, RepositoryError, UserId};

#[derive(Debug, Default)]
struct Profiles {
    records: BTreeMap<ProfileId, Profile>,
    last_id: i64,
}

/// In-memory `ProfileRepository` implementation.
///
/// Records are kept ordered by id so listings come out sorted.
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<Profiles>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: NewProfile) -> Result<Profile, RepositoryError> {
        let mut profiles = self.profiles.lock().await;
        profiles.last_id += 1;
        let profile = Profile {
            id: ProfileId::new(profiles.last_id),
            creator: profile.creator,
            details: profile.details,
            stats: profile.stats,
            traits: profile.traits,
        };
        profiles.records.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn find(&self, id: ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let profiles = self.profiles.lock().await;
        Ok(profiles.records.get(&id).cloned())
    }

    async fn save(&self, profile: Profile) -> Result<(), RepositoryError> {
        let mut profiles = self.profiles.lock().await;
        match profiles.records.get_mut(&profile.id) {
            Some(record) => {
                *record = profile;
                Ok(())
            }
            None => Err(RepositoryError::ProfileNotFound(profile.id)),
        }
    }

    async fn delete(&self, id: ProfileId) -> Result<(), RepositoryError> {
        let mut profiles = self.profiles.lock().await;
        profiles.records.remove(&id);
        Ok(())
    }

    async fn list_by_creator(&self, creator: UserId) -> Result<Vec<Profile>, RepositoryError> {
        let profiles = self.profiles.lock().await;
        Ok(profiles
            .records
            .values()
            .filter(|profile| profile.is_owned_by(creator))
            .cloned()
            .collect())
    }
}
