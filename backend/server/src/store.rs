use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::Profile;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("a profile with email {0} already exists")]
    DuplicateEmail(String),

    #[error("no stored profile with id {0}")]
    Missing(String),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("stored document is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Document store for profiles.
///
/// Emails are a unique index: `insert` and `update` fail with
/// [`StoreError::DuplicateEmail`] when another record already holds the
/// address. "First" means insertion order, which is how the single-profile
/// operations address their record.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn insert(&self, profile: &Profile) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError>;

    async fn find_first(&self) -> Result<Option<Profile>, StoreError>;

    /// Persists changes to an existing record, re-indexing the email if it
    /// changed. Fails with [`StoreError::Missing`] when no record has the
    /// profile's id.
    async fn update(&self, profile: &Profile) -> Result<(), StoreError>;

    /// Removes the first stored record, returning it if one existed.
    async fn delete_first(&self) -> Result<Option<Profile>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

/// In-process store, used by the test suite and when running without Redis
/// (`PROFILE_STORE=memory`).
#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<Vec<Profile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn insert(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock().unwrap();

        if profiles.iter().any(|p| p.email == profile.email) {
            return Err(StoreError::DuplicateEmail(profile.email.clone()));
        }

        profiles.push(profile.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter().find(|p| p.email == email).cloned())
    }

    async fn find_first(&self) -> Result<Option<Profile>, StoreError> {
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.first().cloned())
    }

    async fn update(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock().unwrap();

        if profiles
            .iter()
            .any(|p| p.id != profile.id && p.email == profile.email)
        {
            return Err(StoreError::DuplicateEmail(profile.email.clone()));
        }

        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(slot) => {
                *slot = profile.clone();
                Ok(())
            }
            None => Err(StoreError::Missing(profile.id.clone())),
        }
    }

    async fn delete_first(&self) -> Result<Option<Profile>, StoreError> {
        let mut profiles = self.profiles.lock().unwrap();

        if profiles.is_empty() {
            Ok(None)
        } else {
            Ok(Some(profiles.remove(0)))
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.len() as u64)
    }
}
