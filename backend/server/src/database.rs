//! # Redis
//!
//! Production document store.
//!
//! ## Layout
//!
//! - `profile:doc:<id>` - the profile serialized as a JSON document
//! - `profile:emails` - hash mapping email -> id, the unique index
//! - `profile:ids` - list of ids in insertion order ("first document found")
//!
//! `HSETNX` on the email hash is what enforces uniqueness: the first writer
//! claims the address atomically and a racing writer gets
//! [`StoreError::DuplicateEmail`].

use std::time::Duration;

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};

use crate::{
    model::Profile,
    store::{ProfileStore, StoreError},
};

const IDS_KEY: &str = "profile:ids";
const EMAIL_INDEX_KEY: &str = "profile:emails";

fn doc_key(id: &str) -> String {
    format!("profile:doc:{id}")
}

pub async fn init_redis(redis_url: &str) -> ConnectionManager {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url).expect("Invalid Redis URL");

    client
        .get_connection_manager_with_config(config)
        .await
        .expect("Failed to connect to Redis")
}

pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    async fn load(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        let mut con = self.connection.clone();

        let json: Option<String> = con.get(doc_key(id)).await?;
        Ok(match json {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        })
    }
}

#[async_trait]
impl ProfileStore for RedisStore {
    async fn insert(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut con = self.connection.clone();

        let claimed: bool = con
            .hset_nx(EMAIL_INDEX_KEY, &profile.email, &profile.id)
            .await?;
        if !claimed {
            return Err(StoreError::DuplicateEmail(profile.email.clone()));
        }

        let _: () = con
            .set(doc_key(&profile.id), serde_json::to_string(profile)?)
            .await?;
        let _: () = con.rpush(IDS_KEY, &profile.id).await?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let mut con = self.connection.clone();

        let id: Option<String> = con.hget(EMAIL_INDEX_KEY, email).await?;
        match id {
            Some(id) => self.load(&id).await,
            None => Ok(None),
        }
    }

    async fn find_first(&self) -> Result<Option<Profile>, StoreError> {
        let mut con = self.connection.clone();

        let ids: Vec<String> = con.lrange(IDS_KEY, 0, 0).await?;
        match ids.first() {
            Some(id) => self.load(id).await,
            None => Ok(None),
        }
    }

    async fn update(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut con = self.connection.clone();

        let previous = self
            .load(&profile.id)
            .await?
            .ok_or_else(|| StoreError::Missing(profile.id.clone()))?;

        if previous.email != profile.email {
            let claimed: bool = con
                .hset_nx(EMAIL_INDEX_KEY, &profile.email, &profile.id)
                .await?;
            if !claimed {
                return Err(StoreError::DuplicateEmail(profile.email.clone()));
            }
            let _: () = con.hdel(EMAIL_INDEX_KEY, &previous.email).await?;
        }

        let _: () = con
            .set(doc_key(&profile.id), serde_json::to_string(profile)?)
            .await?;

        Ok(())
    }

    async fn delete_first(&self) -> Result<Option<Profile>, StoreError> {
        let mut con = self.connection.clone();

        let ids: Vec<String> = con.lrange(IDS_KEY, 0, 0).await?;
        let Some(id) = ids.into_iter().next() else {
            return Ok(None);
        };

        let profile = self.load(&id).await?;

        let _: () = con.lrem(IDS_KEY, 1, &id).await?;
        let _: () = con.del(doc_key(&id)).await?;
        if let Some(profile) = &profile {
            let _: () = con.hdel(EMAIL_INDEX_KEY, &profile.email).await?;
        }

        Ok(profile)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let mut con = self.connection.clone();

        Ok(con.llen(IDS_KEY).await?)
    }
}
