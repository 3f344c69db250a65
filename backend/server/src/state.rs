use std::sync::Arc;

use tracing::info;

use crate::{
    config::{Config, StoreBackend},
    database::{RedisStore, init_redis},
    service::ProfileService,
    store::{MemoryStore, ProfileStore},
};

pub struct State {
    pub config: Config,
    pub service: ProfileService,
}

impl State {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let store: Arc<dyn ProfileStore> = match config.store {
            StoreBackend::Redis => {
                info!("Connecting to Redis at {}", config.redis_url);
                Arc::new(RedisStore::new(init_redis(&config.redis_url).await))
            }
            StoreBackend::Memory => {
                info!("Using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Arc<dyn ProfileStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            service: ProfileService::new(store),
        })
    }
}
