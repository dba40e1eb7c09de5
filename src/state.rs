use crate::config::Config;
use crate::errors::StoreError;
use crate::identity::LocalIdentity;
use crate::store::JsonRecordStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<LocalIdentity>,
    pub store: Arc<JsonRecordStore>,
}

impl AppState {
    pub fn new(identity: LocalIdentity, store: JsonRecordStore) -> Self {
        Self {
            identity: Arc::new(identity),
            store: Arc::new(store),
        }
    }

    /// Loads both data files; a file that exists but cannot be loaded stops
    /// startup instead of being replaced with an empty one.
    pub async fn open(config: &Config) -> Result<Self, StoreError> {
        Ok(Self::new(
            LocalIdentity::open(config.accounts_path.clone()).await?,
            JsonRecordStore::open(config.data_path.clone()).await?,
        ))
    }
}
