use crate::errors::StoreError;
use crate::models::{MoodDraft, MoodRecord, RecordMap};
use crate::storage::{load_json, persist_json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::{Mutex, watch};
use tracing::debug;

/// Live view of one user's records. The current value is the whole map;
/// it is replaced wholesale after every change.
pub type RecordFeed = watch::Receiver<Arc<RecordMap>>;

/// Per-user persistence of date-keyed mood records with live subscription.
pub trait RecordStore: Send + Sync + 'static {
    /// Starts a feed holding the user's current records.
    fn subscribe(&self, user_id: &str) -> impl Future<Output = RecordFeed> + Send;

    /// Upserts the record for `date`; the store stamps the write time.
    fn write(
        &self,
        user_id: &str,
        date: NaiveDate,
        draft: MoodDraft,
    ) -> impl Future<Output = Result<MoodRecord, StoreError>> + Send;

    /// Removes the record for `date`. Returns whether one existed.
    fn delete(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MoodData {
    users: BTreeMap<String, RecordMap>,
}

#[derive(Default)]
struct Inner {
    data: MoodData,
    feeds: HashMap<String, watch::Sender<Arc<RecordMap>>>,
}

impl Inner {
    fn current(&self, user_id: &str) -> RecordMap {
        self.data.users.get(user_id).cloned().unwrap_or_default()
    }

    async fn commit(
        &mut self,
        path: Option<&Path>,
        user_id: &str,
        map: RecordMap,
    ) -> Result<(), StoreError> {
        let previous = if map.is_empty() {
            self.data.users.remove(user_id)
        } else {
            self.data.users.insert(user_id.to_string(), map)
        };

        if let Some(path) = path {
            if let Err(err) = persist_json(path, &self.data).await {
                match previous {
                    Some(map) => {
                        self.data.users.insert(user_id.to_string(), map);
                    }
                    None => {
                        self.data.users.remove(user_id);
                    }
                }
                return Err(err);
            }
        }

        if let Some(feed) = self.feeds.get(user_id) {
            feed.send_replace(Arc::new(self.current(user_id)));
        }
        Ok(())
    }
}

/// Record store kept in memory and mirrored to a JSON file after every
/// mutation. Concurrent writers to the same date: last write wins.
pub struct JsonRecordStore {
    path: Option<PathBuf>,
    inner: Mutex<Inner>,
}

impl JsonRecordStore {
    /// Loads the data file. Fails rather than starting empty when the file
    /// exists but cannot be read back.
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let data: MoodData = load_json(&path).await?;
        debug!(path = %path.display(), users = data.users.len(), "record store loaded");
        Ok(Self {
            path: Some(path),
            inner: Mutex::new(Inner {
                data,
                feeds: HashMap::new(),
            }),
        })
    }

    /// A store that never touches the filesystem.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl RecordStore for JsonRecordStore {
    async fn subscribe(&self, user_id: &str) -> RecordFeed {
        let mut inner = self.inner.lock().await;
        inner.feeds.retain(|_, feed| feed.receiver_count() > 0);

        if let Some(feed) = inner.feeds.get(user_id) {
            return feed.subscribe();
        }

        let (feed, receiver) = watch::channel(Arc::new(inner.current(user_id)));
        inner.feeds.insert(user_id.to_string(), feed);
        receiver
    }

    async fn write(
        &self,
        user_id: &str,
        date: NaiveDate,
        draft: MoodDraft,
    ) -> Result<MoodRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        let record = MoodRecord {
            date,
            mood: draft.mood,
            note: draft.note,
            created_at: Utc::now(),
        };

        let mut map = inner.current(user_id);
        map.insert(date, record.clone());
        inner.commit(self.path.as_deref(), user_id, map).await?;

        debug!(user_id, %date, mood = %record.mood, "record written");
        Ok(record)
    }

    async fn delete(&self, user_id: &str, date: NaiveDate) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let mut map = inner.current(user_id);
        if map.remove(&date).is_none() {
            return Ok(false);
        }

        inner.commit(self.path.as_deref(), user_id, map).await?;
        debug!(user_id, %date, "record deleted");
        Ok(true)
    }
}
