use crate::errors::StoreError;
use crate::models::{MoodDraft, MoodRecord, RecordMap};
use crate::store::{RecordFeed, RecordStore};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error};

/// A signed-in user's live mirror of their records. Readers get shared
/// snapshots; mutations go to the store and come back through the feed.
pub struct RecordStoreAdapter<S: RecordStore> {
    store: Arc<S>,
    user_id: String,
    feed: RecordFeed,
}

impl<S: RecordStore> RecordStoreAdapter<S> {
    pub async fn attach(store: Arc<S>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let feed = store.subscribe(&user_id).await;
        debug!(uid = %user_id, records = feed.borrow().len(), "record subscription opened");
        Self {
            store,
            user_id,
            feed,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn records(&self) -> Arc<RecordMap> {
        self.feed.borrow().clone()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.feed.borrow().contains_key(&date)
    }

    /// Resolves with the new map after the next change. `None` once the
    /// store side of the feed is gone. Cancel-safe.
    pub async fn changed(&mut self) -> Option<Arc<RecordMap>> {
        self.feed.changed().await.ok()?;
        let records = self.feed.borrow_and_update().clone();
        debug!(uid = %self.user_id, records = records.len(), "record map changed");
        Some(records)
    }

    pub async fn write(&self, date: NaiveDate, draft: MoodDraft) -> Result<MoodRecord, StoreError> {
        self.store
            .write(&self.user_id, date, draft)
            .await
            .inspect_err(|err| error!(uid = %self.user_id, %date, "record write failed: {err}"))
    }

    pub async fn delete(&self, date: NaiveDate) -> Result<bool, StoreError> {
        self.store
            .delete(&self.user_id, date)
            .await
            .inspect_err(|err| error!(uid = %self.user_id, %date, "record delete failed: {err}"))
    }
}

impl<S: RecordStore> Drop for RecordStoreAdapter<S> {
    fn drop(&mut self) {
        debug!(uid = %self.user_id, "record subscription closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MoodValue;
    use crate::store::JsonRecordStore;

    fn draft(mood: u8) -> MoodDraft {
        MoodDraft {
            mood: MoodValue::new(mood).unwrap(),
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn own_writes_arrive_through_the_feed() {
        let store = Arc::new(JsonRecordStore::ephemeral());
        let mut adapter = RecordStoreAdapter::attach(Arc::clone(&store), "u1").await;
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(!adapter.contains(date));

        adapter.write(date, draft(3)).await.unwrap();
        let records = adapter.changed().await.unwrap();
        assert_eq!(records[&date].mood.get(), 3);
        assert!(adapter.contains(date));
    }

    #[tokio::test]
    async fn sees_changes_from_other_sessions() {
        let store = Arc::new(JsonRecordStore::ephemeral());
        let mut first = RecordStoreAdapter::attach(Arc::clone(&store), "u1").await;
        let second = RecordStoreAdapter::attach(Arc::clone(&store), "u1").await;
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        second.write(date, draft(5)).await.unwrap();
        let records = first.changed().await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn snapshot_is_independent_of_later_changes() {
        let store = Arc::new(JsonRecordStore::ephemeral());
        let adapter = RecordStoreAdapter::attach(Arc::clone(&store), "u1").await;
        let before = adapter.records();

        adapter
            .write(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), draft(2))
            .await
            .unwrap();
        assert!(before.is_empty());
        assert_eq!(adapter.records().len(), 1);
    }
}
