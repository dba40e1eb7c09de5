use crate::adapter::RecordStoreAdapter;
use crate::catalog::MoodValue;
use crate::errors::EditorError;
use crate::models::{MoodDraft, MoodRecord, WriteOutcome};
use crate::store::RecordStore;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    Entry,
    Calendar,
}

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub outcome: WriteOutcome,
    pub record: MoodRecord,
}

/// Form state for picking a day's mood. Submitting writes at most one
/// record and resets the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryEditor {
    date: NaiveDate,
    mood: Option<MoodValue>,
    note: String,
    view: ActiveView,
}

impl EntryEditor {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today,
            mood: None,
            note: String::new(),
            view: ActiveView::Entry,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn mood(&self) -> Option<MoodValue> {
        self.mood
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn view(&self) -> ActiveView {
        self.view
    }

    /// Any date is accepted here; future dates are rejected on submit.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub fn select_mood(&mut self, value: u8) -> Result<(), EditorError> {
        self.mood = Some(MoodValue::try_from(value)?);
        Ok(())
    }

    pub fn clear_mood(&mut self) {
        self.mood = None;
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    /// Saving stays disabled until a mood is picked.
    pub fn can_submit(&self) -> bool {
        self.mood.is_some()
    }

    /// Writes the entry, creating or overwriting the record for the chosen
    /// date. Returns `Ok(None)` without writing when no mood is selected.
    /// On error the form is left as it was.
    pub async fn submit<S: RecordStore>(
        &mut self,
        adapter: &RecordStoreAdapter<S>,
        today: NaiveDate,
    ) -> Result<Option<Submission>, EditorError> {
        let Some(mood) = self.mood else {
            return Ok(None);
        };
        ensure_not_future(self.date, today)?;

        let outcome = if adapter.contains(self.date) {
            WriteOutcome::Updated
        } else {
            WriteOutcome::Created
        };
        let draft = MoodDraft {
            mood,
            note: self.note.clone(),
        };
        let record = adapter.write(self.date, draft).await?;
        info!(uid = adapter.user_id(), date = %record.date, ?outcome, "mood saved");

        self.reset(today);
        self.view = ActiveView::Calendar;
        Ok(Some(Submission { outcome, record }))
    }

    fn reset(&mut self, today: NaiveDate) {
        self.date = today;
        self.mood = None;
        self.note.clear();
    }
}

/// Removes the entry for `date` once the user has confirmed. Declining,
/// or deleting a date with no entry, changes nothing. Returns whether a
/// record was removed.
pub async fn delete_entry<S: RecordStore>(
    adapter: &RecordStoreAdapter<S>,
    date: NaiveDate,
    confirmed: bool,
) -> Result<bool, EditorError> {
    if !confirmed {
        return Ok(false);
    }
    let removed = adapter.delete(date).await?;
    if removed {
        info!(uid = adapter.user_id(), %date, "mood deleted");
    }
    Ok(removed)
}

/// Entries may be made for today or any earlier calendar day.
pub fn ensure_not_future(date: NaiveDate, today: NaiveDate) -> Result<(), EditorError> {
    if date > today {
        return Err(EditorError::FutureDate { date, today });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonRecordStore;
    use chrono::Duration;
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    async fn adapter() -> RecordStoreAdapter<JsonRecordStore> {
        RecordStoreAdapter::attach(Arc::new(JsonRecordStore::ephemeral()), "u1").await
    }

    #[tokio::test]
    async fn submit_creates_then_updates() {
        let adapter = adapter().await;
        let mut editor = EntryEditor::new(today());

        editor.select_mood(2).unwrap();
        editor.set_note("tired");
        let first = editor.submit(&adapter, today()).await.unwrap().unwrap();
        assert_eq!(first.outcome, WriteOutcome::Created);

        editor.select_mood(4).unwrap();
        let second = editor.submit(&adapter, today()).await.unwrap().unwrap();
        assert_eq!(second.outcome, WriteOutcome::Updated);

        let records = adapter.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[&today()].mood.get(), 4);
        assert_eq!(records[&today()].note, "");
    }

    #[tokio::test]
    async fn submit_resets_form_and_shows_calendar() {
        let adapter = adapter().await;
        let mut editor = EntryEditor::new(today());
        editor.select_date(today() - Duration::days(3));
        editor.select_mood(5).unwrap();
        editor.set_note("beach");

        let saved = editor.submit(&adapter, today()).await.unwrap().unwrap();
        assert_eq!(saved.record.date, today() - Duration::days(3));
        assert_eq!(saved.record.note, "beach");

        assert_eq!(editor.date(), today());
        assert_eq!(editor.mood(), None);
        assert_eq!(editor.note(), "");
        assert_eq!(editor.view(), ActiveView::Calendar);
    }

    #[tokio::test]
    async fn future_date_is_rejected_without_writing() {
        let adapter = adapter().await;
        let mut editor = EntryEditor::new(today());
        let tomorrow = today() + Duration::days(1);
        editor.select_date(tomorrow);
        editor.select_mood(3).unwrap();
        let before = editor.clone();

        let err = editor.submit(&adapter, today()).await.unwrap_err();
        assert!(matches!(err, EditorError::FutureDate { date, .. } if date == tomorrow));
        assert!(adapter.records().is_empty());
        assert_eq!(editor, before);
    }

    #[tokio::test]
    async fn submit_without_mood_is_inert() {
        let adapter = adapter().await;
        let mut editor = EntryEditor::new(today());
        editor.set_note("forgot to pick");
        assert!(!editor.can_submit());

        assert!(editor.submit(&adapter, today()).await.unwrap().is_none());
        assert!(adapter.records().is_empty());
        assert_eq!(editor.note(), "forgot to pick");
    }

    #[test]
    fn unknown_mood_is_rejected() {
        let mut editor = EntryEditor::new(today());
        assert!(matches!(editor.select_mood(0), Err(EditorError::UnknownMood(_))));
        assert!(matches!(editor.select_mood(6), Err(EditorError::UnknownMood(_))));
        assert!(!editor.can_submit());
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let adapter = adapter().await;
        let mut editor = EntryEditor::new(today());
        editor.select_mood(1).unwrap();
        editor.submit(&adapter, today()).await.unwrap();

        assert!(!delete_entry(&adapter, today(), false).await.unwrap());
        assert_eq!(adapter.records().len(), 1);

        assert!(delete_entry(&adapter, today(), true).await.unwrap());
        assert!(adapter.records().is_empty());
    }

    #[tokio::test]
    async fn deleting_missing_date_is_not_an_error() {
        let adapter = adapter().await;
        let removed = delete_entry(&adapter, today() - Duration::days(9), true)
            .await
            .unwrap();
        assert!(!removed);
        assert!(adapter.records().is_empty());
    }
}
