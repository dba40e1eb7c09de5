use crate::catalog::MoodValue;
use crate::editor::{ActiveView, EntryEditor, delete_entry};
use crate::errors::EditorError;
use crate::identity::IdentityProvider;
use crate::models::WriteOutcome;
use crate::session::{CredentialMode, SessionGate, SessionPhase};
use crate::store::RecordStore;
use crate::views::{DerivedViews, build_views_at, local_today};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Intents sent by the page.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Restore {
        token: String,
    },
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        email: String,
        password: String,
    },
    SignOut,
    Submit {
        date: NaiveDate,
        mood: Option<u8>,
        #[serde(default)]
        note: String,
    },
    Delete {
        date: NaiveDate,
        #[serde(default)]
        confirmed: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorSnapshot {
    pub date: NaiveDate,
    pub mood: Option<MoodValue>,
    pub note: String,
    pub view: ActiveView,
    pub can_submit: bool,
    /// Latest date the picker may offer.
    pub max_date: NaiveDate,
}

/// Everything the page is told to draw.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Session {
        phase: SessionPhase,
        email: Option<String>,
        display_name: Option<String>,
        token: Option<String>,
        error: Option<String>,
    },
    Editor(EditorSnapshot),
    Views(Box<DerivedViews>),
    Notice {
        level: NoticeLevel,
        message: String,
    },
}

impl ServerMessage {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// One browser's application state: the session gate with its record
/// subscription, the entry form, and the views derived from the records.
/// Driven by one task, one event at a time.
pub struct MoodClient<I: IdentityProvider, S: RecordStore> {
    gate: SessionGate<I, S>,
    editor: EntryEditor,
    today: fn() -> NaiveDate,
}

impl<I: IdentityProvider, S: RecordStore> MoodClient<I, S> {
    pub fn new(identity: Arc<I>, store: Arc<S>) -> Self {
        Self::with_clock(identity, store, local_today)
    }

    pub fn with_clock(identity: Arc<I>, store: Arc<S>, today: fn() -> NaiveDate) -> Self {
        Self {
            gate: SessionGate::new(identity, store),
            editor: EntryEditor::new(today()),
            today,
        }
    }

    pub fn gate(&self) -> &SessionGate<I, S> {
        &self.gate
    }

    /// Initial state sent when the page connects.
    pub fn hello(&self) -> Vec<ServerMessage> {
        self.snapshot()
    }

    pub async fn handle(&mut self, message: ClientMessage) -> Vec<ServerMessage> {
        match message {
            ClientMessage::Restore { token } => {
                self.gate.restore(&token).await;
                self.editor = EntryEditor::new((self.today)());
                self.snapshot()
            }
            ClientMessage::SignIn { email, password } => {
                self.authenticate(CredentialMode::SignIn, &email, &password)
                    .await
            }
            ClientMessage::SignUp { email, password } => {
                self.authenticate(CredentialMode::SignUp, &email, &password)
                    .await
            }
            ClientMessage::SignOut => {
                self.gate.sign_out().await;
                self.editor = EntryEditor::new((self.today)());
                vec![self.session_message()]
            }
            ClientMessage::Submit { date, mood, note } => self.submit(date, mood, note).await,
            ClientMessage::Delete { date, confirmed } => self.delete(date, confirmed).await,
        }
    }

    /// Waits for the next record map change and returns the recomputed
    /// views. Never resolves while signed out.
    pub async fn next_change(&mut self) -> Vec<ServerMessage> {
        let today = (self.today)();
        let Some(records) = self.gate.records_mut() else {
            return std::future::pending().await;
        };
        match records.changed().await {
            Some(records) => vec![ServerMessage::Views(Box::new(build_views_at(today, &records)))],
            None => std::future::pending().await,
        }
    }

    async fn authenticate(
        &mut self,
        mode: CredentialMode,
        email: &str,
        password: &str,
    ) -> Vec<ServerMessage> {
        if let Err(err) = self.gate.submit_credentials(mode, email, password).await {
            debug!(?mode, "authentication rejected: {err}");
            return vec![self.session_message()];
        }
        self.editor = EntryEditor::new((self.today)());
        self.snapshot()
    }

    async fn submit(&mut self, date: NaiveDate, mood: Option<u8>, note: String) -> Vec<ServerMessage> {
        let today = (self.today)();
        let Some(records) = self.gate.records() else {
            return vec![ServerMessage::error("Sign in to record your mood.")];
        };

        self.editor.select_date(date);
        self.editor.set_note(note);
        match mood {
            Some(value) => {
                if let Err(err) = self.editor.select_mood(value) {
                    return vec![ServerMessage::error(err.to_string()), self.editor_message()];
                }
            }
            None => self.editor.clear_mood(),
        }

        // The views follow from the store feed, not from this reply.
        match self.editor.submit(records, today).await {
            Ok(Some(saved)) => {
                let message = match saved.outcome {
                    WriteOutcome::Created => format!("Saved your mood for {}.", saved.record.date),
                    WriteOutcome::Updated => format!("Updated your mood for {}.", saved.record.date),
                };
                vec![self.editor_message(), ServerMessage::info(message)]
            }
            Ok(None) => vec![self.editor_message()],
            Err(err @ EditorError::FutureDate { .. }) => {
                vec![ServerMessage::error(err.to_string()), self.editor_message()]
            }
            Err(err) => vec![
                ServerMessage::error(format!("Could not save: {err}")),
                self.editor_message(),
            ],
        }
    }

    async fn delete(&mut self, date: NaiveDate, confirmed: bool) -> Vec<ServerMessage> {
        let Some(records) = self.gate.records() else {
            return vec![ServerMessage::error("Sign in to manage your entries.")];
        };
        match delete_entry(records, date, confirmed).await {
            Ok(true) => vec![ServerMessage::info(format!("Deleted the entry for {date}."))],
            Ok(false) => Vec::new(),
            Err(err) => vec![ServerMessage::error(format!("Could not delete: {err}"))],
        }
    }

    fn snapshot(&self) -> Vec<ServerMessage> {
        let mut messages = vec![self.session_message()];
        if let Some(records) = self.gate.records() {
            let today = (self.today)();
            messages.push(self.editor_message());
            messages.push(ServerMessage::Views(Box::new(build_views_at(
                today,
                &records.records(),
            ))));
        }
        messages
    }

    fn session_message(&self) -> ServerMessage {
        let status = self.gate.status();
        ServerMessage::Session {
            phase: status.phase,
            display_name: status.user.as_ref().map(|user| user.display_name().to_string()),
            email: status.user.map(|user| user.email),
            token: status.token,
            error: status.error,
        }
    }

    fn editor_message(&self) -> ServerMessage {
        ServerMessage::Editor(EditorSnapshot {
            date: self.editor.date(),
            mood: self.editor.mood(),
            note: self.editor.note().to_string(),
            view: self.editor.view(),
            can_submit: self.editor.can_submit(),
            max_date: (self.today)(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::LocalIdentity;
    use crate::store::JsonRecordStore;

    type Client = MoodClient<LocalIdentity, JsonRecordStore>;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()
    }

    fn client() -> Client {
        MoodClient::with_clock(
            Arc::new(LocalIdentity::ephemeral()),
            Arc::new(JsonRecordStore::ephemeral()),
            fixed_today,
        )
    }

    async fn signed_in() -> Client {
        let mut client = client();
        client
            .handle(ClientMessage::SignUp {
                email: "anna@example.com".into(),
                password: "secret1".into(),
            })
            .await;
        client
    }

    fn views(messages: &[ServerMessage]) -> Option<&DerivedViews> {
        messages.iter().find_map(|message| match message {
            ServerMessage::Views(views) => Some(views.as_ref()),
            _ => None,
        })
    }

    fn notice(messages: &[ServerMessage]) -> Option<(NoticeLevel, &str)> {
        messages.iter().find_map(|message| match message {
            ServerMessage::Notice { level, message } => Some((*level, message.as_str())),
            _ => None,
        })
    }

    fn submit(date: &str, mood: Option<u8>) -> ClientMessage {
        ClientMessage::Submit {
            date: date.parse().unwrap(),
            mood,
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn hello_shows_only_the_sign_in_form() {
        let client = client();
        let messages = client.hello();
        assert_eq!(messages.len(), 1);
        assert!(matches!(
            messages[0],
            ServerMessage::Session {
                phase: SessionPhase::Unauthenticated,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn sign_up_sends_session_editor_and_views() {
        let mut client = client();
        let messages = client
            .handle(ClientMessage::SignUp {
                email: "anna@example.com".into(),
                password: "secret1".into(),
            })
            .await;

        assert!(matches!(
            &messages[0],
            ServerMessage::Session { phase: SessionPhase::Authenticated, display_name: Some(name), .. }
                if name == "anna"
        ));
        assert!(matches!(messages[1], ServerMessage::Editor(_)));
        assert_eq!(views(&messages).unwrap().calendar.len(), 35);
    }

    #[tokio::test]
    async fn failed_sign_in_reports_provider_message() {
        let mut client = client();
        let messages = client
            .handle(ClientMessage::SignIn {
                email: "anna@example.com".into(),
                password: "secret1".into(),
            })
            .await;
        assert!(matches!(
            &messages[0],
            ServerMessage::Session { phase: SessionPhase::Unauthenticated, error: Some(error), .. }
                if error == "Invalid email or password."
        ));
    }

    #[tokio::test]
    async fn saved_entries_come_back_as_views() {
        let mut client = signed_in().await;
        let reply = client.handle(submit("2024-01-07", Some(4))).await;
        assert_eq!(notice(&reply).unwrap().0, NoticeLevel::Info);

        let changed = client.next_change().await;
        let views = views(&changed).unwrap();
        assert_eq!(views.total, 1);
        assert_eq!(views.today_record.as_ref().unwrap().mood.get(), 4);
    }

    #[tokio::test]
    async fn future_date_is_refused() {
        let mut client = signed_in().await;
        let reply = client.handle(submit("2024-01-08", Some(4))).await;
        let (level, message) = notice(&reply).unwrap();
        assert_eq!(level, NoticeLevel::Error);
        assert!(message.contains("future"));
        assert!(client.gate().records().unwrap().records().is_empty());
    }

    #[tokio::test]
    async fn submit_without_mood_only_echoes_editor() {
        let mut client = signed_in().await;
        let reply = client.handle(submit("2024-01-07", None)).await;
        assert_eq!(reply.len(), 1);
        assert!(matches!(&reply[0], ServerMessage::Editor(editor) if !editor.can_submit));
    }

    #[tokio::test]
    async fn seven_perfect_days_celebrate() {
        let mut client = signed_in().await;
        for day in 1..=7 {
            client.handle(submit(&format!("2024-01-0{day}"), Some(5))).await;
        }
        let views = build_views_at(fixed_today(), &client.gate().records().unwrap().records());
        assert!(views.streak);
        assert_eq!(views.celebration.unwrap().duration_ms, 8_000);
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let mut client = signed_in().await;
        client.handle(submit("2024-01-05", Some(2))).await;

        let declined = client
            .handle(ClientMessage::Delete {
                date: "2024-01-05".parse().unwrap(),
                confirmed: false,
            })
            .await;
        assert!(declined.is_empty());
        assert_eq!(client.gate().records().unwrap().records().len(), 1);

        client
            .handle(ClientMessage::Delete {
                date: "2024-01-05".parse().unwrap(),
                confirmed: true,
            })
            .await;
        assert!(client.gate().records().unwrap().records().is_empty());
    }

    #[tokio::test]
    async fn signed_out_client_cannot_write() {
        let mut client = client();
        let reply = client.handle(submit("2024-01-07", Some(3))).await;
        assert_eq!(notice(&reply).unwrap().0, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn sign_out_returns_to_the_form() {
        let mut client = signed_in().await;
        let reply = client.handle(ClientMessage::SignOut).await;
        assert_eq!(reply.len(), 1);
        assert!(client.gate().records().is_none());
    }

    #[test]
    fn client_messages_parse_from_json() {
        let message: ClientMessage = serde_json::from_str(
            r#"{"type":"submit","date":"2024-01-07","mood":5,"note":"sun"}"#,
        )
        .unwrap();
        assert!(matches!(message, ClientMessage::Submit { mood: Some(5), .. }));

        let message: ClientMessage = serde_json::from_str(r#"{"type":"sign_out"}"#).unwrap();
        assert!(matches!(message, ClientMessage::SignOut));
    }
}
