use crate::catalog::MoodValue;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One day's entry. A user has at most one per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodRecord {
    pub date: NaiveDate,
    pub mood: MoodValue,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Date-keyed records of a single user. `NaiveDate` orders the same way
/// as its `YYYY-MM-DD` string form.
pub type RecordMap = BTreeMap<NaiveDate, MoodRecord>;

/// The writable part of a record; the store stamps the write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodDraft {
    pub mood: MoodValue,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: String,
}

impl User {
    /// Greeting name: the part of the email before `@`.
    pub fn display_name(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Created,
    Updated,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct SubmitMoodRequest {
    pub mood: Option<u8>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}
