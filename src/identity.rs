use crate::errors::{AuthError, StoreError};
use crate::models::{Session, User};
use crate::storage::{load_json, persist_json};
use chrono::{DateTime, TimeDelta, Utc};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
    path::PathBuf,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

/// How long an issued token stays valid without an explicit sign-out.
pub const SESSION_TTL_DAYS: i64 = 30;

/// Email/password accounts and the sessions issued for them.
pub trait IdentityProvider: Send + Sync + 'static {
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send;

    /// Ends the session. Unknown tokens are ignored.
    fn sign_out(&self, token: &str) -> impl Future<Output = ()> + Send;

    /// Looks up the live session behind a token.
    fn resolve(&self, token: &str) -> impl Future<Output = Option<Session>> + Send;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    uid: String,
    email: String,
    password_hash: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountBook {
    /// Keyed by normalized email.
    accounts: BTreeMap<String, Account>,
}

struct LiveSession {
    user: User,
    expires_at: DateTime<Utc>,
}

impl LiveSession {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Identity provider backed by a JSON accounts file. Sessions live in
/// memory, expire after `SESSION_TTL_DAYS` and do not survive a restart.
pub struct LocalIdentity {
    path: Option<PathBuf>,
    book: Mutex<AccountBook>,
    sessions: Mutex<HashMap<String, LiveSession>>,
    session_ttl: TimeDelta,
}

impl LocalIdentity {
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let book = load_json(&path).await?;
        Ok(Self {
            path: Some(path),
            book: Mutex::new(book),
            sessions: Mutex::new(HashMap::new()),
            session_ttl: TimeDelta::days(SESSION_TTL_DAYS),
        })
    }

    pub fn ephemeral() -> Self {
        Self {
            path: None,
            book: Mutex::new(AccountBook::default()),
            sessions: Mutex::new(HashMap::new()),
            session_ttl: TimeDelta::days(SESSION_TTL_DAYS),
        }
    }

    pub fn with_session_ttl(mut self, ttl: TimeDelta) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Issues a fresh token. Expired sessions are dropped here, so the
    /// table only holds sessions that could still be resolved.
    async fn issue(&self, user: User) -> Session {
        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.is_live(now));
        if sessions.len() < before {
            debug!(expired = before - sessions.len(), "expired sessions pruned");
        }
        sessions.insert(
            token.clone(),
            LiveSession {
                user: user.clone(),
                expires_at: now + self.session_ttl,
            },
        );
        Session { token, user }
    }
}

impl IdentityProvider for LocalIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }
        if self.book.lock().await.accounts.contains_key(&email) {
            return Err(AuthError::EmailInUse);
        }

        let password_hash = hash_password(password.to_string()).await?;
        let account = Account {
            uid: Uuid::new_v4().to_string(),
            email: email.clone(),
            password_hash,
        };

        {
            let mut book = self.book.lock().await;
            if book.accounts.contains_key(&email) {
                return Err(AuthError::EmailInUse);
            }
            book.accounts.insert(email.clone(), account.clone());
            if let Some(path) = &self.path {
                if let Err(err) = persist_json(path, &*book).await {
                    book.accounts.remove(&email);
                    return Err(err.into());
                }
            }
        }

        info!(uid = %account.uid, "account created");
        Ok(self
            .issue(User {
                uid: account.uid,
                email: account.email,
            })
            .await)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email)?;
        let account = self.book.lock().await.accounts.get(&email).cloned();
        let Some(account) = account else {
            warn!("sign-in for unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), account.password_hash.clone()).await? {
            warn!(uid = %account.uid, "sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(uid = %account.uid, "signed in");
        Ok(self
            .issue(User {
                uid: account.uid,
                email: account.email,
            })
            .await)
    }

    async fn sign_out(&self, token: &str) {
        if let Some(session) = self.sessions.lock().await.remove(token) {
            info!(uid = %session.user.uid, "signed out");
        }
    }

    async fn resolve(&self, token: &str) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        let live = sessions.get(token)?.is_live(Utc::now());
        if !live {
            sessions.remove(token);
            debug!("expired session token presented");
            return None;
        }
        sessions.get(token).map(|session| Session {
            token: token.to_string(),
            user: session.user.clone(),
        })
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    let (local, domain) = email.split_once('@').ok_or(AuthError::InvalidEmail)?;
    let domain_ok = domain.contains('.')
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidEmail);
    }
    Ok(email)
}

async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AuthError::Hashing(err.to_string()))
    })
    .await
    .map_err(|err| AuthError::Hashing(err.to_string()))?
}

async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(&hash).map_err(|err| AuthError::Hashing(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|err| AuthError::Hashing(err.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let identity = LocalIdentity::ephemeral();
        let created = identity.sign_up("Anna@Example.com ", "secret1").await.unwrap();
        assert_eq!(created.user.email, "anna@example.com");

        let session = identity.sign_in("anna@example.com", "secret1").await.unwrap();
        assert_eq!(session.user.uid, created.user.uid);
        assert_ne!(session.token, created.token);
        assert_eq!(identity.resolve(&session.token).await, Some(session));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let identity = LocalIdentity::ephemeral();
        identity.sign_up("anna@example.com", "secret1").await.unwrap();
        let err = identity.sign_up("ANNA@example.com", "secret2").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailInUse));
    }

    #[tokio::test]
    async fn weak_password_and_bad_email_are_rejected() {
        let identity = LocalIdentity::ephemeral();
        assert!(matches!(
            identity.sign_up("anna@example.com", "12345").await,
            Err(AuthError::WeakPassword { min: 6 })
        ));
        assert!(matches!(
            identity.sign_up("anna.example.com", "secret1").await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            identity.sign_up("@example.com", "secret1").await,
            Err(AuthError::InvalidEmail)
        ));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_account_look_the_same() {
        let identity = LocalIdentity::ephemeral();
        identity.sign_up("anna@example.com", "secret1").await.unwrap();

        let wrong = identity.sign_in("anna@example.com", "secret2").await.unwrap_err();
        let unknown = identity.sign_in("bob@example.com", "secret1").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn sign_out_invalidates_token() {
        let identity = LocalIdentity::ephemeral();
        let session = identity.sign_up("anna@example.com", "secret1").await.unwrap();
        identity.sign_out(&session.token).await;
        assert_eq!(identity.resolve(&session.token).await, None);
    }

    #[tokio::test]
    async fn expired_tokens_stop_resolving() {
        let identity = LocalIdentity::ephemeral().with_session_ttl(TimeDelta::zero());
        let session = identity.sign_up("anna@example.com", "secret1").await.unwrap();

        assert_eq!(identity.resolve(&session.token).await, None);
        assert!(identity.sessions.lock().await.is_empty());
    }

    #[tokio::test]
    async fn abandoned_sessions_do_not_pile_up() {
        let identity = LocalIdentity::ephemeral().with_session_ttl(TimeDelta::zero());
        identity.sign_up("anna@example.com", "secret1").await.unwrap();
        for _ in 0..3 {
            identity.sign_in("anna@example.com", "secret1").await.unwrap();
        }
        assert_eq!(identity.sessions.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn live_tokens_keep_resolving() {
        let identity = LocalIdentity::ephemeral();
        let first = identity.sign_up("anna@example.com", "secret1").await.unwrap();
        let second = identity.sign_in("anna@example.com", "secret1").await.unwrap();

        assert!(identity.resolve(&first.token).await.is_some());
        assert!(identity.resolve(&second.token).await.is_some());
        assert_eq!(identity.sessions.lock().await.len(), 2);
    }
}
