use crate::adapter::RecordStoreAdapter;
use crate::errors::AuthError;
use crate::identity::IdentityProvider;
use crate::models::{Session, User};
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialMode {
    SignIn,
    SignUp,
}

/// What observers of the gate see after every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub phase: SessionPhase,
    pub user: Option<User>,
    pub token: Option<String>,
    /// Message from the last failed attempt, cleared on success.
    pub error: Option<String>,
}

impl SessionStatus {
    fn signed_out(error: Option<String>) -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            user: None,
            token: None,
            error,
        }
    }
}

/// Decides between the sign-in form and the journal. The record
/// subscription exists exactly while the gate is authenticated.
pub struct SessionGate<I: IdentityProvider, S: RecordStore> {
    identity: Arc<I>,
    store: Arc<S>,
    phase: SessionPhase,
    session: Option<Session>,
    records: Option<RecordStoreAdapter<S>>,
    status: watch::Sender<SessionStatus>,
}

impl<I: IdentityProvider, S: RecordStore> SessionGate<I, S> {
    pub fn new(identity: Arc<I>, store: Arc<S>) -> Self {
        let (status, _) = watch::channel(SessionStatus::signed_out(None));
        Self {
            identity,
            store,
            phase: SessionPhase::Unauthenticated,
            session: None,
            records: None,
            status,
        }
    }

    /// Session-change notifications. The receiver starts with the current
    /// status.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn records(&self) -> Option<&RecordStoreAdapter<S>> {
        self.records.as_ref()
    }

    pub fn records_mut(&mut self) -> Option<&mut RecordStoreAdapter<S>> {
        self.records.as_mut()
    }

    /// Signs in or signs up. There is no timeout: while the provider is
    /// pending the gate stays `Authenticating`.
    pub async fn submit_credentials(
        &mut self,
        mode: CredentialMode,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        if self.phase != SessionPhase::Unauthenticated {
            warn!(phase = ?self.phase, "credentials submitted while not signed out");
            return Err(AuthError::AlreadySignedIn);
        }

        self.phase = SessionPhase::Authenticating;
        self.status.send_modify(|status| {
            status.phase = SessionPhase::Authenticating;
            status.error = None;
        });

        let result = match mode {
            CredentialMode::SignIn => self.identity.sign_in(email, password).await,
            CredentialMode::SignUp => self.identity.sign_up(email, password).await,
        };

        match result {
            Ok(session) => {
                self.enter(session).await;
                Ok(())
            }
            Err(err) => {
                self.phase = SessionPhase::Unauthenticated;
                self.status
                    .send_replace(SessionStatus::signed_out(Some(err.to_string())));
                Err(err)
            }
        }
    }

    /// Resumes a session from a previously issued token. Returns whether the
    /// gate is now authenticated with it.
    pub async fn restore(&mut self, token: &str) -> bool {
        if self.phase != SessionPhase::Unauthenticated {
            return self.session.as_ref().is_some_and(|session| session.token == token);
        }
        match self.identity.resolve(token).await {
            Some(session) => {
                self.enter(session).await;
                true
            }
            None => false,
        }
    }

    pub async fn sign_out(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.records = None;
        self.identity.sign_out(&session.token).await;
        self.phase = SessionPhase::Unauthenticated;
        self.status.send_replace(SessionStatus::signed_out(None));
        info!(uid = %session.user.uid, "session closed");
    }

    async fn enter(&mut self, session: Session) {
        self.records =
            Some(RecordStoreAdapter::attach(Arc::clone(&self.store), session.user.uid.clone()).await);
        self.phase = SessionPhase::Authenticated;
        self.status.send_replace(SessionStatus {
            phase: SessionPhase::Authenticated,
            user: Some(session.user.clone()),
            token: Some(session.token.clone()),
            error: None,
        });
        self.session = Some(session);
    }
}
