use crate::catalog::UnknownMood;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("data file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("data file encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("The email address is badly formatted.")]
    InvalidEmail,

    #[error("Password should be at least {min} characters.")]
    WeakPassword { min: usize },

    #[error("The email address is already in use by another account.")]
    EmailInUse,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Already signed in.")]
    AlreadySignedIn,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("account storage failed: {0}")]
    Storage(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("{date} is in the future; entries can only be made up to {today}")]
    FutureDate { date: NaiveDate, today: NaiveDate },

    #[error(transparent)]
    UnknownMood(#[from] UnknownMood),

    #[error("saving failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::Auth(AuthError::EmailInUse | AuthError::AlreadySignedIn) => {
                StatusCode::CONFLICT
            }
            AppError::Auth(AuthError::InvalidEmail | AuthError::WeakPassword { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Editor(EditorError::FutureDate { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Editor(EditorError::UnknownMood(_)) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) | AppError::Editor(_) | AppError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "error": {
                "message": message,
                "code": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
