use crate::errors::AppError;
use crate::identity::IdentityProvider;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

/// Resolves the bearer token and hands the `Session` to the handler as a
/// request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let Some(session) = state.identity.resolve(token.trim()).await else {
        warn!("request with unknown session token");
        return Err(AppError::Unauthorized);
    };

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
