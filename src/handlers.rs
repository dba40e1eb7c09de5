use crate::adapter::RecordStoreAdapter;
use crate::editor::{EntryEditor, Submission, delete_entry};
use crate::errors::{AppError, AppResult};
use crate::export::{plain_text_report, report_filename};
use crate::identity::IdentityProvider;
use crate::models::{
    CredentialsRequest, DeleteQuery, RecordMap, Session, SessionResponse, SubmitMoodRequest,
};
use crate::state::AppState;
use crate::store::{JsonRecordStore, RecordStore};
use crate::ui::render_index;
use crate::views::{DerivedViews, build_views, local_today};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use chrono::NaiveDate;
use std::sync::Arc;

pub async fn index() -> Html<String> {
    Html(render_index())
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = state.identity.sign_up(&body.email, &body.password).await?;
    Ok(Json(to_response(session)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = state.identity.sign_in(&body.email, &body.password).await?;
    Ok(Json(to_response(session)))
}

pub async fn sign_out(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> StatusCode {
    state.identity.sign_out(&session.token).await;
    StatusCode::NO_CONTENT
}

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<RecordMap> {
    Json(current_records(&state, &session).await.as_ref().clone())
}

pub async fn get_views(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<DerivedViews> {
    let records = current_records(&state, &session).await;
    Json(build_views(&records))
}

pub async fn put_mood(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(date): Path<NaiveDate>,
    Json(body): Json<SubmitMoodRequest>,
) -> AppResult<Json<Submission>> {
    let Some(mood) = body.mood else {
        return Err(AppError::bad_request("pick a mood between 1 and 5"));
    };

    let today = local_today();
    let adapter = attach(&state, &session).await;
    let mut editor = EntryEditor::new(today);
    editor.select_date(date);
    editor.select_mood(mood)?;
    editor.set_note(body.note);

    editor
        .submit(&adapter, today)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::bad_request("pick a mood between 1 and 5"))
}

pub async fn delete_mood(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(date): Path<NaiveDate>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<StatusCode> {
    let adapter = attach(&state, &session).await;
    delete_entry(&adapter, date, query.confirm).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_report(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> impl IntoResponse {
    let today = local_today();
    let records = current_records(&state, &session).await;
    let body = plain_text_report(&records, &session.user, today);
    let disposition = format!("attachment; filename=\"{}\"", report_filename(today));

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
}

async fn attach(state: &AppState, session: &Session) -> RecordStoreAdapter<JsonRecordStore> {
    RecordStoreAdapter::attach(Arc::clone(&state.store), session.user.uid.clone()).await
}

async fn current_records(state: &AppState, session: &Session) -> Arc<RecordMap> {
    let feed = state.store.subscribe(&session.user.uid).await;
    feed.borrow().clone()
}

fn to_response(session: Session) -> SessionResponse {
    SessionResponse {
        token: session.token,
        user: session.user,
    }
}
