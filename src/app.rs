use crate::auth::require_auth;
use crate::handlers;
use crate::state::AppState;
use crate::ws;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/sign-out", post(handlers::sign_out))
        .route("/api/moods", get(handlers::list_moods))
        .route(
            "/api/moods/:date",
            put(handlers::put_mood).delete(handlers::delete_mood),
        )
        .route("/api/views", get(handlers::get_views))
        .route("/api/report", get(handlers::get_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/ws", get(ws::ws_handler))
        .route("/api/auth/sign-up", post(handlers::sign_up))
        .route("/api/auth/sign-in", post(handlers::sign_in))
        .merge(protected)
        .with_state(state)
}
