pub mod adapter;
pub mod app;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod editor;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;
pub mod views;
pub mod ws;

pub use app::router;
pub use config::Config;
pub use state::AppState;
