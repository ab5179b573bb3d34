pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod form;
pub mod models;
pub mod render;
pub mod routes;
pub mod state;
pub mod student;
pub mod teacher;

pub fn build_state(config: config::Config) -> state::AppState {
    state::AppState::new(config)
}
