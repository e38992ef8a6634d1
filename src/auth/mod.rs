use axum::Router;

use crate::state::AppState;

pub mod dto;
mod extractors;
pub mod handlers;
mod jwt;
mod password;
pub mod repo;

pub use extractors::CurrentUser;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
