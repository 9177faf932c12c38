use crate::state::AppState;
use axum::Router;

pub mod classifier;
mod dto;
pub mod handlers;
pub mod model;
pub mod vectorizer;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::predict_routes())
}
