pub mod balls;
pub mod health;
pub mod matches;

use crate::domain::{MatchId, OverId};
use crate::engine::ScoringEngine;
use crate::error::AppError;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub engine: ScoringEngine,
}

impl AppState {
    pub fn new(engine: ScoringEngine) -> Self {
        Self { engine }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/matches", post(matches::create_match))
        .route(
            "/series/:series_id/matches",
            get(matches::list_series_matches),
        )
        .route("/matches/:match_id/start", post(matches::start_scoring))
        .route("/matches/:match_id/cancel", post(matches::cancel_match))
        .route("/matches/:match_id/scorecard", get(matches::get_scorecard))
        .route("/matches/:match_id/completion", get(matches::get_completion))
        .route("/matches/:match_id/balls", post(balls::add_ball))
        .route(
            "/matches/:match_id/innings/:innings_number/balls/last",
            delete(balls::undo_ball),
        )
        .route(
            "/matches/:match_id/innings/:innings_number/current-over",
            get(balls::get_current_over),
        )
        .route(
            "/matches/:match_id/innings/:innings_number/order",
            get(balls::check_innings_order),
        )
        .route(
            "/matches/:match_id/innings/:innings_number/rebuild",
            post(balls::rebuild_innings),
        )
        .route("/overs/:over_id/balls", get(balls::get_balls_by_over))
        .layer(cors)
        .with_state(state)
}

fn parse_match_id(raw: &str) -> Result<MatchId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid match id: {}", raw)))
}

fn parse_over_id(raw: &str) -> Result<OverId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid over id: {}", raw)))
}
