use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{parse_match_id, parse_over_id, AppState};
use crate::domain::{Ball, BallEvent, BallType, Innings, OverView, RunType, WicketKind};
use crate::engine::{BallOutcome, UndoOutcome};
use crate::error::AppError;

/// A delivery as submitted by the scorer; the match comes from the path.
#[derive(Debug, Deserialize)]
pub struct BallRequest {
    pub innings_number: u8,
    pub ball_type: BallType,
    pub run_type: RunType,
    #[serde(default)]
    pub runs: u8,
    #[serde(default)]
    pub byes: u8,
    #[serde(default)]
    pub wicket: Option<WicketKind>,
}

pub async fn add_ball(
    Path(match_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<BallRequest>,
) -> Result<(StatusCode, Json<BallOutcome>), AppError> {
    let event = BallEvent {
        match_id: parse_match_id(&match_id)?,
        innings_number: request.innings_number,
        ball_type: request.ball_type,
        run_type: request.run_type,
        runs: request.runs,
        byes: request.byes,
        wicket: request.wicket,
    };
    let outcome = state.engine.add_ball(event).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn undo_ball(
    Path((match_id, innings_number)): Path<(String, u8)>,
    State(state): State<AppState>,
) -> Result<Json<UndoOutcome>, AppError> {
    let match_id = parse_match_id(&match_id)?;
    Ok(Json(state.engine.undo_ball(match_id, innings_number).await?))
}

pub async fn get_current_over(
    Path((match_id, innings_number)): Path<(String, u8)>,
    State(state): State<AppState>,
) -> Result<Json<Option<OverView>>, AppError> {
    let match_id = parse_match_id(&match_id)?;
    Ok(Json(
        state
            .engine
            .get_current_over(match_id, innings_number)
            .await?,
    ))
}

pub async fn check_innings_order(
    Path((match_id, innings_number)): Path<(String, u8)>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let match_id = parse_match_id(&match_id)?;
    state
        .engine
        .validate_innings_order(match_id, innings_number)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn rebuild_innings(
    Path((match_id, innings_number)): Path<(String, u8)>,
    State(state): State<AppState>,
) -> Result<Json<Innings>, AppError> {
    let match_id = parse_match_id(&match_id)?;
    Ok(Json(
        state
            .engine
            .rebuild_innings(match_id, innings_number)
            .await?,
    ))
}

pub async fn get_balls_by_over(
    Path(over_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Ball>>, AppError> {
    let over_id = parse_over_id(&over_id)?;
    Ok(Json(state.engine.get_balls_by_over(over_id).await?))
}
