use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::{parse_match_id, AppState};
use crate::domain::{Innings, Match, MatchResult, NewMatch, Scorecard};
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct SeriesMatchesResponse {
    pub series_id: String,
    pub count: u64,
    pub matches: Vec<Match>,
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub decided: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
}

pub async fn create_match(
    State(state): State<AppState>,
    Json(new): Json<NewMatch>,
) -> Result<(StatusCode, Json<Match>), AppError> {
    let fixture = state.engine.create_match(new).await?;
    Ok((StatusCode::CREATED, Json(fixture)))
}

pub async fn list_series_matches(
    Path(series_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SeriesMatchesResponse>, AppError> {
    let matches = state.engine.list_matches_by_series(&series_id).await?;
    let count = state.engine.count_matches_by_series(&series_id).await?;
    Ok(Json(SeriesMatchesResponse {
        series_id,
        count,
        matches,
    }))
}

pub async fn start_scoring(
    Path(match_id): Path<String>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Innings>), AppError> {
    let match_id = parse_match_id(&match_id)?;
    let innings = state.engine.start_scoring(match_id).await?;
    Ok((StatusCode::CREATED, Json(innings)))
}

pub async fn cancel_match(
    Path(match_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Match>, AppError> {
    let match_id = parse_match_id(&match_id)?;
    Ok(Json(state.engine.cancel_match(match_id).await?))
}

pub async fn get_scorecard(
    Path(match_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Scorecard>, AppError> {
    let match_id = parse_match_id(&match_id)?;
    Ok(Json(state.engine.get_scorecard(match_id).await?))
}

pub async fn get_completion(
    Path(match_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CompletionResponse>, AppError> {
    let match_id = parse_match_id(&match_id)?;
    let result = state.engine.should_complete_match(match_id).await?;
    Ok(Json(CompletionResponse {
        decided: result.is_some(),
        result,
    }))
}
