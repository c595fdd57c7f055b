//! Domain types for match scoring.
//!
//! This module provides:
//! - Entity ids and primitives: MatchId, InningsId, OverId, BallId, Team, TimeMs
//! - Match fixture, lifecycle status and result
//! - Innings, Over and Ball with aggregates refolded from their children
//! - Read projections (scorecard, extras summary, current over)

pub mod ball;
pub mod fixture;
pub mod innings;
pub mod over;
pub mod primitives;
pub mod scorecard;

pub use ball::{Ball, BallEvent, BallTally, BallType, RunType, WicketKind};
pub use fixture::{
    batting_first, InvalidTransition, Margin, Match, MatchResult, MatchStatus, NewMatch,
    TossDecision,
};
pub use innings::{Innings, InningsStatus, ALL_OUT_WICKETS};
pub use over::{next_ball_number, next_over_number, Over, OverStatus, BALLS_PER_OVER};
pub use primitives::{BallId, InningsId, MatchId, OverId, Team, TimeMs, UnknownVariant};
pub use scorecard::{ExtrasSummary, InningsCard, OverView, ScoreLine, Scorecard};
