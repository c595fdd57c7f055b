//! Over: a run of deliveries within an innings.

use crate::domain::primitives::UnknownVariant;
use crate::domain::{Ball, InningsId, OverId, TimeMs};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Legal deliveries in a complete over.
pub const BALLS_PER_OVER: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverStatus {
    InProgress,
    Completed,
}

impl OverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverStatus::InProgress => "in_progress",
            OverStatus::Completed => "completed",
        }
    }
}

impl FromStr for OverStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(OverStatus::InProgress),
            "completed" => Ok(OverStatus::Completed),
            other => Err(UnknownVariant::new("over status", other)),
        }
    }
}

/// An over and its derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Over {
    pub id: OverId,
    pub innings_id: InningsId,
    /// 1-based, sequential within the innings.
    pub over_number: u32,
    pub total_runs: u32,
    pub legal_balls: u32,
    pub wickets: u32,
    pub status: OverStatus,
    pub created_at: TimeMs,
}

impl Over {
    /// Open a fresh over.
    pub fn open(innings_id: InningsId, over_number: u32) -> Self {
        Over {
            id: OverId::new(),
            innings_id,
            over_number,
            total_runs: 0,
            legal_balls: 0,
            wickets: 0,
            status: OverStatus::InProgress,
            created_at: TimeMs::now(),
        }
    }

    /// Refold totals and status from the over's deliveries.
    pub fn recompute(&mut self, balls: &[Ball]) {
        let (runs, legal, wickets) = balls.iter().map(Ball::tally).fold(
            (0, 0, 0),
            |(runs, legal, wickets), t| {
                (
                    runs + t.total(),
                    legal + u32::from(t.is_legal_delivery),
                    wickets + u32::from(t.is_wicket),
                )
            },
        );
        self.total_runs = runs;
        self.legal_balls = legal;
        self.wickets = wickets;
        self.status = if legal >= BALLS_PER_OVER {
            OverStatus::Completed
        } else {
            OverStatus::InProgress
        };
    }

    pub fn is_completed(&self) -> bool {
        self.status == OverStatus::Completed
    }
}

/// Slot for the next delivery: one past the highest existing ball number.
pub fn next_ball_number(balls: &[Ball]) -> u32 {
    balls.iter().map(|b| b.ball_number).max().unwrap_or(0) + 1
}

/// Number for the next over: one past the highest existing over number.
pub fn next_over_number(overs: &[Over]) -> u32 {
    overs.iter().map(|o| o.over_number).max().unwrap_or(0) + 1
}
