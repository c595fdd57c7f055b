//! Innings: one side's batting turn.

use crate::domain::primitives::UnknownVariant;
use crate::domain::{InningsId, MatchId, Over, Team, TimeMs, BALLS_PER_OVER};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Wickets that end an innings.
pub const ALL_OUT_WICKETS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InningsStatus {
    InProgress,
    Completed,
}

impl InningsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InningsStatus::InProgress => "in_progress",
            InningsStatus::Completed => "completed",
        }
    }
}

impl FromStr for InningsStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(InningsStatus::InProgress),
            "completed" => Ok(InningsStatus::Completed),
            other => Err(UnknownVariant::new("innings status", other)),
        }
    }
}

/// An innings and its derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Innings {
    pub id: InningsId,
    pub match_id: MatchId,
    /// 1 or 2.
    pub innings_number: u8,
    pub batting_team: Team,
    pub total_runs: u32,
    pub total_wickets: u32,
    /// Legal deliveries bowled.
    pub total_balls: u32,
    pub status: InningsStatus,
    pub created_at: TimeMs,
    pub updated_at: TimeMs,
}

impl Innings {
    /// Open an innings with zeroed totals.
    pub fn open(match_id: MatchId, innings_number: u8, batting_team: Team) -> Self {
        let now = TimeMs::now();
        Innings {
            id: InningsId::new(),
            match_id,
            innings_number,
            batting_team,
            total_runs: 0,
            total_wickets: 0,
            total_balls: 0,
            status: InningsStatus::InProgress,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refold totals from the innings' overs. Status is left to the caller.
    pub fn recompute(&mut self, overs: &[Over]) {
        self.total_runs = overs.iter().map(|o| o.total_runs).sum();
        self.total_wickets = overs.iter().map(|o| o.wickets).sum();
        self.total_balls = overs.iter().map(|o| o.legal_balls).sum();
        self.updated_at = TimeMs::now();
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == InningsStatus::InProgress
    }

    pub fn complete(&mut self) {
        self.status = InningsStatus::Completed;
        self.updated_at = TimeMs::now();
    }

    /// Completed overs plus the fraction of the current one.
    pub fn overs(&self) -> Decimal {
        overs_decimal(self.total_balls)
    }

    /// Scoreboard notation, e.g. `7.3` for seven overs and three balls.
    pub fn overs_display(&self) -> String {
        overs_display(self.total_balls)
    }

    /// Runs per over, rounded to two places. Zero before the first legal ball.
    pub fn run_rate(&self) -> Decimal {
        if self.total_balls == 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.total_runs) * Decimal::from(BALLS_PER_OVER)
            / Decimal::from(self.total_balls))
        .round_dp(2)
    }
}

pub fn overs_decimal(legal_balls: u32) -> Decimal {
    Decimal::from(legal_balls / BALLS_PER_OVER)
        + Decimal::from(legal_balls % BALLS_PER_OVER) / Decimal::from(BALLS_PER_OVER)
}

pub fn overs_display(legal_balls: u32) -> String {
    format!(
        "{}.{}",
        legal_balls / BALLS_PER_OVER,
        legal_balls % BALLS_PER_OVER
    )
}
