//! Match fixture: setup data, lifecycle status and final result.

use crate::domain::primitives::UnknownVariant;
use crate::domain::{MatchId, Team, TimeMs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a match.
///
/// Transitions are monotonic: `scheduled -> live -> completed`, or `cancelled`
/// from either of the first two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled matches are immutable.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        matches!(
            (self, next),
            (MatchStatus::Scheduled, MatchStatus::Live)
                | (MatchStatus::Live, MatchStatus::Completed)
                | (MatchStatus::Scheduled, MatchStatus::Cancelled)
                | (MatchStatus::Live, MatchStatus::Cancelled)
        )
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "live" => Ok(MatchStatus::Live),
            "completed" => Ok(MatchStatus::Completed),
            "cancelled" => Ok(MatchStatus::Cancelled),
            other => Err(UnknownVariant::new("match status", other)),
        }
    }
}

/// What the toss winner chose to do first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TossDecision {
    Bat,
    Field,
}

impl TossDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            TossDecision::Bat => "bat",
            TossDecision::Field => "field",
        }
    }
}

impl FromStr for TossDecision {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bat" => Ok(TossDecision::Bat),
            "field" => Ok(TossDecision::Field),
            other => Err(UnknownVariant::new("toss decision", other)),
        }
    }
}

/// Team that bats first given the toss outcome.
pub fn batting_first(toss_winner: Team, decision: TossDecision) -> Team {
    match decision {
        TossDecision::Bat => toss_winner,
        TossDecision::Field => toss_winner.opponent(),
    }
}

/// Winning margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Margin {
    Wickets(u32),
    Runs(u32),
}

/// Final outcome of a completed match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum MatchResult {
    Won { team: Team, margin: Margin },
    Tie,
}

/// Attempted status change that the lifecycle does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("match cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub from: MatchStatus,
    pub to: MatchStatus,
}

/// Input for setting up a new match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub series_id: String,
    pub match_number: u32,
    pub team_a: String,
    pub team_b: String,
    /// Legal overs allowed per innings.
    pub total_overs: u32,
    pub toss_winner: Team,
    pub toss_decision: TossDecision,
}

/// A scheduled or played match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub series_id: String,
    pub match_number: u32,
    pub team_a: String,
    pub team_b: String,
    pub total_overs: u32,
    pub toss_winner: Team,
    pub toss_decision: TossDecision,
    pub initial_batting: Team,
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
    pub created_at: TimeMs,
    pub updated_at: TimeMs,
}

impl Match {
    /// Build a scheduled match from setup input.
    pub fn schedule(new: NewMatch) -> Self {
        let now = TimeMs::now();
        Match {
            id: MatchId::new(),
            initial_batting: batting_first(new.toss_winner, new.toss_decision),
            series_id: new.series_id,
            match_number: new.match_number,
            team_a: new.team_a,
            team_b: new.team_b,
            total_overs: new.total_overs,
            toss_winner: new.toss_winner,
            toss_decision: new.toss_decision,
            status: MatchStatus::Scheduled,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn team_name(&self, team: Team) -> &str {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    /// Legal deliveries allowed per innings.
    pub fn balls_per_innings(&self) -> u32 {
        self.total_overs * crate::domain::BALLS_PER_OVER
    }

    /// Move to `next` if the lifecycle allows it.
    pub fn transition(&mut self, next: MatchStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = TimeMs::now();
        Ok(())
    }

    /// Record the result and mark the match completed.
    pub fn complete(&mut self, result: MatchResult) -> Result<(), InvalidTransition> {
        self.transition(MatchStatus::Completed)?;
        self.result = Some(result);
        Ok(())
    }

    /// Human readable result line, e.g. "Lions won by 3 wickets".
    pub fn result_summary(&self) -> Option<String> {
        self.result.map(|result| match result {
            MatchResult::Tie => "Match tied".to_string(),
            MatchResult::Won { team, margin } => {
                let (n, unit) = match margin {
                    Margin::Wickets(n) => (n, "wicket"),
                    Margin::Runs(n) => (n, "run"),
                };
                let plural = if n == 1 { "" } else { "s" };
                format!("{} won by {} {}{}", self.team_name(team), n, unit, plural)
            }
        })
    }
}
