//! Single delivery: incoming ball event, stored ball and its run tally.

use crate::domain::primitives::UnknownVariant;
use crate::domain::{BallId, MatchId, OverId, TimeMs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of delivery bowled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallType {
    Good,
    Wide,
    NoBall,
    DeadBall,
}

impl BallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BallType::Good => "good",
            BallType::Wide => "wide",
            BallType::NoBall => "no_ball",
            BallType::DeadBall => "dead_ball",
        }
    }

    /// Only good balls count toward the six-ball over.
    pub fn is_legal(&self) -> bool {
        matches!(self, BallType::Good)
    }
}

impl fmt::Display for BallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BallType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(BallType::Good),
            "wide" => Ok(BallType::Wide),
            "no_ball" => Ok(BallType::NoBall),
            "dead_ball" => Ok(BallType::DeadBall),
            other => Err(UnknownVariant::new("ball type", other)),
        }
    }
}

/// How the numeric `runs` of a delivery are credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    /// Runs off the bat (0..=9, never 5).
    Bat,
    NoBallExtra,
    WideExtra,
    LegBye,
    /// Delivery on which a wicket fell; carries no bat runs.
    WicketMarker,
}

impl RunType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunType::Bat => "bat",
            RunType::NoBallExtra => "no_ball_extra",
            RunType::WideExtra => "wide_extra",
            RunType::LegBye => "leg_bye",
            RunType::WicketMarker => "wicket_marker",
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bat" => Ok(RunType::Bat),
            "no_ball_extra" => Ok(RunType::NoBallExtra),
            "wide_extra" => Ok(RunType::WideExtra),
            "leg_bye" => Ok(RunType::LegBye),
            "wicket_marker" => Ok(RunType::WicketMarker),
            other => Err(UnknownVariant::new("run type", other)),
        }
    }
}

/// Mode of dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WicketKind {
    Bowled,
    Caught,
    Lbw,
    RunOut,
    Stumped,
    HitWicket,
}

impl WicketKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WicketKind::Bowled => "bowled",
            WicketKind::Caught => "caught",
            WicketKind::Lbw => "lbw",
            WicketKind::RunOut => "run_out",
            WicketKind::Stumped => "stumped",
            WicketKind::HitWicket => "hit_wicket",
        }
    }
}

impl FromStr for WicketKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bowled" => Ok(WicketKind::Bowled),
            "caught" => Ok(WicketKind::Caught),
            "lbw" => Ok(WicketKind::Lbw),
            "run_out" => Ok(WicketKind::RunOut),
            "stumped" => Ok(WicketKind::Stumped),
            "hit_wicket" => Ok(WicketKind::HitWicket),
            other => Err(UnknownVariant::new("wicket kind", other)),
        }
    }
}

/// A delivery as reported by the scorer, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallEvent {
    pub match_id: MatchId,
    pub innings_number: u8,
    pub ball_type: BallType,
    pub run_type: RunType,
    #[serde(default)]
    pub runs: u8,
    /// Byes run in addition to the delivery itself.
    #[serde(default)]
    pub byes: u8,
    #[serde(default)]
    pub wicket: Option<WicketKind>,
}

/// Run and count contribution of one delivery.
///
/// Every parent aggregate is a sum of these, so the tally is the only place
/// that decides how a ball's runs are credited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallTally {
    pub runs_off_bat: u32,
    pub wides: u32,
    pub no_balls: u32,
    pub leg_byes: u32,
    pub byes: u32,
    pub is_legal_delivery: bool,
    pub is_wicket: bool,
}

impl BallTally {
    /// Credit a delivery according to its ball and run type.
    pub fn credit(ball_type: BallType, run_type: RunType, runs: u8, byes: u8, wicket: bool) -> Self {
        let runs = u32::from(runs);
        let mut tally = BallTally {
            byes: u32::from(byes),
            is_legal_delivery: ball_type.is_legal(),
            is_wicket: wicket,
            ..Default::default()
        };
        match (ball_type, run_type) {
            (BallType::Wide, _) => tally.wides = runs,
            (BallType::NoBall, _) => tally.no_balls = runs,
            (BallType::DeadBall, _) => {}
            (BallType::Good, RunType::LegBye) => tally.leg_byes = runs,
            (BallType::Good, RunType::Bat) => tally.runs_off_bat = runs,
            (BallType::Good, _) => {}
        }
        tally
    }

    /// Extras excluding byes.
    pub fn extra_runs(&self) -> u32 {
        self.wides + self.no_balls + self.leg_byes
    }

    /// Everything credited to the batting side.
    pub fn total(&self) -> u32 {
        self.runs_off_bat + self.extra_runs() + self.byes
    }
}

/// A persisted delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub over_id: OverId,
    /// Position within the over, illegal deliveries included.
    pub ball_number: u32,
    pub ball_type: BallType,
    pub run_type: RunType,
    pub runs: u8,
    pub byes: u8,
    pub is_wicket: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wicket_kind: Option<WicketKind>,
    pub created_at: TimeMs,
}

impl Ball {
    /// Record a validated event in slot `ball_number` of `over_id`.
    pub fn record(over_id: OverId, ball_number: u32, event: &BallEvent) -> Self {
        Ball {
            id: BallId::new(),
            over_id,
            ball_number,
            ball_type: event.ball_type,
            run_type: event.run_type,
            runs: event.runs,
            byes: event.byes,
            is_wicket: event.wicket.is_some(),
            wicket_kind: event.wicket,
            created_at: TimeMs::now(),
        }
    }

    pub fn tally(&self) -> BallTally {
        BallTally::credit(
            self.ball_type,
            self.run_type,
            self.runs,
            self.byes,
            self.is_wicket,
        )
    }
}
