//! Read projections assembled from the ball log.
//!
//! A scorecard never trusts stored aggregates: every over and innings total
//! is refolded from the deliveries before it is served.

use crate::domain::{Ball, Innings, Match, Over};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Extras conceded, split by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtrasSummary {
    pub byes: u32,
    pub leg_byes: u32,
    pub wides: u32,
    pub no_balls: u32,
    pub total: u32,
}

impl ExtrasSummary {
    pub fn from_balls<'a>(balls: impl IntoIterator<Item = &'a Ball>) -> Self {
        let mut extras = balls
            .into_iter()
            .map(Ball::tally)
            .fold(ExtrasSummary::default(), |mut acc, t| {
                acc.byes += t.byes;
                acc.leg_byes += t.leg_byes;
                acc.wides += t.wides;
                acc.no_balls += t.no_balls;
                acc
            });
        extras.total = extras.byes + extras.leg_byes + extras.wides + extras.no_balls;
        extras
    }
}

/// An over with its deliveries in bowling order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverView {
    pub over: Over,
    pub balls: Vec<Ball>,
}

impl OverView {
    /// Sort deliveries and refold the over's totals from them.
    pub fn assemble(mut over: Over, mut balls: Vec<Ball>) -> Self {
        balls.sort_by_key(|b| b.ball_number);
        over.recompute(&balls);
        OverView { over, balls }
    }
}

/// Compact live score line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub innings_number: u8,
    pub runs: u32,
    pub wickets: u32,
    pub overs: String,
}

impl ScoreLine {
    pub fn of(innings: &Innings) -> Self {
        ScoreLine {
            innings_number: innings.innings_number,
            runs: innings.total_runs,
            wickets: innings.total_wickets,
            overs: innings.overs_display(),
        }
    }
}

/// One innings of the scorecard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsCard {
    pub innings: Innings,
    pub batting_team_name: String,
    pub overs_display: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub overs: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub run_rate: Decimal,
    pub extras: ExtrasSummary,
    pub over_history: Vec<OverView>,
}

/// Whole-match projection served to live viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scorecard {
    #[serde(rename = "match")]
    pub fixture: Match,
    pub innings: Vec<InningsCard>,
    /// Runs the second side needs, once the first innings is complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_summary: Option<String>,
}

impl Scorecard {
    /// Build the projection from raw entities.
    pub fn assemble(fixture: Match, innings: Vec<(Innings, Vec<OverView>)>) -> Self {
        let mut cards: Vec<InningsCard> = innings
            .into_iter()
            .map(|(mut innings, mut overs)| {
                overs.sort_by_key(|o| o.over.over_number);
                let totals: Vec<Over> = overs.iter().map(|o| o.over.clone()).collect();
                innings.recompute(&totals);
                InningsCard {
                    batting_team_name: fixture.team_name(innings.batting_team).to_string(),
                    overs_display: innings.overs_display(),
                    overs: innings.overs(),
                    run_rate: innings.run_rate(),
                    extras: ExtrasSummary::from_balls(overs.iter().flat_map(|o| &o.balls)),
                    innings,
                    over_history: overs,
                }
            })
            .collect();
        cards.sort_by_key(|c| c.innings.innings_number);

        let target = cards
            .iter()
            .find(|c| c.innings.innings_number == 1 && !c.innings.is_in_progress())
            .map(|c| c.innings.total_runs + 1);

        Scorecard {
            result_summary: fixture.result_summary(),
            fixture,
            innings: cards,
            target,
        }
    }

    pub fn innings(&self, innings_number: u8) -> Option<&InningsCard> {
        self.innings
            .iter()
            .find(|c| c.innings.innings_number == innings_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BallEvent, BallType, InningsStatus, MatchId, NewMatch, RunType, Team, TossDecision,
    };

    fn fixture() -> Match {
        Match::schedule(NewMatch {
            series_id: "s1".to_string(),
            match_number: 3,
            team_a: "Lions".to_string(),
            team_b: "Tigers".to_string(),
            total_overs: 2,
            toss_winner: Team::A,
            toss_decision: TossDecision::Bat,
        })
    }

    fn delivery(over: &Over, n: u32, ball_type: BallType, run_type: RunType, runs: u8, byes: u8) -> Ball {
        let event = BallEvent {
            match_id: MatchId::new(),
            innings_number: 1,
            ball_type,
            run_type,
            runs,
            byes,
            wicket: None,
        };
        Ball::record(over.id, n, &event)
    }

    #[test]
    fn test_extras_summary_by_kind() {
        let over = Over::open(crate::domain::InningsId::new(), 1);
        let balls = vec![
            delivery(&over, 1, BallType::Wide, RunType::WideExtra, 1, 0),
            delivery(&over, 2, BallType::NoBall, RunType::NoBallExtra, 2, 0),
            delivery(&over, 3, BallType::Good, RunType::LegBye, 1, 0),
            delivery(&over, 4, BallType::Good, RunType::Bat, 0, 2),
            delivery(&over, 5, BallType::Good, RunType::Bat, 4, 0),
        ];
        let extras = ExtrasSummary::from_balls(&balls);
        assert_eq!(extras.wides, 1);
        assert_eq!(extras.no_balls, 2);
        assert_eq!(extras.leg_byes, 1);
        assert_eq!(extras.byes, 2);
        assert_eq!(extras.total, 6);
    }

    #[test]
    fn test_assemble_ignores_stale_stored_totals() {
        let m = fixture();
        let mut innings = Innings::open(m.id, 1, Team::A);
        innings.total_runs = 999;
        let mut over = Over::open(innings.id, 1);
        over.total_runs = 500;
        let balls = vec![
            delivery(&over, 2, BallType::Good, RunType::Bat, 6, 0),
            delivery(&over, 1, BallType::Good, RunType::Bat, 1, 0),
        ];

        let card = Scorecard::assemble(m, vec![(innings, vec![OverView::assemble(over, balls)])]);
        let first = card.innings(1).unwrap();
        assert_eq!(first.innings.total_runs, 7);
        assert_eq!(first.over_history[0].over.total_runs, 7);
        assert_eq!(first.over_history[0].balls[0].ball_number, 1);
        assert_eq!(first.overs_display, "0.2");
        assert_eq!(first.batting_team_name, "Lions");
        assert!(card.target.is_none());
    }

    #[test]
    fn test_target_after_first_innings() {
        let m = fixture();
        let mut innings = Innings::open(m.id, 1, Team::A);
        innings.status = InningsStatus::Completed;
        let over = Over::open(innings.id, 1);
        let balls = vec![delivery(&over, 1, BallType::Good, RunType::Bat, 3, 0)];
        let card = Scorecard::assemble(m, vec![(innings, vec![OverView::assemble(over, balls)])]);
        assert_eq!(card.target, Some(4));
    }
}
