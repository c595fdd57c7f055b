//! Innings and match progression decisions.
//!
//! Pure functions over already-recomputed aggregates; the engine persists
//! whatever they decide.

use super::ScoringError;
use crate::domain::{Innings, Margin, Match, MatchResult, MatchStatus, ALL_OUT_WICKETS};
use serde::{Deserialize, Serialize};

/// Why an innings ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InningsEnd {
    /// The chasing side passed the first-innings total.
    TargetReached,
    AllOut,
    OversExhausted,
}

/// Decide whether `innings` is over after its latest ball.
///
/// `target` is set only for the chase. Reaching it wins immediately, even
/// mid-over, so it is checked before wickets and overs.
pub fn innings_end(innings: &Innings, fixture: &Match, target: Option<u32>) -> Option<InningsEnd> {
    if target.is_some_and(|t| innings.total_runs >= t) {
        return Some(InningsEnd::TargetReached);
    }
    if innings.total_wickets >= ALL_OUT_WICKETS {
        return Some(InningsEnd::AllOut);
    }
    if innings.total_balls >= fixture.balls_per_innings() {
        return Some(InningsEnd::OversExhausted);
    }
    None
}

/// Runs the second side needs to win.
pub fn target_for(first: &Innings) -> u32 {
    first.total_runs + 1
}

/// Result once the chase is decided.
pub fn match_result(first: &Innings, second: &Innings) -> MatchResult {
    let target = target_for(first);
    if second.total_runs >= target {
        MatchResult::Won {
            team: second.batting_team,
            margin: Margin::Wickets(ALL_OUT_WICKETS.saturating_sub(second.total_wickets)),
        }
    } else if second.total_runs == first.total_runs {
        MatchResult::Tie
    } else {
        MatchResult::Won {
            team: first.batting_team,
            margin: Margin::Runs(target - second.total_runs - 1),
        }
    }
}

/// The result if the chase in `second` is decided, otherwise `None`.
pub fn evaluate_chase(fixture: &Match, first: &Innings, second: &Innings) -> Option<MatchResult> {
    if !second.is_in_progress() {
        return Some(match_result(first, second));
    }
    innings_end(second, fixture, Some(target_for(first))).map(|_| match_result(first, second))
}

/// Check that balls may be recorded against `innings_number` right now.
///
/// Returns the open innings on success.
pub fn check_innings_order(
    fixture: &Match,
    innings_number: u8,
    innings: Option<Innings>,
) -> Result<Innings, ScoringError> {
    match fixture.status {
        MatchStatus::Live => {}
        MatchStatus::Scheduled => {
            return Err(ScoringError::MatchState(format!(
                "match {} has not started scoring",
                fixture.id
            )))
        }
        status => {
            return Err(ScoringError::MatchState(format!(
                "match {} is {}",
                fixture.id,
                status.as_str()
            )))
        }
    }

    if !(1..=2).contains(&innings_number) {
        return Err(ScoringError::InningsOrder(format!(
            "innings number must be 1 or 2, got {}",
            innings_number
        )));
    }

    match innings {
        None => Err(ScoringError::InningsOrder(format!(
            "innings {} has not started",
            innings_number
        ))),
        Some(innings) if !innings.is_in_progress() => Err(ScoringError::InningsOrder(format!(
            "innings {} is already completed",
            innings_number
        ))),
        Some(innings) => Ok(innings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewMatch, Team, TossDecision};

    fn fixture(total_overs: u32) -> Match {
        let mut m = Match::schedule(NewMatch {
            series_id: "s".to_string(),
            match_number: 1,
            team_a: "Lions".to_string(),
            team_b: "Tigers".to_string(),
            total_overs,
            toss_winner: Team::A,
            toss_decision: TossDecision::Bat,
        });
        m.transition(MatchStatus::Live).unwrap();
        m
    }

    fn innings(number: u8, team: Team, runs: u32, wickets: u32, balls: u32) -> Innings {
        let mut innings = Innings::open(fixture(20).id, number, team);
        innings.total_runs = runs;
        innings.total_wickets = wickets;
        innings.total_balls = balls;
        innings
    }

    #[test]
    fn test_innings_continues_mid_over() {
        let m = fixture(2);
        assert_eq!(innings_end(&innings(1, Team::A, 40, 3, 7), &m, None), None);
    }

    #[test]
    fn test_overs_exhausted() {
        let m = fixture(2);
        assert_eq!(
            innings_end(&innings(1, Team::A, 12, 0, 12), &m, None),
            Some(InningsEnd::OversExhausted)
        );
    }

    #[test]
    fn test_all_out_checked_before_overs() {
        let m = fixture(2);
        assert_eq!(
            innings_end(&innings(1, Team::A, 12, 10, 12), &m, None),
            Some(InningsEnd::AllOut)
        );
    }

    #[test]
    fn test_target_reached_wins_over_last_ball() {
        let m = fixture(2);
        assert_eq!(
            innings_end(&innings(2, Team::B, 52, 10, 12), &m, Some(51)),
            Some(InningsEnd::TargetReached)
        );
        assert_eq!(innings_end(&innings(2, Team::B, 50, 2, 8), &m, Some(51)), None);
    }

    #[test]
    fn test_chasing_side_wins_by_wickets() {
        let first = innings(1, Team::A, 50, 6, 120);
        let second = innings(2, Team::B, 52, 3, 40);
        assert_eq!(
            match_result(&first, &second),
            MatchResult::Won {
                team: Team::B,
                margin: Margin::Wickets(7)
            }
        );
    }

    #[test]
    fn test_defending_side_wins_by_runs() {
        let first = innings(1, Team::A, 150, 6, 120);
        let second = innings(2, Team::B, 127, 10, 100);
        assert_eq!(
            match_result(&first, &second),
            MatchResult::Won {
                team: Team::A,
                margin: Margin::Runs(23)
            }
        );
    }

    #[test]
    fn test_scores_level_is_a_tie() {
        let first = innings(1, Team::A, 150, 6, 120);
        let second = innings(2, Team::B, 150, 4, 120);
        assert_eq!(match_result(&first, &second), MatchResult::Tie);
    }

    #[test]
    fn test_evaluate_chase_is_none_while_live() {
        let m = fixture(20);
        let first = innings(1, Team::A, 150, 6, 120);
        let second = innings(2, Team::B, 90, 4, 60);
        assert_eq!(evaluate_chase(&m, &first, &second), None);

        let won = innings(2, Team::B, 151, 4, 100);
        assert!(evaluate_chase(&m, &first, &won).is_some());
    }

    #[test]
    fn test_order_requires_live_match() {
        let mut m = fixture(20);
        m.status = MatchStatus::Scheduled;
        let err = check_innings_order(&m, 1, None).unwrap_err();
        assert_eq!(err.code(), "match_state");
    }

    #[test]
    fn test_order_rejects_missing_and_completed_innings() {
        let m = fixture(20);
        let err = check_innings_order(&m, 2, None).unwrap_err();
        assert_eq!(err, ScoringError::InningsOrder("innings 2 has not started".to_string()));

        let mut done = innings(1, Team::A, 10, 0, 120);
        done.complete();
        let err = check_innings_order(&m, 1, Some(done)).unwrap_err();
        assert_eq!(err.code(), "innings_order");

        let err = check_innings_order(&m, 3, None).unwrap_err();
        assert_eq!(err.code(), "innings_order");
    }

    #[test]
    fn test_order_returns_open_innings() {
        let m = fixture(20);
        let open = innings(1, Team::A, 0, 0, 0);
        assert_eq!(check_innings_order(&m, 1, Some(open.clone())), Ok(open));
    }
}
