//! Ball legality and scoring rules.
//!
//! Pure functions: no I/O, no state. The engine calls [`classify`] before it
//! touches storage, so a rejected event never leaves a partial write.

use crate::domain::{BallEvent, BallTally, BallType, RunType};
use thiserror::Error;

/// Most runs a wide or no-ball can carry, the extra itself included.
pub const MAX_EXTRA_RUNS: u8 = 7;
/// Most byes that can be run on one delivery.
pub const MAX_BYES: u8 = 6;
/// Most leg-byes that can be credited on one delivery.
pub const MAX_LEG_BYES: u8 = 6;

/// A ball event that breaks a scoring rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("{runs} runs off the bat is not a valid score")]
    InvalidBatRuns { runs: u8 },
    #[error("{ball_type} must carry between 1 and {max} runs, got {runs}")]
    ExtraRunsOutOfRange {
        ball_type: BallType,
        runs: u8,
        max: u8,
    },
    #[error("leg-byes must be between 1 and 6, got {runs}")]
    LegByesOutOfRange { runs: u8 },
    #[error("byes must be between 0 and 6, got {byes}")]
    ByesOutOfRange { byes: u8 },
    #[error("a dead ball cannot carry runs or byes")]
    DeadBallScored,
    #[error("run type {run_type} is not allowed on a {ball_type} delivery")]
    RunTypeMismatch {
        ball_type: BallType,
        run_type: RunType,
    },
    #[error("a wicket cannot be recorded on a {ball_type} delivery")]
    WicketOnIllegalDelivery { ball_type: BallType },
    #[error("a wicket and runs off the bat cannot fall on the same delivery")]
    WicketWithBatRuns,
    #[error("a wicket marker requires a dismissal kind")]
    MissingWicketKind,
    #[error("innings number must be 1 or 2, got {0}")]
    InvalidInningsNumber(u8),
}

/// Validate a ball event and work out what it contributes.
pub fn classify(event: &BallEvent) -> Result<BallTally, RuleViolation> {
    if !(1..=2).contains(&event.innings_number) {
        return Err(RuleViolation::InvalidInningsNumber(event.innings_number));
    }
    if event.byes > MAX_BYES {
        return Err(RuleViolation::ByesOutOfRange { byes: event.byes });
    }

    match event.ball_type {
        BallType::Good => check_good_ball(event)?,
        BallType::Wide | BallType::NoBall => check_extra_ball(event)?,
        BallType::DeadBall => check_dead_ball(event)?,
    }

    Ok(BallTally::credit(
        event.ball_type,
        event.run_type,
        event.runs,
        event.byes,
        event.wicket.is_some(),
    ))
}

/// Bat runs that can be scored off a single good ball.
pub fn is_valid_bat_score(runs: u8) -> bool {
    runs <= 9 && runs != 5
}

fn check_good_ball(event: &BallEvent) -> Result<(), RuleViolation> {
    match event.run_type {
        RunType::Bat => {
            if !is_valid_bat_score(event.runs) {
                return Err(RuleViolation::InvalidBatRuns { runs: event.runs });
            }
            if event.wicket.is_some() && event.runs > 0 {
                return Err(RuleViolation::WicketWithBatRuns);
            }
        }
        RunType::LegBye => {
            if !(1..=MAX_LEG_BYES).contains(&event.runs) {
                return Err(RuleViolation::LegByesOutOfRange { runs: event.runs });
            }
        }
        RunType::WicketMarker => {
            if event.wicket.is_none() {
                return Err(RuleViolation::MissingWicketKind);
            }
            if event.runs > 0 {
                return Err(RuleViolation::WicketWithBatRuns);
            }
        }
        RunType::WideExtra | RunType::NoBallExtra => {
            return Err(RuleViolation::RunTypeMismatch {
                ball_type: event.ball_type,
                run_type: event.run_type,
            })
        }
    }
    Ok(())
}

fn check_extra_ball(event: &BallEvent) -> Result<(), RuleViolation> {
    let expected = match event.ball_type {
        BallType::Wide => RunType::WideExtra,
        _ => RunType::NoBallExtra,
    };
    if event.run_type != expected {
        return Err(RuleViolation::RunTypeMismatch {
            ball_type: event.ball_type,
            run_type: event.run_type,
        });
    }
    // Run-outs are legal on wides and no-balls in the laws of the game; this
    // ruleset rejects every dismissal on them.
    if event.wicket.is_some() {
        return Err(RuleViolation::WicketOnIllegalDelivery {
            ball_type: event.ball_type,
        });
    }
    if !(1..=MAX_EXTRA_RUNS).contains(&event.runs) {
        return Err(RuleViolation::ExtraRunsOutOfRange {
            ball_type: event.ball_type,
            runs: event.runs,
            max: MAX_EXTRA_RUNS,
        });
    }
    Ok(())
}

fn check_dead_ball(event: &BallEvent) -> Result<(), RuleViolation> {
    if event.wicket.is_some() {
        return Err(RuleViolation::WicketOnIllegalDelivery {
            ball_type: event.ball_type,
        });
    }
    if event.runs > 0 || event.byes > 0 {
        return Err(RuleViolation::DeadBallScored);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchId, WicketKind};

    fn event(ball_type: BallType, run_type: RunType, runs: u8) -> BallEvent {
        BallEvent {
            match_id: MatchId::new(),
            innings_number: 1,
            ball_type,
            run_type,
            runs,
            byes: 0,
            wicket: None,
        }
    }

    #[test]
    fn test_good_ball_scores_are_legal_deliveries() {
        for runs in [0u8, 1, 2, 3, 4, 6, 7, 8, 9] {
            let tally = classify(&event(BallType::Good, RunType::Bat, runs)).unwrap();
            assert!(tally.is_legal_delivery);
            assert_eq!(tally.runs_off_bat, u32::from(runs));
            assert_eq!(tally.extra_runs(), 0);
        }
    }

    #[test]
    fn test_five_off_the_bat_is_rejected() {
        let err = classify(&event(BallType::Good, RunType::Bat, 5)).unwrap_err();
        assert_eq!(err, RuleViolation::InvalidBatRuns { runs: 5 });
        assert!(classify(&event(BallType::Good, RunType::Bat, 10)).is_err());
    }

    #[test]
    fn test_wide_and_no_ball_are_not_legal() {
        for (ty, rt) in [
            (BallType::Wide, RunType::WideExtra),
            (BallType::NoBall, RunType::NoBallExtra),
        ] {
            for runs in 1..=MAX_EXTRA_RUNS {
                let tally = classify(&event(ty, rt, runs)).unwrap();
                assert!(!tally.is_legal_delivery);
                assert_eq!(tally.total(), u32::from(runs));
                assert_eq!(tally.runs_off_bat, 0);
            }
            assert!(matches!(
                classify(&event(ty, rt, 0)),
                Err(RuleViolation::ExtraRunsOutOfRange { .. })
            ));
            assert!(classify(&event(ty, rt, 8)).is_err());
        }
    }

    #[test]
    fn test_extra_ball_needs_matching_run_type() {
        let err = classify(&event(BallType::Wide, RunType::Bat, 1)).unwrap_err();
        assert!(matches!(err, RuleViolation::RunTypeMismatch { .. }));
        let err = classify(&event(BallType::Good, RunType::WideExtra, 1)).unwrap_err();
        assert!(matches!(err, RuleViolation::RunTypeMismatch { .. }));
    }

    // Stricter than the laws: even a run-out is rejected on a wide or no-ball.
    #[test]
    fn test_no_wicket_of_any_kind_on_wide_or_no_ball() {
        let mut e = event(BallType::Wide, RunType::WideExtra, 1);
        e.wicket = Some(WicketKind::RunOut);
        assert_eq!(
            classify(&e).unwrap_err(),
            RuleViolation::WicketOnIllegalDelivery {
                ball_type: BallType::Wide
            }
        );

        let mut e = event(BallType::NoBall, RunType::NoBallExtra, 1);
        e.wicket = Some(WicketKind::Stumped);
        assert!(classify(&e).is_err());
    }

    #[test]
    fn test_dead_ball_must_be_empty() {
        let tally = classify(&event(BallType::DeadBall, RunType::Bat, 0)).unwrap();
        assert!(!tally.is_legal_delivery);
        assert_eq!(tally.total(), 0);

        assert_eq!(
            classify(&event(BallType::DeadBall, RunType::Bat, 1)).unwrap_err(),
            RuleViolation::DeadBallScored
        );
        let mut e = event(BallType::DeadBall, RunType::Bat, 0);
        e.byes = 1;
        assert_eq!(classify(&e).unwrap_err(), RuleViolation::DeadBallScored);
    }

    #[test]
    fn test_byes_count_toward_total_not_bat() {
        let mut e = event(BallType::Good, RunType::Bat, 0);
        e.byes = 4;
        let tally = classify(&e).unwrap();
        assert_eq!(tally.runs_off_bat, 0);
        assert_eq!(tally.byes, 4);
        assert_eq!(tally.total(), 4);

        e.byes = 7;
        assert_eq!(
            classify(&e).unwrap_err(),
            RuleViolation::ByesOutOfRange { byes: 7 }
        );
    }

    #[test]
    fn test_wicket_excludes_bat_runs() {
        let mut e = event(BallType::Good, RunType::WicketMarker, 0);
        e.wicket = Some(WicketKind::Bowled);
        let tally = classify(&e).unwrap();
        assert!(tally.is_wicket);
        assert!(tally.is_legal_delivery);

        e.runs = 2;
        assert_eq!(classify(&e).unwrap_err(), RuleViolation::WicketWithBatRuns);

        let mut e = event(BallType::Good, RunType::Bat, 4);
        e.wicket = Some(WicketKind::Caught);
        assert_eq!(classify(&e).unwrap_err(), RuleViolation::WicketWithBatRuns);
    }

    #[test]
    fn test_wicket_marker_needs_kind() {
        let e = event(BallType::Good, RunType::WicketMarker, 0);
        assert_eq!(classify(&e).unwrap_err(), RuleViolation::MissingWicketKind);
    }

    #[test]
    fn test_leg_byes_range() {
        assert_eq!(
            classify(&event(BallType::Good, RunType::LegBye, 3))
                .unwrap()
                .leg_byes,
            3
        );
        assert!(classify(&event(BallType::Good, RunType::LegBye, 0)).is_err());
    }

    #[test]
    fn test_innings_number_checked() {
        let mut e = event(BallType::Good, RunType::Bat, 1);
        e.innings_number = 3;
        assert_eq!(
            classify(&e).unwrap_err(),
            RuleViolation::InvalidInningsNumber(3)
        );
    }

    #[test]
    fn test_violation_message_names_rule() {
        let err = classify(&event(BallType::Good, RunType::Bat, 5)).unwrap_err();
        assert_eq!(err.to_string(), "5 runs off the bat is not a valid score");
    }
}
