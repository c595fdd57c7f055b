//! Cache key scheme.
//!
//! Every cached projection lives under a versioned namespace
//! `{namespace}:v{n}:{suffix}`. Bumping `{namespace}:version` orphans every
//! entry of the previous version at once; orphans age out through their TTL.
//! A reader that loaded before the bump can only populate the old version.

use crate::domain::{MatchId, OverId};

/// Projections derived from one match: fixture, innings, scorecard, current over.
pub fn match_ns(match_id: MatchId) -> String {
    format!("match:{}", match_id)
}

/// Ball list of one over.
pub fn over_ns(over_id: OverId) -> String {
    format!("over:{}", over_id)
}

/// Listings and counts of a series.
pub fn series_ns(series_id: &str) -> String {
    format!("series:{}", series_id)
}

/// Version counter of a namespace.
pub fn version(namespace: &str) -> String {
    format!("{}:version", namespace)
}

/// A projection under one version of a namespace.
pub fn scoped(namespace: &str, version: i64, suffix: &str) -> String {
    format!("{}:v{}:{}", namespace, version, suffix)
}

pub const FIXTURE: &str = "fixture";
pub const SCORECARD: &str = "scorecard";
pub const BALLS: &str = "balls";
pub const MATCHES: &str = "matches";
pub const COUNT: &str = "count";

pub fn innings(innings_number: u8) -> String {
    format!("innings:{}", innings_number)
}

pub fn current_over(innings_number: u8) -> String {
    format!("innings:{}:current_over", innings_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_key_shapes() {
        let nil = Uuid::nil();
        let ns = match_ns(MatchId(nil));
        assert_eq!(ns, format!("match:{}", nil));
        assert_eq!(version(&ns), format!("match:{}:version", nil));
        assert_eq!(
            scoped(&ns, 3, &current_over(2)),
            format!("match:{}:v3:innings:2:current_over", nil)
        );
        assert_eq!(
            scoped(&series_ns("ipl-2024"), 0, COUNT),
            "series:ipl-2024:v0:count"
        );
        assert_eq!(
            scoped(&over_ns(OverId(nil)), 1, BALLS),
            format!("over:{}:v1:balls", nil)
        );
    }

    #[test]
    fn test_versions_do_not_collide() {
        let ns = match_ns(MatchId::new());
        assert_ne!(scoped(&ns, 1, SCORECARD), scoped(&ns, 2, SCORECARD));
    }
}
