//! In-process store for tests and local runs.

use super::{ScoreStore, StoreError};
use crate::domain::{Ball, BallId, Innings, InningsId, Match, MatchId, Over, OverId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    matches: HashMap<MatchId, Match>,
    innings: HashMap<InningsId, Innings>,
    overs: HashMap<OverId, Over>,
    balls: HashMap<BallId, Ball>,
}

/// Store that keeps every row in memory and enforces the same uniqueness
/// and parent-existence rules as the SQLite schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of balls held, across all matches.
    pub async fn ball_count(&self) -> usize {
        self.tables.read().await.balls.len()
    }

    /// Total number of overs held, across all matches.
    pub async fn over_count(&self) -> usize {
        self.tables.read().await.overs.len()
    }
}

fn missing(kind: &str, id: impl std::fmt::Display) -> StoreError {
    StoreError::NotFound(format!("{} {}", kind, id))
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn create_match(&self, fixture: &Match) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.matches.values().any(|m| {
            m.id == fixture.id
                || (m.series_id == fixture.series_id && m.match_number == fixture.match_number)
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "match {} of series {}",
                fixture.match_number, fixture.series_id
            )));
        }
        tables.matches.insert(fixture.id, fixture.clone());
        Ok(())
    }

    async fn get_match(&self, id: MatchId) -> Result<Match, StoreError> {
        let tables = self.tables.read().await;
        tables
            .matches
            .get(&id)
            .cloned()
            .ok_or_else(|| missing("match", id))
    }

    async fn list_matches_by_series(&self, series_id: &str) -> Result<Vec<Match>, StoreError> {
        let tables = self.tables.read().await;
        let mut matches: Vec<Match> = tables
            .matches
            .values()
            .filter(|m| m.series_id == series_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| m.match_number);
        Ok(matches)
    }

    async fn count_matches_by_series(&self, series_id: &str) -> Result<u64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .matches
            .values()
            .filter(|m| m.series_id == series_id)
            .count() as u64)
    }

    async fn update_match(&self, fixture: &Match) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        match tables.matches.get_mut(&fixture.id) {
            Some(row) => {
                *row = fixture.clone();
                Ok(())
            }
            None => Err(missing("match", fixture.id)),
        }
    }

    async fn create_innings(&self, innings: &Innings) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.matches.contains_key(&innings.match_id) {
            return Err(missing("match", innings.match_id));
        }
        let duplicate = tables.innings.values().any(|i| {
            i.match_id == innings.match_id && i.innings_number == innings.innings_number
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "innings {} of match {}",
                innings.innings_number, innings.match_id
            )));
        }
        tables.innings.insert(innings.id, innings.clone());
        Ok(())
    }

    async fn get_innings(
        &self,
        match_id: MatchId,
        innings_number: u8,
    ) -> Result<Option<Innings>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .innings
            .values()
            .find(|i| i.match_id == match_id && i.innings_number == innings_number)
            .cloned())
    }

    async fn list_innings(&self, match_id: MatchId) -> Result<Vec<Innings>, StoreError> {
        let tables = self.tables.read().await;
        let mut innings: Vec<Innings> = tables
            .innings
            .values()
            .filter(|i| i.match_id == match_id)
            .cloned()
            .collect();
        innings.sort_by_key(|i| i.innings_number);
        Ok(innings)
    }

    async fn update_innings(&self, innings: &Innings) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        match tables.innings.get_mut(&innings.id) {
            Some(row) => {
                *row = innings.clone();
                Ok(())
            }
            None => Err(missing("innings", innings.id)),
        }
    }

    async fn get_over(&self, id: OverId) -> Result<Over, StoreError> {
        let tables = self.tables.read().await;
        tables
            .overs
            .get(&id)
            .cloned()
            .ok_or_else(|| missing("over", id))
    }

    async fn list_overs(&self, innings_id: InningsId) -> Result<Vec<Over>, StoreError> {
        let tables = self.tables.read().await;
        let mut overs: Vec<Over> = tables
            .overs
            .values()
            .filter(|o| o.innings_id == innings_id)
            .cloned()
            .collect();
        overs.sort_by_key(|o| o.over_number);
        Ok(overs)
    }

    async fn update_over(&self, over: &Over) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        match tables.overs.get_mut(&over.id) {
            Some(row) => {
                *row = over.clone();
                Ok(())
            }
            None => Err(missing("over", over.id)),
        }
    }

    async fn delete_over(&self, id: OverId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.overs.remove(&id).is_none() {
            return Err(missing("over", id));
        }
        tables.balls.retain(|_, b| b.over_id != id);
        Ok(())
    }

    async fn append_ball(&self, new_over: Option<&Over>, ball: &Ball) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        // Check everything before the first insert so a rejected append leaves no row.
        if let Some(over) = new_over {
            if !tables.innings.contains_key(&over.innings_id) {
                return Err(missing("innings", over.innings_id));
            }
            let taken = tables
                .overs
                .values()
                .any(|o| o.innings_id == over.innings_id && o.over_number == over.over_number);
            if taken {
                return Err(StoreError::Conflict(format!(
                    "over {} of innings {}",
                    over.over_number, over.innings_id
                )));
            }
        } else if !tables.overs.contains_key(&ball.over_id) {
            return Err(missing("over", ball.over_id));
        }
        let taken = tables
            .balls
            .values()
            .any(|b| b.over_id == ball.over_id && b.ball_number == ball.ball_number);
        if taken {
            return Err(StoreError::Conflict(format!(
                "ball {} of over {}",
                ball.ball_number, ball.over_id
            )));
        }

        if let Some(over) = new_over {
            tables.overs.insert(over.id, over.clone());
        }
        tables.balls.insert(ball.id, ball.clone());
        Ok(())
    }

    async fn list_balls(&self, over_id: OverId) -> Result<Vec<Ball>, StoreError> {
        let tables = self.tables.read().await;
        let mut balls: Vec<Ball> = tables
            .balls
            .values()
            .filter(|b| b.over_id == over_id)
            .cloned()
            .collect();
        balls.sort_by_key(|b| b.ball_number);
        Ok(balls)
    }

    async fn delete_ball(&self, id: BallId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        match tables.balls.remove(&id) {
            Some(_) => Ok(()),
            None => Err(missing("ball", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BallEvent, BallType, NewMatch, RunType, Team, TossDecision};

    fn fixture(number: u32) -> Match {
        Match::schedule(NewMatch {
            series_id: "s1".to_string(),
            match_number: number,
            team_a: "Lions".to_string(),
            team_b: "Tigers".to_string(),
            total_overs: 20,
            toss_winner: Team::A,
            toss_decision: TossDecision::Field,
        })
    }

    fn ball(over_id: OverId, n: u32) -> Ball {
        let event = BallEvent {
            match_id: MatchId::new(),
            innings_number: 1,
            ball_type: BallType::Good,
            run_type: RunType::Bat,
            runs: 1,
            byes: 0,
            wicket: None,
        };
        Ball::record(over_id, n, &event)
    }

    #[tokio::test]
    async fn test_duplicate_match_number_conflicts() {
        let store = MemoryStore::new();
        store.create_match(&fixture(1)).await.unwrap();
        let err = store.create_match(&fixture(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        store.create_match(&fixture(2)).await.unwrap();
        assert_eq!(store.count_matches_by_series("s1").await.unwrap(), 2);
        assert_eq!(store.count_matches_by_series("other").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_missing_match() {
        let store = MemoryStore::new();
        let err = store.get_match(MatchId::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_append_ball_opens_over_atomically() {
        let store = MemoryStore::new();
        let m = fixture(1);
        store.create_match(&m).await.unwrap();
        let innings = Innings::open(m.id, 1, Team::A);
        store.create_innings(&innings).await.unwrap();

        let over = Over::open(innings.id, 1);
        store.append_ball(Some(&over), &ball(over.id, 1)).await.unwrap();

        // Same over number again: rejected, and the ball is not stored either.
        let clash = Over::open(innings.id, 1);
        let err = store
            .append_ball(Some(&clash), &ball(clash.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.ball_count().await, 1);
        assert_eq!(store.over_count().await, 1);

        let err = store
            .append_ball(None, &ball(over.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        store.append_ball(None, &ball(over.id, 2)).await.unwrap();
        let balls = store.list_balls(over.id).await.unwrap();
        assert_eq!(
            balls.iter().map(|b| b.ball_number).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[tokio::test]
    async fn test_delete_over_removes_its_balls() {
        let store = MemoryStore::new();
        let m = fixture(1);
        store.create_match(&m).await.unwrap();
        let innings = Innings::open(m.id, 1, Team::A);
        store.create_innings(&innings).await.unwrap();
        let over = Over::open(innings.id, 1);
        store.append_ball(Some(&over), &ball(over.id, 1)).await.unwrap();

        store.delete_over(over.id).await.unwrap();
        assert_eq!(store.ball_count().await, 0);
        assert!(store.list_overs(innings.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_innings_unique_per_match() {
        let store = MemoryStore::new();
        let m = fixture(1);
        store.create_match(&m).await.unwrap();
        store
            .create_innings(&Innings::open(m.id, 1, Team::A))
            .await
            .unwrap();
        let err = store
            .create_innings(&Innings::open(m.id, 1, Team::B))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store.get_innings(m.id, 2).await.unwrap().is_none());
    }
}
