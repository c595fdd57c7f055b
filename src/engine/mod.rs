//! Scorecard engine: the ball-by-ball state machine.
//!
//! Every mutating call for a match runs under that match's lock, reads the
//! current state straight from the store, persists, refolds aggregates from
//! their children and then hands cache invalidation and the live event to a
//! spawned task. The spawned tail runs to completion even if the caller's
//! future is dropped after the write landed.
//!
//! Read projections go through [`ScoreCache`] and are never written at write
//! time: writes only bump the versions of the namespaces they touch.

pub mod error;
pub mod locks;
pub mod progression;

pub use error::ScoringError;
pub use locks::MatchLocks;
pub use progression::InningsEnd;

use crate::broadcast::{room_for, BroadcastSink, ScoreEvent};
use crate::cache::{keys, ScoreCache};
use crate::domain::{
    next_ball_number, next_over_number, Ball, BallEvent, Innings, Match, MatchId, MatchResult,
    MatchStatus, NewMatch, Over, OverId, OverView, ScoreLine, Scorecard,
};
use crate::rules::{self, RuleViolation};
use crate::store::{bounded, ScoreStore, StoreError};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest match format accepted at setup.
pub const MAX_OVERS: u32 = 50;

/// Engine tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Deadline for each repository call.
    pub store_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(2),
        }
    }
}

/// Collaborators the engine is built from.
#[derive(Debug, Clone)]
pub struct EngineContext {
    pub store: Arc<dyn ScoreStore>,
    pub cache: ScoreCache,
    pub broadcaster: Arc<dyn BroadcastSink>,
    pub settings: EngineSettings,
}

/// What a recorded ball changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallOutcome {
    pub ball: Ball,
    pub over: Over,
    pub innings: Innings,
    /// Why the innings ended, if this ball ended it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub innings_end: Option<InningsEnd>,
    /// The second innings, when this ball closed the first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_innings: Option<Innings>,
    /// Set when this ball decided the match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_result: Option<MatchResult>,
}

/// What an undo removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoOutcome {
    pub removed: Ball,
    /// The over after removal; `None` when the over was left empty and deleted.
    pub over: Option<Over>,
    pub innings: Innings,
}

/// Cache namespaces to bump and events to publish once a write is durable.
#[derive(Debug)]
struct WriteTail {
    match_id: MatchId,
    namespaces: Vec<String>,
    events: Vec<ScoreEvent>,
}

impl WriteTail {
    fn new(match_id: MatchId) -> Self {
        Self {
            match_id,
            namespaces: vec![keys::match_ns(match_id)],
            events: Vec::new(),
        }
    }

    fn touch(mut self, namespace: String) -> Self {
        self.namespaces.push(namespace);
        self
    }

    fn emit(mut self, event: ScoreEvent) -> Self {
        self.events.push(event);
        self
    }

    async fn run(self, ctx: &EngineContext) {
        for namespace in &self.namespaces {
            ctx.cache.invalidate_namespace(namespace).await;
        }
        let room = room_for(self.match_id);
        for event in self.events {
            ctx.broadcaster.publish(&room, event);
        }
    }
}

/// Ball-by-ball scoring over a store, a cache and a broadcast sink.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    ctx: Arc<EngineContext>,
    locks: Arc<MatchLocks>,
}

impl ScoringEngine {
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            locks: Arc::new(MatchLocks::new()),
        }
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    async fn call<T, F>(&self, op: &'static str, call: F) -> Result<T, ScoringError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        Ok(bounded(self.ctx.settings.store_timeout, op, call).await?)
    }

    /// Run the post-write tail in its own task and wait for it.
    async fn finish(&self, tail: WriteTail) {
        let ctx = self.ctx.clone();
        let handle = tokio::spawn(async move { tail.run(&ctx).await });
        if let Err(e) = handle.await {
            warn!(error = %e, "Post-write task failed");
        }
    }

    /// Register a new match in `scheduled` state.
    pub async fn create_match(&self, new: NewMatch) -> Result<Match, ScoringError> {
        validate_setup(&new)?;
        let fixture = Match::schedule(new);
        self.call("create_match", self.ctx.store.create_match(&fixture))
            .await?;

        info!(
            match_id = %fixture.id,
            series_id = %fixture.series_id,
            match_number = fixture.match_number,
            "Match scheduled"
        );
        self.finish(WriteTail::new(fixture.id).touch(keys::series_ns(&fixture.series_id)))
            .await;
        Ok(fixture)
    }

    /// Open innings 1 with the side that bats first and put the match live.
    pub async fn start_scoring(&self, match_id: MatchId) -> Result<Innings, ScoringError> {
        let _guard = self.locks.acquire(match_id).await;

        let mut fixture = self
            .call("get_match", self.ctx.store.get_match(match_id))
            .await?;
        if fixture.status != MatchStatus::Scheduled {
            return Err(ScoringError::MatchState(format!(
                "match {} is already {}",
                match_id,
                fixture.status.as_str()
            )));
        }

        // A previous attempt may have opened innings 1 before failing to
        // flip the match status; pick it up instead of rejecting.
        let innings = match self
            .call("get_innings", self.ctx.store.get_innings(match_id, 1))
            .await?
        {
            Some(innings) => innings,
            None => {
                let innings = Innings::open(match_id, 1, fixture.initial_batting);
                self.call("create_innings", self.ctx.store.create_innings(&innings))
                    .await?;
                innings
            }
        };

        fixture
            .transition(MatchStatus::Live)
            .map_err(|e| ScoringError::MatchState(e.to_string()))?;
        self.call("update_match", self.ctx.store.update_match(&fixture))
            .await?;

        info!(
            match_id = %match_id,
            batting_team = innings.batting_team.as_str(),
            "Scoring started"
        );
        self.finish(
            WriteTail::new(match_id)
                .touch(keys::series_ns(&fixture.series_id))
                .emit(ScoreEvent::InningsStarted {
                    match_id,
                    innings_number: 1,
                    batting_team: innings.batting_team,
                }),
        )
        .await;
        Ok(innings)
    }

    /// Record one delivery and advance the over, innings and match.
    ///
    /// A ball that breaks the rules writes nothing. A storage failure after
    /// the ball is stored leaves the ball in place;
    /// [`rebuild_innings`](Self::rebuild_innings) refolds any aggregate left
    /// behind, and the next write for the match finishes an innings or match
    /// boundary the failure cut short.
    pub async fn add_ball(&self, event: BallEvent) -> Result<BallOutcome, ScoringError> {
        rules::classify(&event)?;

        let match_id = event.match_id;
        let innings_number = event.innings_number;
        let store = &self.ctx.store;
        let _guard = self.locks.acquire(match_id).await;

        let mut fixture = self.call("get_match", store.get_match(match_id)).await?;
        self.settle_boundary(&mut fixture).await?;
        let current = self
            .call("get_innings", store.get_innings(match_id, innings_number))
            .await?;
        let mut innings = progression::check_innings_order(&fixture, innings_number, current)?;

        let mut overs = self.call("list_overs", store.list_overs(innings.id)).await?;
        let (mut over, mut balls, opens_over) = self.current_over(&innings, &mut overs).await?;

        let first = if innings_number == 2 {
            self.call("get_innings", store.get_innings(match_id, 1))
                .await?
        } else {
            None
        };
        let target = first.as_ref().map(progression::target_for);

        // The closing ball of this innings may have landed without its status.
        let mut standing = overs.clone();
        standing.retain(|o| o.id != over.id);
        standing.push(over.clone());
        innings.recompute(&standing);
        if progression::innings_end(&innings, &fixture, target).is_some() {
            warn!(
                match_id = %match_id,
                innings = innings_number,
                "Closing innings left open by an interrupted write"
            );
            innings.complete();
            self.call("update_innings", store.update_innings(&innings))
                .await?;
            self.finish(WriteTail::new(match_id).emit(ScoreEvent::InningsCompleted {
                match_id,
                innings_number,
                score: ScoreLine::of(&innings),
            }))
            .await;
            self.settle_boundary(&mut fixture).await?;
            return Err(ScoringError::InningsOrder(format!(
                "innings {} is already completed",
                innings_number
            )));
        }

        let ball = Ball::record(over.id, next_ball_number(&balls), &event);
        self.call(
            "append_ball",
            store.append_ball(opens_over.then_some(&over), &ball),
        )
        .await?;

        balls.push(ball.clone());
        over.recompute(&balls);
        self.call("update_over", store.update_over(&over)).await?;
        overs.retain(|o| o.id != over.id);
        overs.push(over.clone());

        innings.recompute(&overs);
        let innings_end = progression::innings_end(&innings, &fixture, target);
        if innings_end.is_some() {
            innings.complete();
        }
        self.call("update_innings", store.update_innings(&innings))
            .await?;

        debug!(
            match_id = %match_id,
            innings = innings_number,
            over = over.over_number,
            ball = ball.ball_number,
            runs = innings.total_runs,
            wickets = innings.total_wickets,
            "Ball recorded"
        );

        let mut tail = WriteTail::new(match_id)
            .touch(keys::over_ns(over.id))
            .emit(ScoreEvent::BallAdded {
                match_id,
                innings_number,
                score: ScoreLine::of(&innings),
                over: over.clone(),
                ball: ball.clone(),
            });
        let mut next_innings = None;
        let mut match_result = None;

        if let Some(reason) = innings_end {
            info!(
                match_id = %match_id,
                innings = innings_number,
                ?reason,
                runs = innings.total_runs,
                wickets = innings.total_wickets,
                "Innings completed"
            );
            tail = tail.emit(ScoreEvent::InningsCompleted {
                match_id,
                innings_number,
                score: ScoreLine::of(&innings),
            });

            match first {
                None if innings_number == 1 => {
                    let second = Innings::open(match_id, 2, innings.batting_team.opponent());
                    self.call("create_innings", store.create_innings(&second))
                        .await?;
                    info!(
                        match_id = %match_id,
                        batting_team = second.batting_team.as_str(),
                        target = progression::target_for(&innings),
                        "Second innings started"
                    );
                    tail = tail.emit(ScoreEvent::InningsStarted {
                        match_id,
                        innings_number: 2,
                        batting_team: second.batting_team,
                    });
                    next_innings = Some(second);
                }
                Some(first) => {
                    let result = progression::match_result(&first, &innings);
                    fixture
                        .complete(result)
                        .map_err(|e| ScoringError::MatchState(e.to_string()))?;
                    self.call("update_match", store.update_match(&fixture))
                        .await?;
                    let summary = fixture.result_summary().unwrap_or_default();
                    info!(match_id = %match_id, result = %summary, "Match completed");
                    tail = tail
                        .touch(keys::series_ns(&fixture.series_id))
                        .emit(ScoreEvent::MatchCompleted {
                            match_id,
                            result,
                            summary,
                        });
                    match_result = Some(result);
                    self.locks.forget(match_id);
                }
                None => {
                    return Err(ScoringError::NotFound(format!(
                        "innings 1 of match {}",
                        match_id
                    )))
                }
            }
        }

        self.finish(tail).await;
        Ok(BallOutcome {
            ball,
            over,
            innings,
            innings_end,
            next_innings,
            match_result,
        })
    }

    /// Carry a live match across a boundary an interrupted write left half
    /// done: a completed first innings with no second, or a completed second
    /// innings on a match that is still live.
    ///
    /// Callers hold the match lock.
    async fn settle_boundary(&self, fixture: &mut Match) -> Result<(), ScoringError> {
        if fixture.status != MatchStatus::Live {
            return Ok(());
        }
        let store = &self.ctx.store;
        let match_id = fixture.id;
        let Some(first) = self
            .call("get_innings", store.get_innings(match_id, 1))
            .await?
        else {
            return Ok(());
        };
        if first.is_in_progress() {
            return Ok(());
        }

        let tail = match self
            .call("get_innings", store.get_innings(match_id, 2))
            .await?
        {
            None => {
                let second = Innings::open(match_id, 2, first.batting_team.opponent());
                self.call("create_innings", store.create_innings(&second))
                    .await?;
                warn!(
                    match_id = %match_id,
                    batting_team = second.batting_team.as_str(),
                    "Opened second innings missed by an interrupted write"
                );
                WriteTail::new(match_id).emit(ScoreEvent::InningsStarted {
                    match_id,
                    innings_number: 2,
                    batting_team: second.batting_team,
                })
            }
            Some(second) if !second.is_in_progress() => {
                let result = progression::match_result(&first, &second);
                fixture
                    .complete(result)
                    .map_err(|e| ScoringError::MatchState(e.to_string()))?;
                self.call("update_match", store.update_match(fixture))
                    .await?;
                let summary = fixture.result_summary().unwrap_or_default();
                warn!(
                    match_id = %match_id,
                    result = %summary,
                    "Recorded result missed by an interrupted write"
                );
                self.locks.forget(match_id);
                WriteTail::new(match_id)
                    .touch(keys::series_ns(&fixture.series_id))
                    .emit(ScoreEvent::MatchCompleted {
                        match_id,
                        result,
                        summary,
                    })
            }
            Some(_) => return Ok(()),
        };
        self.finish(tail).await;
        Ok(())
    }

    /// The over the next ball goes into, its balls so far, and whether it
    /// still has to be created.
    ///
    /// A stored over that is open but already holds six legal balls (left by
    /// an interrupted write) is repaired and closed first.
    async fn current_over(
        &self,
        innings: &Innings,
        overs: &mut Vec<Over>,
    ) -> Result<(Over, Vec<Ball>, bool), ScoringError> {
        let store = &self.ctx.store;
        if let Some(mut open) = overs.last().filter(|o| !o.is_completed()).cloned() {
            let balls = self.call("list_balls", store.list_balls(open.id)).await?;
            open.recompute(&balls);
            if !open.is_completed() {
                return Ok((open, balls, false));
            }
            warn!(over_id = %open.id, "Closing over left open by an interrupted write");
            self.call("update_over", store.update_over(&open)).await?;
            if let Some(last) = overs.last_mut() {
                *last = open;
            }
        }
        Ok((
            Over::open(innings.id, next_over_number(overs)),
            Vec::new(),
            true,
        ))
    }

    /// Remove the most recent ball of an open innings.
    ///
    /// Completed innings are immutable: undo never reopens an innings or
    /// reverses a match result.
    pub async fn undo_ball(
        &self,
        match_id: MatchId,
        innings_number: u8,
    ) -> Result<UndoOutcome, ScoringError> {
        let store = &self.ctx.store;
        let _guard = self.locks.acquire(match_id).await;

        let mut fixture = self.call("get_match", store.get_match(match_id)).await?;
        self.settle_boundary(&mut fixture).await?;
        let current = self
            .call("get_innings", store.get_innings(match_id, innings_number))
            .await?;
        let mut innings = progression::check_innings_order(&fixture, innings_number, current)?;

        let mut overs = self.call("list_overs", store.list_overs(innings.id)).await?;
        let (mut over, mut balls) = loop {
            let Some(last) = overs.pop() else {
                return Err(ScoringError::NothingToUndo(innings_number));
            };
            let balls = self.call("list_balls", store.list_balls(last.id)).await?;
            if !balls.is_empty() {
                break (last, balls);
            }
            warn!(over_id = %last.id, "Removing empty over left by an interrupted undo");
            self.call("delete_over", store.delete_over(last.id)).await?;
        };

        balls.sort_by_key(|b| b.ball_number);
        let Some(removed) = balls.pop() else {
            return Err(ScoringError::NothingToUndo(innings_number));
        };
        self.call("delete_ball", store.delete_ball(removed.id)).await?;

        let over_id = over.id;
        let over_after = if balls.is_empty() {
            self.call("delete_over", store.delete_over(over.id)).await?;
            None
        } else {
            over.recompute(&balls);
            self.call("update_over", store.update_over(&over)).await?;
            overs.push(over.clone());
            Some(over)
        };

        innings.recompute(&overs);
        self.call("update_innings", store.update_innings(&innings))
            .await?;

        info!(
            match_id = %match_id,
            innings = innings_number,
            ball_id = %removed.id,
            runs = innings.total_runs,
            wickets = innings.total_wickets,
            "Ball undone"
        );
        self.finish(
            WriteTail::new(match_id)
                .touch(keys::over_ns(over_id))
                .emit(ScoreEvent::BallUndone {
                    match_id,
                    innings_number,
                    score: ScoreLine::of(&innings),
                    over: over_after.clone(),
                    removed: removed.clone(),
                }),
        )
        .await;

        Ok(UndoOutcome {
            removed,
            over: over_after,
            innings,
        })
    }

    /// Cancel a scheduled or live match.
    pub async fn cancel_match(&self, match_id: MatchId) -> Result<Match, ScoringError> {
        let _guard = self.locks.acquire(match_id).await;

        let mut fixture = self
            .call("get_match", self.ctx.store.get_match(match_id))
            .await?;
        fixture
            .transition(MatchStatus::Cancelled)
            .map_err(|e| ScoringError::MatchState(e.to_string()))?;
        self.call("update_match", self.ctx.store.update_match(&fixture))
            .await?;

        info!(match_id = %match_id, "Match cancelled");
        self.finish(
            WriteTail::new(match_id)
                .touch(keys::series_ns(&fixture.series_id))
                .emit(ScoreEvent::MatchCancelled { match_id }),
        )
        .await;
        self.locks.forget(match_id);
        Ok(fixture)
    }

    /// Refold the stored over and innings aggregates of one innings from its
    /// balls, then finish any innings or match boundary left half done.
    /// The rebuilt innings keeps its stored status.
    pub async fn rebuild_innings(
        &self,
        match_id: MatchId,
        innings_number: u8,
    ) -> Result<Innings, ScoringError> {
        let store = &self.ctx.store;
        let _guard = self.locks.acquire(match_id).await;

        let mut innings = self
            .call("get_innings", store.get_innings(match_id, innings_number))
            .await?
            .ok_or_else(|| {
                ScoringError::NotFound(format!("innings {} of match {}", innings_number, match_id))
            })?;

        let mut overs = self.call("list_overs", store.list_overs(innings.id)).await?;
        let mut touched = Vec::new();
        for over in overs.iter_mut() {
            let balls = self.call("list_balls", store.list_balls(over.id)).await?;
            let before = over.clone();
            over.recompute(&balls);
            if *over != before {
                self.call("update_over", store.update_over(over)).await?;
                touched.push(keys::over_ns(over.id));
            }
        }

        innings.recompute(&overs);
        self.call("update_innings", store.update_innings(&innings))
            .await?;
        let mut fixture = self.call("get_match", store.get_match(match_id)).await?;
        self.settle_boundary(&mut fixture).await?;

        info!(
            match_id = %match_id,
            innings = innings_number,
            repaired_overs = touched.len(),
            "Innings aggregates rebuilt"
        );
        let tail = touched
            .into_iter()
            .fold(WriteTail::new(match_id), WriteTail::touch);
        self.finish(tail).await;
        Ok(innings)
    }

    /// Whole-match projection, recomputed from the ball log on a cache miss.
    pub async fn get_scorecard(&self, match_id: MatchId) -> Result<Scorecard, ScoringError> {
        self.ctx
            .cache
            .get_or_set_versioned(
                &keys::match_ns(match_id),
                keys::SCORECARD,
                self.ctx.cache.policy().aggregate_ttl,
                || self.load_scorecard(match_id),
            )
            .await
    }

    async fn load_scorecard(&self, match_id: MatchId) -> Result<Scorecard, ScoringError> {
        let store = &self.ctx.store;
        let fixture = self.call("get_match", store.get_match(match_id)).await?;
        let all_innings = self
            .call("list_innings", store.list_innings(match_id))
            .await?;

        let mut parts = Vec::with_capacity(all_innings.len());
        for innings in all_innings {
            let overs = self.call("list_overs", store.list_overs(innings.id)).await?;
            let views = try_join_all(overs.into_iter().map(|over| async move {
                let balls = self.call("list_balls", store.list_balls(over.id)).await?;
                Ok::<_, ScoringError>(OverView::assemble(over, balls))
            }))
            .await?;
            parts.push((innings, views));
        }

        Ok(Scorecard::assemble(fixture, parts))
    }

    /// The latest over of an innings with its balls; `None` before the first ball.
    pub async fn get_current_over(
        &self,
        match_id: MatchId,
        innings_number: u8,
    ) -> Result<Option<OverView>, ScoringError> {
        if !(1..=2).contains(&innings_number) {
            return Err(RuleViolation::InvalidInningsNumber(innings_number).into());
        }
        self.ctx
            .cache
            .get_or_set_versioned(
                &keys::match_ns(match_id),
                &keys::current_over(innings_number),
                self.ctx.cache.policy().aggregate_ttl,
                || self.load_current_over(match_id, innings_number),
            )
            .await
    }

    async fn load_current_over(
        &self,
        match_id: MatchId,
        innings_number: u8,
    ) -> Result<Option<OverView>, ScoringError> {
        let store = &self.ctx.store;
        self.call("get_match", store.get_match(match_id)).await?;
        let Some(innings) = self
            .call("get_innings", store.get_innings(match_id, innings_number))
            .await?
        else {
            return Ok(None);
        };
        let overs = self.call("list_overs", store.list_overs(innings.id)).await?;
        let Some(over) = overs.into_iter().max_by_key(|o| o.over_number) else {
            return Ok(None);
        };
        let balls = self.call("list_balls", store.list_balls(over.id)).await?;
        Ok(Some(OverView::assemble(over, balls)))
    }

    /// Deliveries of one over in bowling order.
    pub async fn get_balls_by_over(&self, over_id: OverId) -> Result<Vec<Ball>, ScoringError> {
        self.ctx
            .cache
            .get_or_set_versioned(
                &keys::over_ns(over_id),
                keys::BALLS,
                self.ctx.cache.policy().aggregate_ttl,
                || self.load_over_balls(over_id),
            )
            .await
    }

    async fn load_over_balls(&self, over_id: OverId) -> Result<Vec<Ball>, ScoringError> {
        let store = &self.ctx.store;
        self.call("get_over", store.get_over(over_id)).await?;
        let mut balls = self.call("list_balls", store.list_balls(over_id)).await?;
        balls.sort_by_key(|b| b.ball_number);
        Ok(balls)
    }

    /// Advisory: the result if the match is decided, from cached state.
    pub async fn should_complete_match(
        &self,
        match_id: MatchId,
    ) -> Result<Option<MatchResult>, ScoringError> {
        let fixture = self.cached_fixture(match_id).await?;
        if fixture.status == MatchStatus::Completed {
            return Ok(fixture.result);
        }
        if fixture.status != MatchStatus::Live {
            return Ok(None);
        }

        let (Some(first), Some(second)) = (
            self.cached_innings(match_id, 1).await?,
            self.cached_innings(match_id, 2).await?,
        ) else {
            return Ok(None);
        };
        Ok(progression::evaluate_chase(&fixture, &first, &second))
    }

    /// Advisory: whether balls may be recorded against `innings_number` now.
    pub async fn validate_innings_order(
        &self,
        match_id: MatchId,
        innings_number: u8,
    ) -> Result<(), ScoringError> {
        let fixture = self.cached_fixture(match_id).await?;
        let innings = if (1..=2).contains(&innings_number) {
            self.cached_innings(match_id, innings_number).await?
        } else {
            None
        };
        progression::check_innings_order(&fixture, innings_number, innings).map(|_| ())
    }

    /// Whether the store answers within the storage deadline.
    pub async fn storage_ready(&self) -> Result<(), ScoringError> {
        self.call("ping", self.ctx.store.ping()).await
    }

    /// Matches of a series in match-number order.
    pub async fn list_matches_by_series(&self, series_id: &str) -> Result<Vec<Match>, ScoringError> {
        self.ctx
            .cache
            .get_or_set_versioned(
                &keys::series_ns(series_id),
                keys::MATCHES,
                self.ctx.cache.policy().list_ttl,
                || {
                    self.call(
                        "list_matches_by_series",
                        self.ctx.store.list_matches_by_series(series_id),
                    )
                },
            )
            .await
    }

    pub async fn count_matches_by_series(&self, series_id: &str) -> Result<u64, ScoringError> {
        self.ctx
            .cache
            .get_or_set_versioned(
                &keys::series_ns(series_id),
                keys::COUNT,
                self.ctx.cache.policy().list_ttl,
                || {
                    self.call(
                        "count_matches_by_series",
                        self.ctx.store.count_matches_by_series(series_id),
                    )
                },
            )
            .await
    }

    async fn cached_fixture(&self, match_id: MatchId) -> Result<Match, ScoringError> {
        self.ctx
            .cache
            .get_or_set_versioned(
                &keys::match_ns(match_id),
                keys::FIXTURE,
                self.ctx.cache.policy().reference_ttl,
                || self.call("get_match", self.ctx.store.get_match(match_id)),
            )
            .await
    }

    async fn cached_innings(
        &self,
        match_id: MatchId,
        innings_number: u8,
    ) -> Result<Option<Innings>, ScoringError> {
        self.ctx
            .cache
            .get_or_set_versioned(
                &keys::match_ns(match_id),
                &keys::innings(innings_number),
                self.ctx.cache.policy().aggregate_ttl,
                || {
                    self.call(
                        "get_innings",
                        self.ctx.store.get_innings(match_id, innings_number),
                    )
                },
            )
            .await
    }
}

fn validate_setup(new: &NewMatch) -> Result<(), ScoringError> {
    if new.series_id.trim().is_empty() {
        return Err(ScoringError::InvalidSetup(
            "series id must not be empty".to_string(),
        ));
    }
    if new.match_number == 0 {
        return Err(ScoringError::InvalidSetup(
            "match number must be at least 1".to_string(),
        ));
    }
    if !(1..=MAX_OVERS).contains(&new.total_overs) {
        return Err(ScoringError::InvalidSetup(format!(
            "total overs must be between 1 and {}, got {}",
            MAX_OVERS, new.total_overs
        )));
    }
    let (a, b) = (new.team_a.trim(), new.team_b.trim());
    if a.is_empty() || b.is_empty() {
        return Err(ScoringError::InvalidSetup(
            "team names must not be empty".to_string(),
        ));
    }
    if a.eq_ignore_ascii_case(b) {
        return Err(ScoringError::InvalidSetup(format!(
            "both sides are named {}",
            a
        )));
    }
    Ok(())
}
