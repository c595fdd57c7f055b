use async_trait::async_trait;
use scorebook::cache::CacheError;
use scorebook::domain::{BallType, RunType, Team, TossDecision};
use scorebook::{
    BallEvent, CachePolicy, EngineContext, EngineSettings, KeyValueCache, MatchId, MemoryCache,
    MemoryStore, NewMatch, NullBroadcaster, ScoreCache, ScoreStore, ScoringEngine,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Memory cache whose every call can be made to fail on demand.
#[derive(Debug, Default)]
struct FlakyCache {
    inner: MemoryCache,
    down: AtomicBool,
}

impl FlakyCache {
    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueCache for FlakyCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check()?;
        self.inner.get(key).await
    }
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.check()?;
        self.inner.set_ex(key, value, ttl).await
    }
    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.inner.delete(key).await
    }
    async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        self.check()?;
        self.inner.incr(key).await
    }
}

/// Backend that never answers in time.
#[derive(Debug)]
struct HungCache;

#[async_trait]
impl KeyValueCache for HungCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(None)
    }
    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }
    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }
    async fn incr(&self, _key: &str) -> Result<i64, CacheError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(1)
    }
}

fn engine_over(
    store: Arc<dyn ScoreStore>,
    backend: Arc<dyn KeyValueCache>,
    policy: CachePolicy,
) -> ScoringEngine {
    ScoringEngine::new(EngineContext {
        store,
        cache: ScoreCache::new(backend, policy),
        broadcaster: Arc::new(NullBroadcaster),
        settings: EngineSettings::default(),
    })
}

fn engine_with(backend: Arc<dyn KeyValueCache>) -> ScoringEngine {
    engine_over(Arc::new(MemoryStore::new()), backend, CachePolicy::default())
}

fn new_match(match_number: u32) -> NewMatch {
    NewMatch {
        series_id: "autumn-league".to_string(),
        match_number,
        team_a: "Lions".to_string(),
        team_b: "Tigers".to_string(),
        total_overs: 20,
        toss_winner: Team::A,
        toss_decision: TossDecision::Bat,
    }
}

async fn live_match(engine: &ScoringEngine) -> MatchId {
    let id = engine.create_match(new_match(1)).await.unwrap().id;
    engine.start_scoring(id).await.unwrap();
    id
}

fn runs(match_id: MatchId, runs: u8) -> BallEvent {
    BallEvent {
        match_id,
        innings_number: 1,
        ball_type: BallType::Good,
        run_type: RunType::Bat,
        runs,
        byes: 0,
        wicket: None,
    }
}

async fn runs_on_card(engine: &ScoringEngine, match_id: MatchId) -> u32 {
    let card = engine.get_scorecard(match_id).await.unwrap();
    card.innings(1).unwrap().innings.total_runs
}

#[tokio::test]
async fn test_scorecard_is_fresh_after_add_and_undo() {
    let engine = engine_with(Arc::new(MemoryCache::new()));
    let id = live_match(&engine).await;

    assert_eq!(runs_on_card(&engine, id).await, 0);
    engine.add_ball(runs(id, 4)).await.unwrap();
    assert_eq!(runs_on_card(&engine, id).await, 4);
    engine.add_ball(runs(id, 6)).await.unwrap();
    assert_eq!(runs_on_card(&engine, id).await, 10);
    engine.undo_ball(id, 1).await.unwrap();
    assert_eq!(runs_on_card(&engine, id).await, 4);
}

#[tokio::test]
async fn test_current_over_and_over_balls_are_fresh() {
    let engine = engine_with(Arc::new(MemoryCache::new()));
    let id = live_match(&engine).await;

    assert!(engine.get_current_over(id, 1).await.unwrap().is_none());
    let first = engine.add_ball(runs(id, 1)).await.unwrap();
    let over_id = first.over.id;

    assert_eq!(engine.get_balls_by_over(over_id).await.unwrap().len(), 1);
    let view = engine.get_current_over(id, 1).await.unwrap().unwrap();
    assert_eq!(view.balls.len(), 1);

    engine.add_ball(runs(id, 2)).await.unwrap();
    assert_eq!(engine.get_balls_by_over(over_id).await.unwrap().len(), 2);
    let view = engine.get_current_over(id, 1).await.unwrap().unwrap();
    assert_eq!(view.over.total_runs, 3);

    engine.undo_ball(id, 1).await.unwrap();
    assert_eq!(engine.get_balls_by_over(over_id).await.unwrap().len(), 1);
    let view = engine.get_current_over(id, 1).await.unwrap().unwrap();
    assert_eq!(view.over.total_runs, 1);
}

#[tokio::test]
async fn test_series_listing_sees_new_matches() {
    let engine = engine_with(Arc::new(MemoryCache::new()));
    engine.create_match(new_match(1)).await.unwrap();

    assert_eq!(engine.count_matches_by_series("autumn-league").await.unwrap(), 1);
    assert_eq!(engine.list_matches_by_series("autumn-league").await.unwrap().len(), 1);

    engine.create_match(new_match(2)).await.unwrap();
    assert_eq!(engine.count_matches_by_series("autumn-league").await.unwrap(), 2);
    let listed = engine.list_matches_by_series("autumn-league").await.unwrap();
    assert_eq!(listed.iter().map(|m| m.match_number).collect::<Vec<_>>(), vec![1, 2]);
}

#[tokio::test]
async fn test_series_listing_reflects_status_changes() {
    let engine = engine_with(Arc::new(MemoryCache::new()));
    let id = engine.create_match(new_match(1)).await.unwrap().id;
    let listed = engine.list_matches_by_series("autumn-league").await.unwrap();
    assert_eq!(listed[0].status.as_str(), "scheduled");

    engine.start_scoring(id).await.unwrap();
    let listed = engine.list_matches_by_series("autumn-league").await.unwrap();
    assert_eq!(listed[0].status.as_str(), "live");
}

#[tokio::test]
async fn test_engines_sharing_a_cache_see_each_others_writes() {
    let store: Arc<dyn ScoreStore> = Arc::new(MemoryStore::new());
    let cache: Arc<dyn KeyValueCache> = Arc::new(MemoryCache::new());
    let writer = engine_over(store.clone(), cache.clone(), CachePolicy::default());
    let reader = engine_over(store, cache, CachePolicy::default());

    let id = live_match(&writer).await;
    assert_eq!(runs_on_card(&reader, id).await, 0);
    writer.add_ball(runs(id, 6)).await.unwrap();
    assert_eq!(runs_on_card(&reader, id).await, 6);
}

#[tokio::test]
async fn test_scoring_works_with_cache_down() {
    let cache = Arc::new(FlakyCache::default());
    cache.set_down(true);
    let engine = engine_with(cache.clone());

    let id = live_match(&engine).await;
    engine.add_ball(runs(id, 4)).await.unwrap();
    assert_eq!(runs_on_card(&engine, id).await, 4);
    assert!(engine.validate_innings_order(id, 1).await.is_ok());
    assert_eq!(engine.should_complete_match(id).await.unwrap(), None);
}

#[tokio::test]
async fn test_missed_invalidation_is_retried() {
    let cache = Arc::new(FlakyCache::default());
    let engine = engine_with(cache.clone());
    let id = live_match(&engine).await;
    assert_eq!(runs_on_card(&engine, id).await, 0);

    // The write lands while the cache is unreachable, so its version bump fails.
    cache.set_down(true);
    engine.add_ball(runs(id, 3)).await.unwrap();
    cache.set_down(false);

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if runs_on_card(&engine, id).await == 3 {
            break;
        }
        assert!(Instant::now() < deadline, "scorecard stayed stale");
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn test_hung_cache_does_not_stall_scoring() {
    let policy = CachePolicy {
        op_timeout: Duration::from_millis(10),
        retry_window: Duration::from_millis(100),
        ..CachePolicy::default()
    };
    let engine = engine_over(Arc::new(MemoryStore::new()), Arc::new(HungCache), policy);
    let id = live_match(&engine).await;

    let started = Instant::now();
    engine.add_ball(runs(id, 2)).await.unwrap();
    assert_eq!(runs_on_card(&engine, id).await, 2);
    assert!(started.elapsed() < Duration::from_secs(2));
}
