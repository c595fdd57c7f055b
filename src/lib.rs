pub mod api;
pub mod broadcast;
pub mod cache;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod rules;
pub mod store;

pub use broadcast::{BroadcastSink, ChannelBroadcaster, NullBroadcaster, ScoreEvent};
pub use cache::{CachePolicy, KeyValueCache, MemoryCache, RedisCache, ScoreCache};
pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Ball, BallEvent, BallType, Innings, Match, MatchId, MatchResult, NewMatch, Over, RunType,
    Scorecard, Team, TimeMs, WicketKind,
};
pub use engine::{EngineContext, EngineSettings, ScoringEngine, ScoringError};
pub use error::AppError;
pub use store::{MemoryStore, ScoreStore, StoreError};
