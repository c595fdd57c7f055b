//! Live-update fan-out.
//!
//! The engine publishes one event per state change after the write is
//! durable. Delivery is fire-and-forget and at-most-once: a subscriber that
//! lags behind loses events and should refetch the scorecard.

use crate::domain::{Ball, MatchId, MatchResult, Over, ScoreLine, Team};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use tracing::trace;

/// Capacity of the in-process channel before slow subscribers start lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// State change pushed to live viewers of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoreEvent {
    InningsStarted {
        match_id: MatchId,
        innings_number: u8,
        batting_team: Team,
    },
    /// Minimal delta for a live view: score line, current over, the new ball.
    BallAdded {
        match_id: MatchId,
        innings_number: u8,
        score: ScoreLine,
        over: Over,
        ball: Ball,
    },
    BallUndone {
        match_id: MatchId,
        innings_number: u8,
        score: ScoreLine,
        over: Option<Over>,
        removed: Ball,
    },
    InningsCompleted {
        match_id: MatchId,
        innings_number: u8,
        score: ScoreLine,
    },
    MatchCompleted {
        match_id: MatchId,
        result: MatchResult,
        summary: String,
    },
    MatchCancelled {
        match_id: MatchId,
    },
}

impl ScoreEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ScoreEvent::InningsStarted { .. } => "innings_started",
            ScoreEvent::BallAdded { .. } => "ball_added",
            ScoreEvent::BallUndone { .. } => "ball_undone",
            ScoreEvent::InningsCompleted { .. } => "innings_completed",
            ScoreEvent::MatchCompleted { .. } => "match_completed",
            ScoreEvent::MatchCancelled { .. } => "match_cancelled",
        }
    }
}

/// Room a match's events are published to.
pub fn room_for(match_id: MatchId) -> String {
    format!("match:{}", match_id)
}

/// Sink for live-update events.
pub trait BroadcastSink: Send + Sync + fmt::Debug {
    /// Publish `event` to every subscriber of `room_id`. Never blocks or fails.
    fn publish(&self, room_id: &str, event: ScoreEvent);
}

/// An event tagged with the room it was published to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMessage {
    pub room_id: String,
    pub event: ScoreEvent,
}

/// In-process broadcaster over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
    sender: broadcast::Sender<RoomMessage>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to every room. Filter on `RoomMessage::room_id`.
    pub fn subscribe(&self) -> broadcast::Receiver<RoomMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl BroadcastSink for ChannelBroadcaster {
    fn publish(&self, room_id: &str, event: ScoreEvent) {
        let kind = event.kind();
        let message = RoomMessage {
            room_id: room_id.to_string(),
            event,
        };
        // No receivers is not an error for a live feed.
        match self.sender.send(message) {
            Ok(receivers) => trace!(room_id, kind, receivers, "Published score event"),
            Err(_) => trace!(room_id, kind, "No subscribers for score event"),
        }
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBroadcaster;

impl BroadcastSink for NullBroadcaster {
    fn publish(&self, _room_id: &str, _event: ScoreEvent) {}
}
