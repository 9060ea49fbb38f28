//! Viewer fan-out boundary.
//!
//! After every mutation the session pushes an update to its broadcaster.
//! Delivery is fire-and-forget and must never block the scoring path; the
//! channel implementation drops subscribers whose receiver has gone away.
//! Transport mechanics (connections, framing, reconnection) live outside
//! the core.

use std::sync::mpsc::{self, Receiver, Sender};

use serde::Serialize;

use crate::engine::{MatchSummary, SideSwitchRequired};
use crate::models::{HistoryAction, MatchSnapshot, MatchWinner, Team};

/// One update pushed to every subscriber.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BroadcastUpdate {
    /// Full authoritative state after a mutation.
    State { state: MatchSnapshot },
    /// A scoring action was applied (not sent once the match is decided).
    PointScored { team: Team, action: HistoryAction },
    /// Players must change court ends.
    SideSwitchRequired {
        #[serde(flatten)]
        request: SideSwitchRequired,
        message: &'static str,
    },
    /// The match just completed.
    MatchWon { winner: MatchWinner, match_data: MatchSummary },
    /// The session was reset to the splash phase.
    SessionReset,
}

impl BroadcastUpdate {
    pub fn side_switch(request: SideSwitchRequired) -> Self {
        BroadcastUpdate::SideSwitchRequired { request, message: "CHANGE SIDES" }
    }
}

/// Outbound boundary used by the session after each mutation.
pub trait StateBroadcaster: Send {
    fn broadcast(&mut self, update: &BroadcastUpdate);
}

/// Discards everything; used in tests and headless runs.
#[derive(Debug, Default)]
pub struct NullBroadcaster;

impl StateBroadcaster for NullBroadcaster {
    fn broadcast(&mut self, _update: &BroadcastUpdate) {}
}

/// Fan-out over in-process channels, at-least-once per mutation.
#[derive(Debug, Default)]
pub struct ChannelBroadcaster {
    subscribers: Vec<Sender<BroadcastUpdate>>,
}

impl ChannelBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and hand back its receiving end.
    pub fn subscribe(&mut self) -> Receiver<BroadcastUpdate> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl StateBroadcaster for ChannelBroadcaster {
    fn broadcast(&mut self, update: &BroadcastUpdate) {
        // Unbounded sends never block; dead receivers are pruned as we go.
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }
}
