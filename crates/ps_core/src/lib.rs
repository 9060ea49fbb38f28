//! # ps_core - Padel Match Scoring Engine
//!
//! This library provides the authoritative scoring core for a two-team padel
//! scoreboard: point/game/set/match progression with tie-breaks, sensor
//! event admission, a UI phase router, and a JSON command API for easy
//! integration with display and intake frontends.
//!
//! ## Features
//! - Exact win-by-2 scoring from uncapped raw counters
//! - Tie-break and super tie-break set resolution
//! - Deterministic timers driven by caller-supplied timestamps
//! - JSON API for easy integration

pub mod admission;
pub mod api;
pub mod broadcast;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod session;
pub mod state;

// Re-export main API functions
pub use api::{process_command, process_command_json, Command, CommandResponse};
pub use error::{CommandError, Result};

// Re-export the scoring core
pub use engine::{
    MatchStorage, MatchSummary, PointOutcome, PointReport, ScoringEngine, SetBreakdown,
    SideSwitchRequired,
};
pub use models::{
    GameMode, HistoryAction, HistoryEntry, MatchSnapshot, MatchState, MatchWinner, ScorePair,
    ScoringMode, SetRecord, Team,
};

// Re-export the session layer
pub use admission::{AdmittedEvent, SensorAction, SensorEvent, SensorEventAdmission};
pub use broadcast::{BroadcastUpdate, ChannelBroadcaster, NullBroadcaster, StateBroadcaster};
pub use session::{route, RouterAction, Session, SessionPhase};
pub use state::{create_session, create_session_with, get_session, remove_session, session_count};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
