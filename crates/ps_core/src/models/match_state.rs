//! Authoritative match state.
//!
//! One `MatchState` value exists per active session and is mutated only
//! through `ScoringEngine` operations. It is replaced wholesale on reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::history::{HistoryEntry, SetRecord};
use super::score::{GameMode, ScorePair, ScoringMode};
use super::team::Team;

/// Winner summary computed once at match completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchWinner {
    pub team: Team,
    pub team_name: String,
    /// Final sets label, black-first, e.g. "2-1".
    pub final_sets: String,
    /// Joined set labels, e.g. "6-4, 7-6(5)".
    pub match_summary: String,
    /// Games won by the winner across all completed sets.
    pub total_games_won: u32,
    pub duration_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    /// Raw internal point counters for the current game or tie-break.
    /// Never displayed directly and never capped, so win-by-2 can be
    /// evaluated from raw counts at any value.
    pub points: ScorePair,
    /// Rendering of `points` per the current scoring mode.
    pub display_score: ScorePair,
    pub games: ScorePair,
    pub sets: ScorePair,
    pub scoring_mode: ScoringMode,
    /// `None` means scoring is not yet armed.
    pub game_mode: Option<GameMode>,
    pub match_won: bool,
    pub winner: Option<MatchWinner>,
    pub set_history: Vec<SetRecord>,
    /// Append-only audit trail; never rewritten.
    pub point_history: Vec<HistoryEntry>,
    // Side-switch bookkeeping, reset every new set.
    pub should_switch_sides: bool,
    pub games_played_in_current_set: u32,
    pub initial_switch_done: bool,
    pub match_start_time: DateTime<Utc>,
    pub match_end_time: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

impl MatchState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            points: ScorePair::default(),
            display_score: ScorePair::default(),
            games: ScorePair::default(),
            sets: ScorePair::default(),
            scoring_mode: ScoringMode::Normal,
            game_mode: None,
            match_won: false,
            winner: None,
            set_history: Vec::new(),
            point_history: Vec::new(),
            should_switch_sides: false,
            games_played_in_current_set: 0,
            initial_switch_done: false,
            match_start_time: now,
            match_end_time: None,
            last_updated: now,
        }
    }

    /// Legacy display labels for completed sets, in play order.
    pub fn set_labels(&self) -> Vec<String> {
        self.set_history.iter().map(SetRecord::label).collect()
    }

    /// Viewer-facing snapshot with set results rendered to display strings.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            points: self.points,
            display_score: self.display_score,
            games: self.games,
            sets: self.sets,
            scoring_mode: self.scoring_mode,
            game_mode: self.game_mode,
            match_won: self.match_won,
            winner: self.winner.clone(),
            set_history: self.set_labels(),
            should_switch_sides: self.should_switch_sides,
            games_played_in_current_set: self.games_played_in_current_set,
            match_start_time: self.match_start_time,
            last_updated: self.last_updated,
        }
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized view of the match state broadcast to every viewer after each
/// mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub points: ScorePair,
    pub display_score: ScorePair,
    pub games: ScorePair,
    pub sets: ScorePair,
    pub scoring_mode: ScoringMode,
    pub game_mode: Option<GameMode>,
    pub match_won: bool,
    pub winner: Option<MatchWinner>,
    pub set_history: Vec<String>,
    pub should_switch_sides: bool,
    pub games_played_in_current_set: u32,
    pub match_start_time: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}
