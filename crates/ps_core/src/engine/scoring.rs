//! Authoritative match scoring state machine.
//!
//! Converts point / subtract commands into game, set, and match transitions:
//! NORMAL games won at 4 raw points with a lead of 2, tie-breaks at 7,
//! super tie-breaks at 10. Raw point counters are never capped, so win-by-2
//! is always evaluated from exact counts. Every transition resets the
//! counters it consumes atomically with the transition itself; no caller can
//! observe a stale point count next to an incremented game count.

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{CommandError, Result};
use crate::models::{
    GameMode, HistoryAction, HistoryEntry, MatchState, MatchWinner, ScoreSnapshot, ScoringMode,
    SetRecord, Team,
};

use super::side_switch::{self, SideSwitchRequired};

/// Highest transition reached by one applied point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOutcome {
    Point,
    GameWon(Team),
    SetWon(Team),
    MatchWon(Team),
}

impl PointOutcome {
    /// History action recorded for this outcome.
    pub fn history_action(self) -> HistoryAction {
        match self {
            PointOutcome::Point => HistoryAction::Point,
            PointOutcome::GameWon(_) => HistoryAction::Game,
            PointOutcome::SetWon(_) => HistoryAction::Set,
            PointOutcome::MatchWon(_) => HistoryAction::Match,
        }
    }
}

/// Result of a successfully applied point, including any side-switch
/// notification that became due.
#[derive(Debug, Clone)]
pub struct PointReport {
    pub outcome: PointOutcome,
    pub side_switch: Option<SideSwitchRequired>,
}

/// Owns the authoritative `MatchState` for one session. All mutation goes
/// through these methods; callers must serialize access per session.
#[derive(Debug, Default)]
pub struct ScoringEngine {
    state: MatchState,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self { state: MatchState::new() }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Replace the match with a fresh unarmed one. Idempotent.
    pub fn reset(&mut self) -> &MatchState {
        self.state = MatchState::new();
        info!("match reset: all counters cleared, scoring disarmed");
        &self.state
    }

    /// Arm scoring with the given cadence mode.
    pub fn set_game_mode(&mut self, mode: GameMode) {
        self.state.game_mode = Some(mode);
        self.state.initial_switch_done = false;
        self.state.last_updated = Utc::now();
        info!(mode = mode.as_str(), "game mode selected");
    }

    /// Disarm scoring without touching the score.
    pub fn clear_game_mode(&mut self) {
        self.state.game_mode = None;
        self.state.initial_switch_done = false;
        self.state.last_updated = Utc::now();
        info!("game mode cleared");
    }

    /// Clear a pending side-switch notification.
    pub fn acknowledge_side_switch(&mut self) {
        side_switch::acknowledge(&mut self.state);
    }

    fn guard(&self) -> Result<()> {
        if self.state.match_won {
            return Err(CommandError::MatchAlreadyComplete);
        }
        if self.state.game_mode.is_none() {
            return Err(CommandError::ScoringNotArmed);
        }
        Ok(())
    }

    fn score_snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            display: self.state.display_score,
            games: self.state.games,
            sets: self.state.sets,
        }
    }

    fn push_history(&mut self, action: HistoryAction, team: Team, before: ScoreSnapshot) {
        let entry = HistoryEntry {
            timestamp: Utc::now(),
            action,
            team,
            before,
            after: self.score_snapshot(),
        };
        self.state.point_history.push(entry);
    }

    fn refresh_display(&mut self) {
        let mode = self.state.scoring_mode;
        self.state.display_score.black = mode.display_points(self.state.points.black);
        self.state.display_score.yellow = mode.display_points(self.state.points.yellow);
    }

    fn reset_points(&mut self) {
        self.state.points.reset();
        self.state.display_score.reset();
    }

    /// Apply one point for `team`.
    pub fn apply_point(&mut self, team: Team) -> Result<PointReport> {
        self.guard()?;

        // BASIC set-start switch surfaces on the first point of a fresh set.
        let mut switch = side_switch::check_set_start(&mut self.state);

        let before = self.score_snapshot();
        *self.state.points.get_mut(team) += 1;
        self.refresh_display();

        let points = self.state.points;
        let won = points.get(team) >= self.state.scoring_mode.win_threshold()
            && points.lead(team) >= 2;

        let outcome = if won {
            match self.state.scoring_mode {
                ScoringMode::Normal => {
                    let outcome = self.complete_game(team);
                    if matches!(outcome, PointOutcome::GameWon(_)) {
                        // Set still running: mid-set cadence may be due.
                        if let Some(req) = side_switch::check_after_game(&mut self.state) {
                            switch = Some(req);
                        }
                    }
                    outcome
                }
                ScoringMode::Tiebreak => {
                    let record = SetRecord::tiebreak(team, points.get(team.opponent()));
                    self.complete_set_from_tiebreak(team, record)
                }
                ScoringMode::SuperTiebreak => {
                    let record = SetRecord::super_tiebreak(team, points.get(team.opponent()));
                    self.complete_set_from_tiebreak(team, record)
                }
            }
        } else {
            PointOutcome::Point
        };

        if let PointOutcome::MatchWon(_) = outcome {
            // The deciding point records the set it closed plus a final
            // match entry.
            self.push_history(HistoryAction::Set, team, before);
            self.push_history(HistoryAction::Match, team, before);
        } else {
            self.push_history(outcome.history_action(), team, before);
        }
        self.state.last_updated = Utc::now();

        // Nothing more is announced once the match is decided.
        if self.state.match_won {
            switch = None;
        }

        debug!(
            team = %team,
            outcome = ?outcome,
            display = %self.state.display_score.label(),
            games = %self.state.games.label(),
            sets = %self.state.sets.label(),
            "point applied"
        );

        Ok(PointReport { outcome, side_switch: switch })
    }

    /// Subtract one point from `team`, flooring at zero. Only the current
    /// game's tally is corrected; completed games, sets, the scoring mode,
    /// and past history are never rolled back.
    pub fn apply_subtract(&mut self, team: Team) -> Result<()> {
        self.guard()?;

        let before = self.score_snapshot();
        let counter = self.state.points.get_mut(team);
        *counter = counter.saturating_sub(1);
        self.refresh_display();

        self.push_history(HistoryAction::PointSubtract, team, before);
        self.state.last_updated = Utc::now();

        debug!(team = %team, display = %self.state.display_score.label(), "point subtracted");
        Ok(())
    }

    /// NORMAL-mode game win: bump games, reset points, then settle the set.
    fn complete_game(&mut self, team: Team) -> PointOutcome {
        *self.state.games.get_mut(team) += 1;
        self.state.games_played_in_current_set = self.state.games.total();
        self.reset_points();

        let games = self.state.games;
        let winner_games = games.get(team);

        if winner_games >= 6 && games.lead(team) >= 2 {
            let record = SetRecord::normal(games.black, games.yellow, team);
            return self.complete_set(team, record);
        }

        if games.black == 6 && games.yellow == 6 {
            self.enter_tiebreak();
        }

        PointOutcome::GameWon(team)
    }

    /// At 6-6 the set is decided by a tie-break: a normal one for the first
    /// two sets, the super tie-break when the match stands at one set all.
    fn enter_tiebreak(&mut self) {
        let sets = self.state.sets;
        let next = if sets.black == 1 && sets.yellow == 1 {
            ScoringMode::SuperTiebreak
        } else {
            ScoringMode::Tiebreak
        };
        self.state.scoring_mode = next;
        self.reset_points();
        info!(mode = ?next, "games level at 6-6, entering tie-break");
    }

    /// Tie-break and super-tie-break wins always end the set.
    fn complete_set_from_tiebreak(&mut self, team: Team, record: SetRecord) -> PointOutcome {
        self.reset_points();
        self.state.scoring_mode = ScoringMode::Normal;
        self.complete_set(team, record)
    }

    fn complete_set(&mut self, team: Team, record: SetRecord) -> PointOutcome {
        self.state.set_history.push(record);
        *self.state.sets.get_mut(team) += 1;
        self.state.games.reset();
        self.reset_points();

        // New-set side-switch bookkeeping.
        self.state.games_played_in_current_set = 0;
        self.state.should_switch_sides = false;
        self.state.initial_switch_done = false;

        info!(team = %team, sets = %self.state.sets.label(), label = %record.label(), "set won");

        if self.state.sets.get(team) >= 2 {
            self.complete_match(team);
            return PointOutcome::MatchWon(team);
        }
        PointOutcome::SetWon(team)
    }

    fn complete_match(&mut self, team: Team) {
        let end = Utc::now();
        self.state.match_won = true;
        self.state.match_end_time = Some(end);

        let total_games_won: u32 =
            self.state.set_history.iter().map(|set| set.games_for(team)).sum();
        let labels = self.state.set_labels();

        self.state.winner = Some(MatchWinner {
            team,
            team_name: team.display_name().to_string(),
            final_sets: self.state.sets.label(),
            match_summary: labels.join(", "),
            total_games_won,
            duration_secs: (end - self.state.match_start_time).num_seconds(),
        });

        info!(team = %team, sets = %self.state.sets.label(), "match won, side switches disabled");
    }
}
