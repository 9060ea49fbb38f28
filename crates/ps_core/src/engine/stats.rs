//! Post-match statistics.
//!
//! Pure summary over the accumulated history once the match is won. Set
//! results are read from the tagged `SetRecord`s, never re-parsed out of
//! display strings.

use serde::Serialize;

use crate::models::{HistoryAction, MatchState, ScorePair, Team};

/// Per-set breakdown row for the winner screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetBreakdown {
    pub set_number: usize,
    pub black_games: u32,
    pub yellow_games: u32,
    pub set_winner: Team,
}

/// Immutable summary of a completed match, retained until the next reset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub winner_team: Team,
    pub winner_name: String,
    /// Black-first final sets label, e.g. "2-1".
    pub final_sets_score: String,
    /// Legacy set labels in play order.
    pub detailed_sets: Vec<String>,
    pub match_duration: String,
    pub total_points_won: ScorePair,
    pub total_games_won: ScorePair,
    pub sets_breakdown: Vec<SetBreakdown>,
    /// One-line digest, e.g. "Sets: 6-4, 7-6(5) | Points: 51-44 | Games: 11-10".
    pub match_summary: String,
}

/// Summarize a completed match. Returns `None` while the match is running.
pub fn summarize(state: &MatchState) -> Option<MatchSummary> {
    if !state.match_won {
        return None;
    }
    let winner = state.winner.as_ref()?;

    // Point and game totals come from the audit trail. Transition entries
    // are promoted (a set-winning game is tagged `set`, not `game`), so
    // these counts are strictly "plain" points and games.
    let mut total_points_won = ScorePair::default();
    let mut total_games_won = ScorePair::default();
    for entry in &state.point_history {
        match entry.action {
            HistoryAction::Point => *total_points_won.get_mut(entry.team) += 1,
            HistoryAction::Game => *total_games_won.get_mut(entry.team) += 1,
            _ => {}
        }
    }

    let mut sets_breakdown = Vec::with_capacity(state.set_history.len());
    for (index, set) in state.set_history.iter().enumerate() {
        sets_breakdown.push(SetBreakdown {
            set_number: index + 1,
            black_games: set.games_black,
            yellow_games: set.games_yellow,
            set_winner: set.winner,
        });
    }

    let detailed_sets = state.set_labels();
    let digest = format!(
        "Sets: {} | Points: {} | Games: {}",
        detailed_sets.join(", "),
        total_points_won.label(),
        total_games_won.label(),
    );

    Some(MatchSummary {
        winner_team: winner.team,
        winner_name: winner.team_name.clone(),
        final_sets_score: winner.final_sets.clone(),
        detailed_sets,
        match_duration: format_duration(winner.duration_secs),
        total_points_won,
        total_games_won,
        sets_breakdown,
        match_summary: digest,
    })
}

/// "45s" under a minute, "12m 3s" above.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Holds the summary of the last completed match until viewers have
/// consumed it. Wiped on reset.
#[derive(Debug, Default)]
pub struct MatchStorage {
    summary: Option<MatchSummary>,
    display_shown: bool,
}

impl MatchStorage {
    pub fn store(&mut self, summary: MatchSummary) {
        self.summary = Some(summary);
        self.display_shown = false;
    }

    pub fn summary(&self) -> Option<&MatchSummary> {
        self.summary.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.summary.is_some()
    }

    pub fn display_shown(&self) -> bool {
        self.display_shown
    }

    /// Mark the summary as displayed; optionally wipe it right away.
    pub fn mark_displayed(&mut self, wipe_immediately: bool) {
        self.display_shown = true;
        if wipe_immediately {
            self.wipe();
        }
    }

    pub fn wipe(&mut self) {
        self.summary = None;
        self.display_shown = false;
    }
}
