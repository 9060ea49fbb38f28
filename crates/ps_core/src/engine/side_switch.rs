//! Side-switch cadence policy.
//!
//! Two disjoint cadences, selected by the armed game mode:
//! - BASIC: exactly one switch at the start of every set, guarded by
//!   `initial_switch_done`; never mid-set.
//! - COMPETITION / LOCK: after every game whose cumulative count in the set
//!   is odd (1st, 3rd, 5th, ...), evaluated only while scoring mode is
//!   NORMAL. Tie-break games do not trigger a mid-set switch; the switch
//!   after a tie-break falls out of the new-set trigger.
//!
//! No cadence ever fires once the match is won.

use serde::Serialize;

use crate::models::{GameMode, MatchState, ScoringMode};

/// Notification payload sent to viewers when players must change ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideSwitchRequired {
    pub total_games_in_set: u32,
    pub game_score: String,
    pub set_score: String,
}

impl SideSwitchRequired {
    fn from_state(state: &MatchState) -> Self {
        Self {
            total_games_in_set: state.games_played_in_current_set,
            game_score: state.games.label(),
            set_score: state.sets.label(),
        }
    }
}

/// COMPETITION/LOCK cadence, evaluated after a NORMAL-mode game win that did
/// not end the set.
pub fn check_after_game(state: &mut MatchState) -> Option<SideSwitchRequired> {
    if state.match_won || state.scoring_mode != ScoringMode::Normal {
        return None;
    }
    match state.game_mode {
        Some(GameMode::Competition) | Some(GameMode::Lock) => {}
        _ => return None,
    }

    let total_games = state.games.total();
    if total_games % 2 == 1 {
        state.should_switch_sides = true;
        state.games_played_in_current_set = total_games;
        Some(SideSwitchRequired::from_state(state))
    } else {
        state.should_switch_sides = false;
        None
    }
}

/// BASIC cadence: due once at the start of every set. The request surfaces
/// on the first point applied in the fresh set (games 0-0), so a newly armed
/// match fires before any game is played.
pub fn check_set_start(state: &mut MatchState) -> Option<SideSwitchRequired> {
    if state.match_won || state.game_mode != Some(GameMode::Basic) {
        return None;
    }
    if state.games.total() != 0 || state.initial_switch_done {
        return None;
    }

    state.initial_switch_done = true;
    state.should_switch_sides = true;
    state.games_played_in_current_set = 0;
    Some(SideSwitchRequired::from_state(state))
}

/// Client acknowledgment: clears the pending flag without touching scoring.
pub fn acknowledge(state: &mut MatchState) {
    state.should_switch_sides = false;
}
