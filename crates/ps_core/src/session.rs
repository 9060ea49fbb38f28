//! Session phase router.
//!
//! Layers a strict UI-phase state machine above the scoring engine:
//! SPLASH → MODE_SELECT → ACTIVE → WINNER. Routing priority is fixed at
//! WINNER > SPLASH > MODE_SELECT > ACTIVE, evaluated top to bottom with no
//! fallthrough; `route` is the whole transition table and is testable on its
//! own.
//!
//! Timers (the mode-select coincidence window and the winner auto-dismiss)
//! are stored deadlines compared against caller-supplied millisecond
//! timestamps and fired by `tick`. Arming a new deadline always clears the
//! previous one, so a stale timer can never fire after the state has moved
//! on. The intake layer is expected to call `tick` periodically; sensor
//! events tick implicitly with their own timestamp.

use tracing::{debug, info, warn};

use crate::admission::{AdmittedEvent, SensorAction, SensorEvent, SensorEventAdmission};
use crate::broadcast::{BroadcastUpdate, NullBroadcaster, StateBroadcaster};
use crate::config::{MODE_SELECT_WINDOW_MS, WINNER_AUTO_DISMISS_MS};
use crate::engine::{stats, MatchStorage, MatchSummary, PointReport, ScoringEngine};
use crate::error::Result;
use crate::models::{GameMode, MatchState, Team};
use serde::Serialize;

/// UI phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Splash,
    ModeSelect,
    Active,
    Winner,
}

/// What the router decided to do with one admitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterAction {
    /// WINNER: any event resets the session.
    ResetSession,
    /// SPLASH: any event advances to mode selection without scoring.
    AdvanceToModeSelect,
    /// MODE_SELECT: feed the coincidence detector.
    ModeSelectInput,
    /// ACTIVE: forward to the scoring engine by classification.
    Score,
}

/// The phase × event transition table. Priority order is fixed:
/// WINNER > SPLASH > MODE_SELECT > ACTIVE; first match wins.
pub fn route(phase: SessionPhase, _event: &AdmittedEvent) -> RouterAction {
    match phase {
        SessionPhase::Winner => RouterAction::ResetSession,
        SessionPhase::Splash => RouterAction::AdvanceToModeSelect,
        SessionPhase::ModeSelect => RouterAction::ModeSelectInput,
        SessionPhase::Active => RouterAction::Score,
    }
}

/// Pending mode-select coincidence window.
#[derive(Debug, Clone, Copy)]
struct ModeSelectWindow {
    first_source: Team,
    deadline_ms: u64,
}

/// One scoring session: admission pipeline, phase machine, scoring engine,
/// and completed-match storage, fanned out through a broadcaster.
///
/// Mutation is serialized by construction: every entry point takes
/// `&mut self`, and the registry wraps each session in its own mutex.
pub struct Session {
    engine: ScoringEngine,
    admission: SensorEventAdmission,
    storage: MatchStorage,
    phase: SessionPhase,
    mode_select_window: Option<ModeSelectWindow>,
    winner_dismiss_deadline: Option<u64>,
    broadcaster: Box<dyn StateBroadcaster>,
}

impl Session {
    pub fn new(broadcaster: Box<dyn StateBroadcaster>) -> Self {
        Self {
            engine: ScoringEngine::new(),
            admission: SensorEventAdmission::new(),
            storage: MatchStorage::default(),
            phase: SessionPhase::Splash,
            mode_select_window: None,
            winner_dismiss_deadline: None,
            broadcaster,
        }
    }

    /// Session without any subscribers.
    pub fn headless() -> Self {
        Self::new(Box::new(NullBroadcaster))
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> &MatchState {
        self.engine.state()
    }

    pub fn match_data(&self) -> Option<&MatchSummary> {
        self.storage.summary()
    }

    // =========================================================================
    // Sensor path
    // =========================================================================

    /// Admit and dispatch one raw hardware trigger. Debounced events come
    /// back as `Err(Debounced)` and are meant to be dropped silently.
    pub fn handle_sensor_event(&mut self, raw: SensorEvent) -> Result<()> {
        // Fire any deadline that elapsed before this event; the expiry of
        // the mode-select window may move us to ACTIVE first.
        self.tick(raw.timestamp_ms);

        let admitted = self.admission.admit(raw)?;
        self.dispatch(admitted);
        Ok(())
    }

    /// Fire elapsed deadlines. Called implicitly from the sensor path and
    /// periodically by the intake layer.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(window) = self.mode_select_window {
            if now_ms >= window.deadline_ms {
                self.mode_select_window = None;
                debug!(source = %window.first_source, "mode-select window expired, lone source");
                self.select_mode(GameMode::Basic);
            }
        }
        if let Some(deadline) = self.winner_dismiss_deadline {
            if now_ms >= deadline {
                info!("winner screen auto-dismissed");
                self.reset();
            }
        }
    }

    fn dispatch(&mut self, event: AdmittedEvent) {
        match route(self.phase, &event) {
            RouterAction::ResetSession => self.reset(),
            RouterAction::AdvanceToModeSelect => {
                self.phase = SessionPhase::ModeSelect;
                debug!("splash dismissed, awaiting mode selection");
                self.broadcast_state();
            }
            RouterAction::ModeSelectInput => self.mode_select_input(event),
            RouterAction::Score => self.score(event),
        }
    }

    /// Mode-detection policy: the first event opens the coincidence window;
    /// a second event from the opposite source inside it selects
    /// COMPETITION. Window expiry (handled in `tick`) selects BASIC. LOCK is
    /// reachable only through the explicit command path.
    fn mode_select_input(&mut self, event: AdmittedEvent) {
        match self.mode_select_window {
            None => {
                self.mode_select_window = Some(ModeSelectWindow {
                    first_source: event.team,
                    deadline_ms: event.timestamp_ms + MODE_SELECT_WINDOW_MS,
                });
                debug!(source = %event.team, "mode-select window opened");
            }
            Some(window) if event.team != window.first_source => {
                self.mode_select_window = None;
                self.select_mode(GameMode::Competition);
            }
            // Repeat trigger from the same source: keep waiting.
            Some(_) => {}
        }
    }

    fn select_mode(&mut self, mode: GameMode) {
        self.mode_select_window = None;
        // Fresh match state so the clock starts at mode selection.
        self.engine.reset();
        self.engine.set_game_mode(mode);
        self.phase = SessionPhase::Active;
        info!(mode = mode.as_str(), "mode selected by sensor input, scoring armed");
        self.broadcast_state();
    }

    fn score(&mut self, event: AdmittedEvent) {
        let result = match event.action {
            SensorAction::Point => self.engine.apply_point(event.team).map(Some),
            SensorAction::Subtract => self.engine.apply_subtract(event.team).map(|_| None),
        };
        match result {
            Ok(report) => self.after_scoring(event.team, report, event.timestamp_ms),
            Err(err) if err.should_reroute() => {
                // Scoring got disarmed while ACTIVE: fall back to the
                // mode-selection path with the same event.
                warn!(team = %event.team, "scoring not armed in active phase, rerouting");
                self.phase = SessionPhase::ModeSelect;
                self.dispatch(event);
            }
            Err(err) => warn!(team = %event.team, error = %err, "scoring rejected"),
        }
    }

    // =========================================================================
    // Command path (HTTP-like intake relays these results unchanged)
    // =========================================================================

    pub fn apply_point(&mut self, team: Team, now_ms: u64) -> Result<()> {
        let report = self.engine.apply_point(team)?;
        self.after_scoring(team, Some(report), now_ms);
        Ok(())
    }

    pub fn apply_subtract(&mut self, team: Team) -> Result<()> {
        self.engine.apply_subtract(team)?;
        self.broadcast_state();
        Ok(())
    }

    /// Explicit mode selection; arms scoring without resetting the score.
    pub fn set_game_mode(&mut self, mode: GameMode) {
        self.mode_select_window = None;
        self.engine.set_game_mode(mode);
        if self.phase != SessionPhase::Winner {
            self.phase = SessionPhase::Active;
        }
        self.broadcast_state();
    }

    /// Disarm scoring. The phase stays put; the next sensor event in ACTIVE
    /// reroutes itself to mode selection.
    pub fn clear_game_mode(&mut self) {
        self.engine.clear_game_mode();
        self.broadcast_state();
    }

    pub fn acknowledge_side_switch(&mut self) {
        self.engine.acknowledge_side_switch();
        self.broadcast_state();
    }

    /// Mark the stored match summary as displayed. Returns false when there
    /// is no completed match to mark.
    pub fn mark_match_displayed(&mut self, wipe_immediately: bool) -> bool {
        if !self.storage.is_completed() {
            return false;
        }
        self.storage.mark_displayed(wipe_immediately);
        true
    }

    /// Full session reset: fresh unarmed match, splash phase, all pending
    /// timers cancelled. Idempotent.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.storage.wipe();
        self.admission.clear();
        self.phase = SessionPhase::Splash;
        self.mode_select_window = None;
        self.winner_dismiss_deadline = None;
        self.broadcaster.broadcast(&BroadcastUpdate::SessionReset);
        self.broadcast_state();
    }

    // =========================================================================
    // Broadcast plumbing
    // =========================================================================

    fn after_scoring(&mut self, team: Team, report: Option<PointReport>, now_ms: u64) {
        if let Some(report) = &report {
            if let Some(request) = report.side_switch.clone() {
                self.broadcaster.broadcast(&BroadcastUpdate::side_switch(request));
            }
        }

        if self.engine.state().match_won {
            self.on_match_won(now_ms);
        } else if let Some(report) = report {
            self.broadcaster.broadcast(&BroadcastUpdate::PointScored {
                team,
                action: report.outcome.history_action(),
            });
        }
        self.broadcast_state();
    }

    fn on_match_won(&mut self, now_ms: u64) {
        let state = self.engine.state();
        let summary = match stats::summarize(state) {
            Some(summary) => summary,
            None => return,
        };
        let winner = match state.winner.clone() {
            Some(winner) => winner,
            None => return,
        };
        self.storage.store(summary.clone());
        self.phase = SessionPhase::Winner;
        self.winner_dismiss_deadline = Some(now_ms + WINNER_AUTO_DISMISS_MS);
        self.broadcaster.broadcast(&BroadcastUpdate::MatchWon { winner, match_data: summary });
    }

    fn broadcast_state(&mut self) {
        let snapshot = self.engine.state().snapshot();
        self.broadcaster.broadcast(&BroadcastUpdate::State { state: snapshot });
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::headless()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::ChannelBroadcaster;
    use crate::config::DEBOUNCE_WINDOW_MS;
    use crate::error::CommandError;
    use crate::models::{ScorePair, ScoringMode};
    use std::sync::mpsc::Receiver;

    fn point(source: Team, timestamp_ms: u64) -> SensorEvent {
        SensorEvent { source, timestamp_ms, action_hint: SensorAction::Point }
    }

    fn subtract(source: Team, timestamp_ms: u64) -> SensorEvent {
        SensorEvent { source, timestamp_ms, action_hint: SensorAction::Subtract }
    }

    /// Drive a session from SPLASH into ACTIVE with BASIC mode selected,
    /// returning the next usable timestamp.
    fn arm_basic(session: &mut Session, start_ms: u64) -> u64 {
        session.handle_sensor_event(point(Team::Black, start_ms)).unwrap(); // splash
        session.handle_sensor_event(point(Team::Black, start_ms + 500)).unwrap(); // opens window
        session.tick(start_ms + 500 + MODE_SELECT_WINDOW_MS); // expiry selects BASIC
        assert_eq!(session.phase(), SessionPhase::Active);
        start_ms + 2_000
    }

    #[test]
    fn test_route_priority_table() {
        let event = AdmittedEvent { team: Team::Black, action: SensorAction::Point, timestamp_ms: 0 };
        assert_eq!(route(SessionPhase::Winner, &event), RouterAction::ResetSession);
        assert_eq!(route(SessionPhase::Splash, &event), RouterAction::AdvanceToModeSelect);
        assert_eq!(route(SessionPhase::ModeSelect, &event), RouterAction::ModeSelectInput);
        assert_eq!(route(SessionPhase::Active, &event), RouterAction::Score);
    }

    #[test]
    fn test_splash_event_advances_without_scoring() {
        let mut session = Session::headless();
        session.handle_sensor_event(point(Team::Yellow, 100)).unwrap();
        assert_eq!(session.phase(), SessionPhase::ModeSelect);
        assert_eq!(session.state().points, ScorePair::default());
    }

    #[test]
    fn test_lone_source_selects_basic_after_window() {
        let mut session = Session::headless();
        session.handle_sensor_event(point(Team::Black, 100)).unwrap();
        session.handle_sensor_event(point(Team::Black, 600)).unwrap();
        assert_eq!(session.phase(), SessionPhase::ModeSelect);

        session.tick(600 + MODE_SELECT_WINDOW_MS - 1);
        assert_eq!(session.phase(), SessionPhase::ModeSelect, "window still open");

        session.tick(600 + MODE_SELECT_WINDOW_MS);
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.state().game_mode, Some(GameMode::Basic));
    }

    #[test]
    fn test_dual_source_coincidence_selects_competition() {
        let mut session = Session::headless();
        session.handle_sensor_event(point(Team::Black, 100)).unwrap();
        session.handle_sensor_event(point(Team::Black, 600)).unwrap();
        session.handle_sensor_event(point(Team::Yellow, 700)).unwrap();

        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.state().game_mode, Some(GameMode::Competition));
        // Selection armed a fresh match; nothing scored yet
        assert_eq!(session.state().points, ScorePair::default());
    }

    #[test]
    fn test_same_source_repeat_keeps_window_open() {
        let mut session = Session::headless();
        session.handle_sensor_event(point(Team::Black, 100)).unwrap();
        session.handle_sensor_event(point(Team::Black, 600)).unwrap();
        session.handle_sensor_event(point(Team::Black, 800)).unwrap();
        assert_eq!(session.phase(), SessionPhase::ModeSelect);

        // The opposite source still inside the original window wins
        session.handle_sensor_event(point(Team::Yellow, 900)).unwrap();
        assert_eq!(session.state().game_mode, Some(GameMode::Competition));
    }

    #[test]
    fn test_active_events_score_by_classification() {
        let mut session = Session::headless();
        let t = arm_basic(&mut session, 0);

        session.handle_sensor_event(point(Team::Black, t)).unwrap();
        assert_eq!(session.state().display_score, ScorePair { black: 15, yellow: 0 });

        session.handle_sensor_event(subtract(Team::Black, t + 200)).unwrap();
        assert_eq!(session.state().display_score, ScorePair::default());
    }

    #[test]
    fn test_debounced_event_is_rejected_silently() {
        let mut session = Session::headless();
        let t = arm_basic(&mut session, 0);

        session.handle_sensor_event(point(Team::Black, t)).unwrap();
        let err = session
            .handle_sensor_event(point(Team::Black, t + DEBOUNCE_WINDOW_MS - 1))
            .unwrap_err();
        assert_eq!(err, CommandError::Debounced);
        assert_eq!(session.state().points, ScorePair { black: 1, yellow: 0 });
    }

    /// Black wins 48 straight points (6-0, 6-0); returns the timestamp of
    /// the match-deciding event.
    fn play_match_to_winner(session: &mut Session, mut t: u64) -> u64 {
        let mut last = t;
        for _ in 0..48 {
            session.handle_sensor_event(point(Team::Black, t)).unwrap();
            last = t;
            t += DEBOUNCE_WINDOW_MS * 2;
        }
        last
    }

    #[test]
    fn test_match_completion_enters_winner_phase() {
        let mut session = Session::headless();
        let t = arm_basic(&mut session, 0);
        play_match_to_winner(&mut session, t);

        assert_eq!(session.phase(), SessionPhase::Winner);
        assert!(session.state().match_won);
        let summary = session.match_data().expect("summary stored");
        assert_eq!(summary.final_sets_score, "2-0");
    }

    #[test]
    fn test_winner_phase_event_resets_session() {
        let mut session = Session::headless();
        let t = arm_basic(&mut session, 0);
        let t = play_match_to_winner(&mut session, t);

        session.handle_sensor_event(point(Team::Yellow, t)).unwrap();
        assert_eq!(session.phase(), SessionPhase::Splash);
        assert!(!session.state().match_won);
        assert!(session.state().game_mode.is_none());
        assert!(session.match_data().is_none());
    }

    #[test]
    fn test_winner_auto_dismiss_fires_once() {
        let mut session = Session::headless();
        let t = arm_basic(&mut session, 0);
        let t = play_match_to_winner(&mut session, t);

        session.tick(t + WINNER_AUTO_DISMISS_MS - 1);
        assert_eq!(session.phase(), SessionPhase::Winner);

        session.tick(t + WINNER_AUTO_DISMISS_MS + 1_000);
        assert_eq!(session.phase(), SessionPhase::Splash);

        // Stale deadline must not fire again after the reset
        session.handle_sensor_event(point(Team::Black, t + WINNER_AUTO_DISMISS_MS + 2_000)).unwrap();
        assert_eq!(session.phase(), SessionPhase::ModeSelect);
        session.tick(u64::MAX);
        assert_eq!(session.phase(), SessionPhase::ModeSelect);
    }

    #[test]
    fn test_disarmed_active_event_reroutes_to_mode_select() {
        let mut session = Session::headless();
        let t = arm_basic(&mut session, 0);

        session.clear_game_mode();
        assert_eq!(session.phase(), SessionPhase::Active);

        session.handle_sensor_event(point(Team::Black, t)).unwrap();
        assert_eq!(session.phase(), SessionPhase::ModeSelect);
        assert_eq!(session.state().points, ScorePair::default());
    }

    #[test]
    fn test_command_path_mirrors_sensor_semantics() {
        let mut session = Session::headless();
        session.set_game_mode(GameMode::Competition);
        assert_eq!(session.phase(), SessionPhase::Active);

        session.apply_point(Team::Yellow, 1_000).unwrap();
        assert_eq!(session.state().display_score, ScorePair { black: 0, yellow: 15 });

        session.apply_subtract(Team::Yellow).unwrap();
        assert_eq!(session.state().points, ScorePair::default());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = Session::headless();
        arm_basic(&mut session, 0);
        session.reset();
        session.reset();
        assert_eq!(session.phase(), SessionPhase::Splash);
        assert!(session.state().game_mode.is_none());
        assert_eq!(session.state().sets, ScorePair::default());
    }

    fn drain(rx: &Receiver<BroadcastUpdate>) -> Vec<BroadcastUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    #[test]
    fn test_broadcasts_follow_every_mutation() {
        let mut broadcaster = ChannelBroadcaster::new();
        let rx = broadcaster.subscribe();
        let mut session = Session::new(Box::new(broadcaster));

        session.set_game_mode(GameMode::Competition);
        session.apply_point(Team::Black, 1_000).unwrap();

        let updates = drain(&rx);
        assert!(updates.iter().any(|u| matches!(u, BroadcastUpdate::State { .. })));
        assert!(updates
            .iter()
            .any(|u| matches!(u, BroadcastUpdate::PointScored { team: Team::Black, .. })));
    }

    #[test]
    fn test_match_won_broadcast_carries_summary() {
        let mut broadcaster = ChannelBroadcaster::new();
        let rx = broadcaster.subscribe();
        let mut session = Session::new(Box::new(broadcaster));

        let t = arm_basic(&mut session, 0);
        play_match_to_winner(&mut session, t);

        let updates = drain(&rx);
        let won = updates.iter().find_map(|u| match u {
            BroadcastUpdate::MatchWon { winner, match_data } => Some((winner, match_data)),
            _ => None,
        });
        let (winner, match_data) = won.expect("match_won broadcast sent");
        assert_eq!(winner.team, Team::Black);
        assert_eq!(match_data.detailed_sets, vec!["6-0".to_string(), "6-0".to_string()]);
    }

    #[test]
    fn test_basic_fresh_set_switch_broadcast() {
        let mut broadcaster = ChannelBroadcaster::new();
        let rx = broadcaster.subscribe();
        let mut session = Session::new(Box::new(broadcaster));

        let t = arm_basic(&mut session, 0);
        drain(&rx);
        session.handle_sensor_event(point(Team::Black, t)).unwrap();

        let updates = drain(&rx);
        let request = updates.iter().find_map(|u| match u {
            BroadcastUpdate::SideSwitchRequired { request, .. } => Some(request),
            _ => None,
        });
        let request = request.expect("side switch requested on first point of fresh set");
        assert_eq!(request.total_games_in_set, 0);
        assert_eq!(request.set_score, "0-0");
    }

    #[test]
    fn test_scoring_mode_survives_subtract_in_tiebreak() {
        let mut session = Session::headless();
        session.set_game_mode(GameMode::Lock);
        // 6-6 via command path
        let mut t = 0;
        for _ in 0..6 {
            for _ in 0..4 {
                session.apply_point(Team::Black, t).unwrap();
                t += 1;
            }
            for _ in 0..4 {
                session.apply_point(Team::Yellow, t).unwrap();
                t += 1;
            }
        }
        assert_eq!(session.state().scoring_mode, ScoringMode::Tiebreak);

        session.apply_point(Team::Black, t).unwrap();
        session.apply_subtract(Team::Black).unwrap();
        assert_eq!(session.state().scoring_mode, ScoringMode::Tiebreak);
        assert_eq!(session.state().games, ScorePair { black: 6, yellow: 6 });
    }
}
