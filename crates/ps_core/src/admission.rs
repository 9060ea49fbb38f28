//! Sensor event admission: debounce + classification pass-through.
//!
//! Raw trigger events arrive per source (one sensor per team end). Admission
//! keeps the last accepted timestamp per source and silently drops anything
//! that lands inside the debounce window; sources are independent of each
//! other. Classification (point vs. subtract) is decided upstream by the
//! sensor layer and passed through unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DEBOUNCE_WINDOW_MS;
use crate::error::{CommandError, Result};
use crate::models::Team;

/// Scoring action classified by the sensor layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorAction {
    Point,
    Subtract,
}

/// Raw, possibly-noisy hardware trigger. Ephemeral; not persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorEvent {
    pub source: Team,
    pub timestamp_ms: u64,
    pub action_hint: SensorAction,
}

/// A trigger that passed debounce; consumed exactly once by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmittedEvent {
    pub team: Team,
    pub action: SensorAction,
    pub timestamp_ms: u64,
}

/// Per-source debounce state.
#[derive(Debug)]
pub struct SensorEventAdmission {
    window_ms: u64,
    last_accepted: HashMap<Team, u64>,
}

impl SensorEventAdmission {
    pub fn new() -> Self {
        Self::with_window(DEBOUNCE_WINDOW_MS)
    }

    pub fn with_window(window_ms: u64) -> Self {
        Self { window_ms, last_accepted: HashMap::new() }
    }

    /// Admit or drop one raw event. Two events from the same source closer
    /// than the window apart reject the second; different sources never
    /// interfere.
    pub fn admit(&mut self, event: SensorEvent) -> Result<AdmittedEvent> {
        if let Some(&last) = self.last_accepted.get(&event.source) {
            if event.timestamp_ms.saturating_sub(last) < self.window_ms {
                debug!(source = %event.source, ts = event.timestamp_ms, "trigger debounced");
                return Err(CommandError::Debounced);
            }
        }
        self.last_accepted.insert(event.source, event.timestamp_ms);
        Ok(AdmittedEvent {
            team: event.source,
            action: event.action_hint,
            timestamp_ms: event.timestamp_ms,
        })
    }

    /// Forget all debounce state (used on session reset).
    pub fn clear(&mut self) {
        self.last_accepted.clear();
    }
}

impl Default for SensorEventAdmission {
    fn default() -> Self {
        Self::new()
    }
}
