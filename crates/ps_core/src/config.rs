//! Timing constants for the admission and session layers.
//!
//! All windows are compared against caller-supplied millisecond timestamps;
//! the core never reads the wall clock for these, so behavior stays
//! deterministic under test.

/// Minimum gap between two accepted trigger events from the same source.
/// Anything closer is treated as sensor bounce and dropped.
pub const DEBOUNCE_WINDOW_MS: u64 = 100;

/// Mode-selection coincidence window. A second trigger from the opposite
/// source inside this window selects COMPETITION; window expiry selects BASIC.
pub const MODE_SELECT_WINDOW_MS: u64 = 400;

/// Delay before the winner screen auto-dismisses and the session resets,
/// unless a trigger event pre-empts it.
pub const WINNER_AUTO_DISMISS_MS: u64 = 30_000;
