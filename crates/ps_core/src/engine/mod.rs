pub mod scoring;
pub mod side_switch;
pub mod stats;

pub use scoring::{PointOutcome, PointReport, ScoringEngine};
pub use side_switch::SideSwitchRequired;
pub use stats::{MatchStorage, MatchSummary, SetBreakdown};
