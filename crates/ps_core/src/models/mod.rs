pub mod history;
pub mod match_state;
pub mod score;
pub mod team;

pub use history::{
    HistoryAction, HistoryEntry, ScoreSnapshot, SetRecord, TiebreakKind, TiebreakRecord,
};
pub use match_state::{MatchSnapshot, MatchState, MatchWinner};
pub use score::{GameMode, ScorePair, ScoringMode};
pub use team::Team;
