use thiserror::Error;

/// Rejection kinds for scoring commands and sensor admission.
///
/// None of these are fatal: every rejection leaves the match state untouched
/// and is reported as a structured result so callers can ignore, retry, or
/// reroute.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("match is already completed")]
    MatchAlreadyComplete,

    #[error("scoring is not armed: no game mode selected")]
    ScoringNotArmed,

    #[error("invalid game mode: {0}")]
    InvalidGameMode(String),

    #[error("event dropped by debounce window")]
    Debounced,

    #[error("no completed match data")]
    NoMatchData,
}

impl CommandError {
    /// Stable machine-readable kind for API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::MatchAlreadyComplete => "match_already_complete",
            CommandError::ScoringNotArmed => "scoring_not_armed",
            CommandError::InvalidGameMode(_) => "invalid_game_mode",
            CommandError::Debounced => "debounced",
            CommandError::NoMatchData => "no_match_data",
        }
    }

    /// `ScoringNotArmed` hints the session router to treat the event as a
    /// mode-selection trigger instead of a scoring action.
    pub fn should_reroute(&self) -> bool {
        matches!(self, CommandError::ScoringNotArmed)
    }

    /// Whether the rejection is user-visible. Debounce drops are silent.
    pub fn is_silent(&self) -> bool {
        matches!(self, CommandError::Debounced)
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;
