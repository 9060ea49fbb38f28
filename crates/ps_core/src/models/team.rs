use serde::{Deserialize, Serialize};
use std::fmt;

/// Court end identifier. Every sensor source and every score counter is
/// keyed by one of the two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Black,
    Yellow,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Black => Team::Yellow,
            Team::Yellow => Team::Black,
        }
    }

    /// Display name used on the winner screen.
    pub fn display_name(self) -> &'static str {
        match self {
            Team::Black => "BLACK TEAM",
            Team::Yellow => "YELLOW TEAM",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Team::Black => write!(f, "black"),
            Team::Yellow => write!(f, "yellow"),
        }
    }
}
