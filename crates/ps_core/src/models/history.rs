//! Match audit trail and per-set result records.
//!
//! The point history is append-only and never rewritten; statistics are
//! derived from it after the match ends. Set results are kept as tagged
//! records and rendered to the legacy display strings ("7-6(5)",
//! "10-8(STB)") only at the viewer boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::score::ScorePair;
use super::team::Team;

/// What a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Point,
    PointSubtract,
    Game,
    Set,
    Match,
}

/// Display score / games / sets captured around a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub display: ScorePair,
    pub games: ScorePair,
    pub sets: ScorePair,
}

/// One append-only audit entry. `before` is the state when the triggering
/// event arrived, `after` the state once all resulting transitions settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub action: HistoryAction,
    pub team: Team,
    pub before: ScoreSnapshot,
    pub after: ScoreSnapshot,
}

/// How a completed set was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiebreakKind {
    Normal,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiebreakRecord {
    pub kind: TiebreakKind,
    /// Tie-break points of the losing team, shown in parentheses.
    pub loser_points: u32,
}

/// Result of one completed set, black-first orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRecord {
    pub games_black: u32,
    pub games_yellow: u32,
    pub winner: Team,
    pub tiebreak: Option<TiebreakRecord>,
}

impl SetRecord {
    /// A set decided on games alone, e.g. 6-4.
    pub fn normal(games_black: u32, games_yellow: u32, winner: Team) -> Self {
        Self { games_black, games_yellow, winner, tiebreak: None }
    }

    /// A set decided by the 6-6 tie-break; games end 7-6 for the winner.
    pub fn tiebreak(winner: Team, loser_points: u32) -> Self {
        let (games_black, games_yellow) = match winner {
            Team::Black => (7, 6),
            Team::Yellow => (6, 7),
        };
        Self {
            games_black,
            games_yellow,
            winner,
            tiebreak: Some(TiebreakRecord { kind: TiebreakKind::Normal, loser_points }),
        }
    }

    /// The deciding super tie-break played at one set all; recorded as
    /// 10-x like the legacy display.
    pub fn super_tiebreak(winner: Team, loser_points: u32) -> Self {
        let (games_black, games_yellow) = match winner {
            Team::Black => (10, loser_points),
            Team::Yellow => (loser_points, 10),
        };
        Self {
            games_black,
            games_yellow,
            winner,
            tiebreak: Some(TiebreakRecord { kind: TiebreakKind::Super, loser_points }),
        }
    }

    pub fn games_for(&self, team: Team) -> u32 {
        match team {
            Team::Black => self.games_black,
            Team::Yellow => self.games_yellow,
        }
    }

    /// Legacy display label: "6-4", "7-6(5)", "6-7(3)", "10-8(STB)".
    pub fn label(&self) -> String {
        match self.tiebreak {
            None => format!("{}-{}", self.games_black, self.games_yellow),
            Some(TiebreakRecord { kind: TiebreakKind::Normal, loser_points }) => {
                format!("{}-{}({})", self.games_black, self.games_yellow, loser_points)
            }
            Some(TiebreakRecord { kind: TiebreakKind::Super, .. }) => {
                format!("{}-{}(STB)", self.games_black, self.games_yellow)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_set_label() {
        assert_eq!(SetRecord::normal(6, 4, Team::Black).label(), "6-4");
        assert_eq!(SetRecord::normal(3, 6, Team::Yellow).label(), "3-6");
    }

    #[test]
    fn test_tiebreak_label_orientation() {
        assert_eq!(SetRecord::tiebreak(Team::Black, 5).label(), "7-6(5)");
        assert_eq!(SetRecord::tiebreak(Team::Yellow, 3).label(), "6-7(3)");
    }

    #[test]
    fn test_super_tiebreak_label() {
        assert_eq!(SetRecord::super_tiebreak(Team::Black, 8).label(), "10-8(STB)");
        assert_eq!(SetRecord::super_tiebreak(Team::Yellow, 6).label(), "6-10(STB)");
    }

    #[test]
    fn test_games_for_winner() {
        let set = SetRecord::tiebreak(Team::Yellow, 4);
        assert_eq!(set.games_for(Team::Yellow), 7);
        assert_eq!(set.games_for(Team::Black), 6);
    }
}
