use serde::{Deserialize, Serialize};

use super::team::Team;

/// A pair of per-team counters (raw points, display score, games, or sets).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePair {
    pub black: u32,
    pub yellow: u32,
}

impl ScorePair {
    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::Black => self.black,
            Team::Yellow => self.yellow,
        }
    }

    pub fn get_mut(&mut self, team: Team) -> &mut u32 {
        match team {
            Team::Black => &mut self.black,
            Team::Yellow => &mut self.yellow,
        }
    }

    pub fn total(&self) -> u32 {
        self.black + self.yellow
    }

    pub fn reset(&mut self) {
        self.black = 0;
        self.yellow = 0;
    }

    /// Lead of `team` over the opponent; zero when behind.
    pub fn lead(&self, team: Team) -> u32 {
        self.get(team).saturating_sub(self.get(team.opponent()))
    }

    /// Black-first score label, e.g. "6-4".
    pub fn label(&self) -> String {
        format!("{}-{}", self.black, self.yellow)
    }
}

/// Point-to-display mapping and win thresholds for the current game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    Normal,
    Tiebreak,
    SuperTiebreak,
}

impl ScoringMode {
    /// Raw point count at which a win becomes possible (lead of 2 still
    /// required).
    pub fn win_threshold(self) -> u32 {
        match self {
            ScoringMode::Normal => 4,
            ScoringMode::Tiebreak => 7,
            ScoringMode::SuperTiebreak => 10,
        }
    }

    /// Map a raw point count to its displayed value. NORMAL shows the
    /// classic 0/15/30/40 ladder, capped at 40; tie-breaks display raw
    /// counts.
    pub fn display_points(self, raw: u32) -> u32 {
        match self {
            ScoringMode::Normal => match raw {
                0 => 0,
                1 => 15,
                2 => 30,
                _ => 40,
            },
            ScoringMode::Tiebreak | ScoringMode::SuperTiebreak => raw,
        }
    }
}

/// Side-switch cadence selected for the match. Scoring is not armed until
/// one of these is chosen (`MatchState.game_mode == None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Basic,
    Competition,
    Lock,
}

impl GameMode {
    /// Parse the wire-format mode string. Unknown strings are rejected by
    /// the caller as `InvalidGameMode`.
    pub fn parse(s: &str) -> Option<GameMode> {
        match s {
            "basic" => Some(GameMode::Basic),
            "competition" => Some(GameMode::Competition),
            "lock" => Some(GameMode::Lock),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Basic => "basic",
            GameMode::Competition => "competition",
            GameMode::Lock => "lock",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_display_ladder() {
        let mode = ScoringMode::Normal;
        assert_eq!(mode.display_points(0), 0);
        assert_eq!(mode.display_points(1), 15);
        assert_eq!(mode.display_points(2), 30);
        assert_eq!(mode.display_points(3), 40);
        // Uncapped raw counts (deuce headroom) still display as 40
        assert_eq!(mode.display_points(9), 40);
    }

    #[test]
    fn test_tiebreak_display_is_raw() {
        assert_eq!(ScoringMode::Tiebreak.display_points(6), 6);
        assert_eq!(ScoringMode::SuperTiebreak.display_points(11), 11);
    }

    #[test]
    fn test_lead() {
        let pair = ScorePair { black: 5, yellow: 3 };
        assert_eq!(pair.lead(Team::Black), 2);
        assert_eq!(pair.lead(Team::Yellow), 0);
    }

    #[test]
    fn test_game_mode_parse() {
        assert_eq!(GameMode::parse("competition"), Some(GameMode::Competition));
        assert_eq!(GameMode::parse("turbo"), None);
    }
}
