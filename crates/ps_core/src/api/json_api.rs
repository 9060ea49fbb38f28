//! JSON command surface.
//!
//! Tagged command envelopes in, a uniform `CommandResponse` out. Every
//! response to a state-touching command carries the full authoritative
//! snapshot so a client can always repaint from the last response alone.
//! Transport (HTTP, serial, whatever) stays outside the core.

use serde::{Deserialize, Serialize};

use crate::engine::MatchSummary;
use crate::error::CommandError;
use crate::models::{GameMode, MatchSnapshot, Team};
use crate::session::Session;

fn default_wipe() -> bool {
    true
}

/// One inbound command, tagged by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    AddPoint { team: Team, timestamp_ms: u64 },
    SubtractPoint { team: Team },
    /// Mode arrives as a string so unknown values produce a structured
    /// error instead of a deserialization failure.
    SetGameMode { mode: String },
    ClearGameMode,
    AcknowledgeSideSwitch,
    GetState,
    GetMatchData,
    MarkMatchDisplayed {
        #[serde(default = "default_wipe")]
        wipe_immediately: bool,
    },
    Reset,
}

/// Uniform command response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<MatchSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_data: Option<MatchSummary>,
}

impl CommandResponse {
    fn ok(session: &Session) -> Self {
        Self {
            success: true,
            error: None,
            error_kind: None,
            state: Some(session.state().snapshot()),
            match_data: None,
        }
    }

    fn err(session: &Session, error: CommandError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            state: Some(session.state().snapshot()),
            match_data: None,
        }
    }

    fn bare_err(error: String, kind: &'static str) -> Self {
        Self { success: false, error: Some(error), error_kind: Some(kind), state: None, match_data: None }
    }
}

/// Execute one command against a session.
pub fn process_command(session: &mut Session, command: Command) -> CommandResponse {
    match command {
        Command::AddPoint { team, timestamp_ms } => {
            match session.apply_point(team, timestamp_ms) {
                Ok(()) => CommandResponse::ok(session),
                Err(error) => CommandResponse::err(session, error),
            }
        }
        Command::SubtractPoint { team } => match session.apply_subtract(team) {
            Ok(()) => CommandResponse::ok(session),
            Err(error) => CommandResponse::err(session, error),
        },
        Command::SetGameMode { mode } => match GameMode::parse(&mode) {
            Some(mode) => {
                session.set_game_mode(mode);
                CommandResponse::ok(session)
            }
            None => {
                let error = CommandError::InvalidGameMode(mode);
                CommandResponse::err(session, error)
            }
        },
        Command::ClearGameMode => {
            session.clear_game_mode();
            CommandResponse::ok(session)
        }
        Command::AcknowledgeSideSwitch => {
            session.acknowledge_side_switch();
            CommandResponse::ok(session)
        }
        Command::GetState => CommandResponse::ok(session),
        Command::GetMatchData => match session.match_data().cloned() {
            Some(summary) => {
                let mut response = CommandResponse::ok(session);
                response.match_data = Some(summary);
                response
            }
            None => CommandResponse::err(session, CommandError::NoMatchData),
        },
        Command::MarkMatchDisplayed { wipe_immediately } => {
            if session.mark_match_displayed(wipe_immediately) {
                CommandResponse::ok(session)
            } else {
                CommandResponse::err(session, CommandError::NoMatchData)
            }
        }
        Command::Reset => {
            session.reset();
            CommandResponse::ok(session)
        }
    }
}

/// Parse a command from JSON, execute it, and serialize the response.
pub fn process_command_json(session: &mut Session, json: &str) -> String {
    let response = match serde_json::from_str::<Command>(json) {
        Ok(command) => process_command(session, command),
        Err(error) => {
            CommandResponse::bare_err(format!("invalid command: {error}"), "invalid_command")
        }
    };
    // The response contains no non-serializable types; failure here would be
    // a programming error, so fall back to a fixed envelope.
    serde_json::to_string(&response).unwrap_or_else(|_| {
        r#"{"success":false,"error":"response serialization failed"}"#.to_string()
    })
}
