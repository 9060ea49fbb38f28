pub mod json_api;

pub use json_api::{process_command, process_command_json, Command, CommandResponse};
