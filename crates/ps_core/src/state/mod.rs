//! Global session registry.
//!
//! Thread-safe map from session id to its `Session`. The registry lock only
//! guards lookup and insertion; each session carries its own mutex so that
//! all mutation of one session is serialized while different sessions score
//! concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use once_cell::sync::Lazy;
use tracing::info;
use uuid::Uuid;

use crate::broadcast::StateBroadcaster;
use crate::session::Session;

/// Global session registry singleton
pub static SESSIONS: Lazy<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Create a headless session and register it, returning its id.
pub fn create_session() -> Uuid {
    register(Session::headless())
}

/// Create a session with the given broadcaster and register it.
pub fn create_session_with(broadcaster: Box<dyn StateBroadcaster>) -> Uuid {
    register(Session::new(broadcaster))
}

fn register(session: Session) -> Uuid {
    let id = Uuid::new_v4();
    SESSIONS
        .write()
        .expect("SESSIONS lock poisoned")
        .insert(id, Arc::new(Mutex::new(session)));
    info!(session_id = %id, "session created");
    id
}

/// Look up a session by id. Callers lock the returned mutex for the duration
/// of one command.
pub fn get_session(id: Uuid) -> Option<Arc<Mutex<Session>>> {
    SESSIONS.read().expect("SESSIONS lock poisoned").get(&id).cloned()
}

/// Drop a session from the registry. Returns true if it existed.
pub fn remove_session(id: Uuid) -> bool {
    let removed = SESSIONS.write().expect("SESSIONS lock poisoned").remove(&id).is_some();
    if removed {
        info!(session_id = %id, "session removed");
    }
    removed
}

pub fn session_count() -> usize {
    SESSIONS.read().expect("SESSIONS lock poisoned").len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameMode, Team};
    use crate::session::SessionPhase;

    #[test]
    fn test_create_get_remove_session() {
        let id = create_session();
        let handle = get_session(id).expect("session should be registered");

        {
            let mut session = handle.lock().unwrap();
            session.set_game_mode(GameMode::Basic);
            session.apply_point(Team::Black, 0).unwrap();
            assert_eq!(session.phase(), SessionPhase::Active);
        }

        assert!(remove_session(id));
        assert!(get_session(id).is_none());
        assert!(!remove_session(id));
    }

    #[test]
    fn test_sessions_are_independent() {
        let a = create_session();
        let b = create_session();

        {
            let handle = get_session(a).unwrap();
            let mut session = handle.lock().unwrap();
            session.set_game_mode(GameMode::Competition);
            session.apply_point(Team::Yellow, 0).unwrap();
        }

        {
            let handle = get_session(b).unwrap();
            let session = handle.lock().unwrap();
            assert_eq!(session.phase(), SessionPhase::Splash);
            assert!(session.state().game_mode.is_none());
        }

        remove_session(a);
        remove_session(b);
    }
}
