//! Session id persistence
//!
//! Creates, restores, and replaces the conversation's session identifier.

use crate::storage::local::KeyValueStore;
use rand::Rng;

/// Key under which the session id is stored
pub const SESSION_KEY: &str = "news-session-id";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// How the session id was obtained at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStart {
    /// A stored id was found; its history should be loaded
    Restored(String),
    /// No stored id; a fresh one was generated and persisted
    Created(String),
}

/// Owns the session id and its persisted copy
pub struct SessionStore {
    storage: Box<dyn KeyValueStore>,
    current: Option<String>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            current: None,
        }
    }

    /// The active session id, once `restore_or_create` has run
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Return the stored id if there is one, otherwise create and persist a new one
    pub fn restore_or_create(&mut self) -> SessionStart {
        if let Some(stored) = self.storage.get(SESSION_KEY).filter(|id| !id.is_empty()) {
            tracing::info!("Restored session {}", stored);
            self.current = Some(stored.clone());
            return SessionStart::Restored(stored);
        }

        let id = self.replace(None, generate_session_id);
        tracing::info!("Created session {}", id);
        SessionStart::Created(id)
    }

    /// Discard the current id and persist a freshly generated one
    pub fn reset(&mut self) -> String {
        let previous = self.current.take();
        let id = self.replace(previous.as_deref(), generate_session_id);
        tracing::info!("Replaced session {:?} with {}", previous, id);
        id
    }

    /// Persist a generated id that differs from `previous`
    fn replace(&mut self, previous: Option<&str>, mut generate: impl FnMut() -> String) -> String {
        let mut id = generate();
        while previous == Some(id.as_str()) {
            id = generate();
        }
        if let Err(e) = self.storage.set(SESSION_KEY, &id) {
            tracing::warn!("Failed to persist session id: {}", e);
        }
        self.current = Some(id.clone());
        id
    }
}

/// Build a new id: `session_<9 base-36 chars>_<unix millis>`
pub fn generate_session_id() -> String {
    let mut rng = rand::rng();
    let token: String = (0..9)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("session_{}_{}", token, chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::local::MemoryStore;

    #[test]
    fn test_generated_id_format() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert_eq!(parts[1].len(), 9);
        assert!(parts[1].bytes().all(|b| BASE36.contains(&b)));
        assert!(parts[2].parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_create_on_first_visit() {
        let mut store = SessionStore::new(Box::new(MemoryStore::new()));
        let SessionStart::Created(id) = store.restore_or_create() else {
            panic!("expected a fresh session");
        };
        assert_eq!(store.current(), Some(id.as_str()));
    }

    #[test]
    fn test_restore_verbatim() {
        let mut memory = MemoryStore::new();
        memory.set(SESSION_KEY, "session_abc123_999").unwrap();
        let mut store = SessionStore::new(Box::new(memory));

        let start = store.restore_or_create();
        assert_eq!(start, SessionStart::Restored("session_abc123_999".into()));
        assert_eq!(store.current(), Some("session_abc123_999"));
    }

    #[test]
    fn test_reset_replaces_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        let file = crate::storage::local::FileStore::open(&path).unwrap();
        let mut store = SessionStore::new(Box::new(file));

        store.restore_or_create();
        let first = store.current().unwrap().to_string();
        let second = store.reset();
        assert_ne!(first, second);

        let reopened = crate::storage::local::FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(SESSION_KEY), Some(second));
    }

    #[test]
    fn test_replacement_skips_previous_id() {
        let mut store = SessionStore::new(Box::new(MemoryStore::new()));
        let mut candidates = vec!["session_fresh_2".to_string(), "session_old_1".to_string()];

        let id = store.replace(Some("session_old_1"), || candidates.pop().unwrap());

        assert_eq!(id, "session_fresh_2");
        assert!(candidates.is_empty());
        assert_eq!(store.current(), Some("session_fresh_2"));
    }
}
