/// HTTP Session Tracking
///
/// Sessions are opened by `initialize` and identified by the `Mcp-Session-Id`
/// header on every later request. The set of live ids is the host's only
/// shared mutable state.
///
/// Ids are only dropped by DELETE; clients that re-initialize without
/// deleting leave their old ids in the set for the life of the process.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Header carrying the session id in both directions.
pub const SESSION_HEADER: &str = "mcp-session-id";

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashSet<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session and return its id (32 lowercase hex characters).
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.lock().insert(id.clone());
        id
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    /// Close a session. Returns false if it was not open.
    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id)
    }

    // A panic while holding the lock cannot leave a HashSet half-updated.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_contains_remove() {
        let store = SessionStore::new();
        assert!(!store.contains("missing"));

        let id = store.create();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(store.contains(&id));

        assert!(store.remove(&id));
        assert!(!store.contains(&id));
        assert!(!store.remove(&id));
    }

    #[test]
    fn test_ids_are_unique() {
        let store = SessionStore::new();
        let a = store.create();
        let b = store.create();
        assert_ne!(a, b);
        assert!(store.contains(&a) && store.contains(&b));
    }
}
