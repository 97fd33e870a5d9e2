//! Thread-safe map of session id to session state.
//!
//! The registry is cheap to clone (it uses `Arc` internally) and clones share
//! the same sessions. Each session is isolated; nothing is shared between
//! them.

use super::state::{Activity, SessionState, MAX_INACTIVITY_MINUTES};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// What happened when a request touched its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Touch {
    /// The session did not exist before this request.
    pub created: bool,

    /// The session had been idle past the threshold and was cleared.
    pub reset: bool,
}

/// All live sessions.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
    inactivity: Duration,
}

impl SessionRegistry {
    /// Create a registry that clears sessions idle for longer than
    /// `inactivity_minutes`.
    ///
    /// Values above [`MAX_INACTIVITY_MINUTES`] saturate to the longest
    /// representable duration.
    pub fn new(inactivity_minutes: u64) -> Self {
        let inactivity = i64::try_from(inactivity_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .unwrap_or(Duration::MAX);
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            inactivity,
        }
    }

    pub fn inactivity(&self) -> Duration {
        self.inactivity
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, SessionState>> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, SessionState>> {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an interaction for `session_id` at `now`.
    ///
    /// Must run before any other per-request logic. Creates the session on
    /// first use; otherwise applies the inactivity rule.
    pub fn touch(&self, session_id: &str, now: DateTime<Utc>) -> Touch {
        let mut sessions = self.write();
        match sessions.get_mut(session_id) {
            Some(state) => {
                let reset = state.touch(now, self.inactivity) == Activity::Expired;
                if reset {
                    tracing::info!("Session {} reset after inactivity", session_id);
                }
                Touch {
                    created: false,
                    reset,
                }
            }
            None => {
                sessions.insert(session_id.to_string(), SessionState::new(now));
                tracing::debug!("Session {} created", session_id);
                Touch {
                    created: true,
                    reset: false,
                }
            }
        }
    }

    /// Run `f` against the session's state, creating it if needed.
    ///
    /// This does not touch the inactivity clock.
    pub fn update<R>(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> R {
        let mut sessions = self.write();
        let state = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(now));
        f(state)
    }

    /// Copy of the session's state, if it exists.
    pub fn snapshot(&self, session_id: &str) -> Option<SessionState> {
        self.read().get(session_id).cloned()
    }

    /// Drop a session entirely.
    pub fn remove(&self, session_id: &str) {
        self.write().remove(session_id);
    }

    /// Number of sessions held.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(super::state::DEFAULT_INACTIVITY_MINUTES)
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("inactivity", &self.inactivity)
            .field("sessions", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DrugId;
    use chrono::TimeZone;
    use std::thread;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_touch_creates_session() {
        let registry = SessionRegistry::new(30);
        let touch = registry.touch("alice", t0());
        assert!(touch.created);
        assert!(!touch.reset);
        assert_eq!(registry.len(), 1);

        let touch = registry.touch("alice", t0());
        assert!(!touch.created);
    }

    #[test]
    fn test_touch_resets_idle_session() {
        let registry = SessionRegistry::new(30);
        registry.touch("alice", t0());
        registry.update("alice", t0(), |s| {
            s.add_bookmark(DrugId::new("1").unwrap());
            s.record_search("keppra", t0());
        });

        let touch = registry.touch("alice", t0() + Duration::minutes(45));
        assert!(touch.reset);

        let state = registry.snapshot("alice").unwrap();
        assert!(state.bookmarks().is_empty());
        assert!(state.history().is_empty());
        assert_eq!(state.last_active(), t0() + Duration::minutes(45));
    }

    #[test]
    fn test_touch_at_boundary_keeps_session() {
        let registry = SessionRegistry::new(30);
        registry.touch("alice", t0());
        registry.update("alice", t0(), |s| s.add_bookmark(DrugId::new("1").unwrap()));

        let touch = registry.touch("alice", t0() + Duration::minutes(30));
        assert!(!touch.reset);
        assert_eq!(registry.snapshot("alice").unwrap().bookmarks().len(), 1);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new(30);
        registry.update("alice", t0(), |s| s.add_bookmark(DrugId::new("1").unwrap()));
        registry.update("bob", t0(), |s| s.record_search("depakine", t0()));

        let alice = registry.snapshot("alice").unwrap();
        let bob = registry.snapshot("bob").unwrap();
        assert_eq!(alice.bookmarks().len(), 1);
        assert!(alice.history().is_empty());
        assert!(bob.bookmarks().is_empty());
        assert_eq!(bob.history().len(), 1);
    }

    #[test]
    fn test_remove() {
        let registry = SessionRegistry::new(30);
        registry.touch("alice", t0());
        registry.remove("alice");
        assert!(registry.snapshot("alice").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clones_share_sessions() {
        let registry = SessionRegistry::new(30);
        let clone = registry.clone();
        clone.touch("alice", t0());
        assert!(registry.snapshot("alice").is_some());
    }

    #[test]
    fn test_concurrent_access() {
        let registry = SessionRegistry::new(30);
        let clone = registry.clone();

        let handle = thread::spawn(move || {
            for i in 0..100 {
                clone.touch(&format!("session{}", i), t0());
            }
        });

        for i in 100..200 {
            registry.touch(&format!("session{}", i), t0());
        }

        handle.join().unwrap();
        assert_eq!(registry.len(), 200);
    }

    #[test]
    fn test_oversized_threshold_saturates() {
        let registry = SessionRegistry::new(u64::MAX);
        assert_eq!(registry.inactivity(), Duration::MAX);

        let registry = SessionRegistry::new(MAX_INACTIVITY_MINUTES + 1);
        assert_eq!(registry.inactivity(), Duration::MAX);

        registry.touch("alice", t0());
        let touch = registry.touch("alice", t0() + Duration::days(3650));
        assert!(!touch.reset);
    }

    #[test]
    fn test_largest_threshold_is_exact() {
        let registry = SessionRegistry::new(MAX_INACTIVITY_MINUTES);
        assert_eq!(
            registry.inactivity(),
            Duration::minutes(MAX_INACTIVITY_MINUTES as i64)
        );
    }

    #[test]
    fn test_debug_format() {
        let registry = SessionRegistry::new(30);
        let debug_str = format!("{:?}", registry);
        assert!(debug_str.contains("SessionRegistry"));
        assert!(debug_str.contains("inactivity"));
    }
}
