//! In-memory registry of import sessions.
//!
//! Sessions are process-local, best-effort progress state: lost on
//! restart by design, and swept a fixed retention window after their
//! worker finishes. All access goes through this narrow interface so the
//! registry's concurrency discipline and lifetime are explicit rather
//! than ambient global state.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use ataka_core::import::ImportSession;

struct StoredSession {
    session: ImportSession,
    /// Set once the worker finishes; the sweeper removes the session
    /// after this instant. `None` while the worker is still running.
    expires_at: Option<Instant>,
}

/// Mutex-guarded map of session id to session state.
#[derive(Default)]
pub struct ImportSessionStore {
    sessions: Mutex<HashMap<String, StoredSession>>,
}

impl ImportSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly allocated session.
    pub fn create(&self, session: ImportSession) {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        sessions.insert(
            session.id.clone(),
            StoredSession {
                session,
                expires_at: None,
            },
        );
    }

    /// Snapshot a session by id. Expired sessions read as absent even if
    /// the sweeper has not run yet.
    pub fn get(&self, id: &str) -> Option<ImportSession> {
        let sessions = self.sessions.lock().expect("session store poisoned");
        sessions.get(id).and_then(|stored| {
            if stored.is_expired(Instant::now()) {
                None
            } else {
                Some(stored.session.clone())
            }
        })
    }

    /// Mutate a session in place under the lock. Returns `false` when the
    /// session no longer exists.
    pub fn update<F>(&self, id: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut ImportSession),
    {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        match sessions.get_mut(id) {
            Some(stored) => {
                mutate(&mut stored.session);
                true
            }
            None => false,
        }
    }

    /// Schedule a session's removal `retention` from now.
    pub fn schedule_expiry(&self, id: &str, retention: Duration) {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        if let Some(stored) = sessions.get_mut(id) {
            stored.expires_at = Some(Instant::now() + retention);
        }
    }

    /// Remove a session immediately.
    pub fn remove(&self, id: &str) {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        sessions.remove(id);
    }

    /// Drop every session whose retention window has passed. Returns the
    /// number removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        let before = sessions.len();
        sessions.retain(|_, stored| !stored.is_expired(now));
        before - sessions.len()
    }

    /// Number of live (unexpired) sessions.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let sessions = self.sessions.lock().expect("session store poisoned");
        sessions.values().filter(|s| !s.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StoredSession {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
