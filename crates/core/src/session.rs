//! Injected session cache, replacing the module-level auth maps the
//! original application kept. Owned by the request-handling context and
//! invalidated explicitly on sign-out.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::user::Role;

#[derive(Clone, Debug)]
struct SessionEntry {
    role: Role,
    cached_at: Instant,
}

#[derive(Debug)]
pub struct SessionCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    /// Cache the resolved role for a session token. The auth collaborator
    /// owns token verification; this only memoizes its result.
    pub fn insert(&self, token: impl Into<String>, role: Role) {
        let mut entries = self.entries.lock().expect("session cache lock poisoned");
        entries.insert(token.into(), SessionEntry { role, cached_at: Instant::now() });
    }

    /// Resolve a token to its cached role. Expired entries are removed on
    /// the way out, so a stale session can never authorize a request.
    pub fn resolve(&self, token: &str) -> Option<Role> {
        let mut entries = self.entries.lock().expect("session cache lock poisoned");
        match entries.get(token) {
            Some(entry) if entry.cached_at.elapsed() < self.ttl => Some(entry.role),
            Some(_) => {
                entries.remove(token);
                None
            }
            None => None,
        }
    }

    /// Sign-out: drop the token immediately.
    pub fn invalidate(&self, token: &str) -> bool {
        let mut entries = self.entries.lock().expect("session cache lock poisoned");
        entries.remove(token).is_some()
    }

    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().expect("session cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| entry.cached_at.elapsed() < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("session cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
