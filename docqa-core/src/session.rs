//! Session bookkeeping.
//!
//! A session groups the files a client uploaded with the text of the most
//! recently processed one. The answering code never holds sessions itself;
//! the daemon injects a [`SessionStore`] and reads contexts out of it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// State tracked for one client session.
#[derive(Clone, Debug)]
pub struct Session {
    /// Uploaded files owned by this session.
    pub files: Vec<PathBuf>,
    /// Text of the most recent successful upload.
    pub context: String,
    /// Last time the session was written to.
    pub touched_at: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            files: Vec::new(),
            context: String::new(),
            touched_at: Instant::now(),
        }
    }
}

/// Keyed storage for sessions.
///
/// Implementations must keep reads and writes for the same id consistent.
pub trait SessionStore: Send + Sync {
    /// Snapshot of a session.
    fn get(&self, id: &str) -> Option<Session>;

    /// Record a file as owned by the session, creating the session if needed.
    fn add_file(&self, id: &str, path: PathBuf);

    /// Forget a file. Returns whether it was tracked.
    fn remove_file(&self, id: &str, path: &Path) -> bool;

    /// Replace the session's context, creating the session if needed.
    fn set_context(&self, id: &str, context: String);

    /// Remove a session and return what it held.
    fn delete(&self, id: &str) -> Option<Session>;

    /// Ids of sessions not touched within `max_age`.
    fn list_expired(&self, max_age: Duration) -> Vec<String>;

    /// Number of live sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current context of a session, if it has one.
    fn context(&self, id: &str) -> Option<String> {
        self.get(id).map(|s| s.context)
    }
}

/// Process-local session store behind a `RwLock`.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: &str) -> Option<Session> {
        self.read().get(id).cloned()
    }

    fn add_file(&self, id: &str, path: PathBuf) {
        let mut sessions = self.write();
        let session = sessions.entry(id.to_string()).or_insert_with(Session::new);
        session.files.push(path);
        session.touched_at = Instant::now();
    }

    fn remove_file(&self, id: &str, path: &Path) -> bool {
        let mut sessions = self.write();
        let Some(session) = sessions.get_mut(id) else {
            return false;
        };
        let before = session.files.len();
        session.files.retain(|p| p != path);
        session.files.len() != before
    }

    fn set_context(&self, id: &str, context: String) {
        let mut sessions = self.write();
        let session = sessions.entry(id.to_string()).or_insert_with(Session::new);
        session.context = context;
        session.touched_at = Instant::now();
    }

    fn delete(&self, id: &str) -> Option<Session> {
        self.write().remove(id)
    }

    fn list_expired(&self, max_age: Duration) -> Vec<String> {
        let now = Instant::now();
        self.read()
            .iter()
            .filter(|(_, s)| now.duration_since(s.touched_at) >= max_age)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}
