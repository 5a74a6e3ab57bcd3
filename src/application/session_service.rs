// Session service - Per-session chart selection
use crate::domain::chart::{ChartSelection, Trigger};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub selection: ChartSelection,
    /// True when the caller presented no session id and a new one was issued
    pub created: bool,
}

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    selection: ChartSelection,
    last_seen: Instant,
}

/// Sessions are stored only once a trigger has been applied, and are dropped
/// after `ttl` without a request.
#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionService {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Look up the caller's session. A caller without an id gets a fresh one;
    /// unknown or expired ids start over on the initial chart. Neither is
    /// stored until a trigger is applied.
    pub async fn resolve(&self, requested: Option<Uuid>) -> Session {
        let Some(id) = requested else {
            return Session {
                id: Uuid::new_v4(),
                selection: ChartSelection::default(),
                created: true,
            };
        };

        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions, now);

        let selection = match sessions.get_mut(&id) {
            Some(entry) => {
                entry.last_seen = now;
                entry.selection
            }
            None => ChartSelection::default(),
        };

        Session {
            id,
            selection,
            created: false,
        }
    }

    pub async fn apply(&self, id: Uuid, trigger: Trigger) -> ChartSelection {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions, now);

        let entry = sessions.entry(id).or_insert_with(|| {
            tracing::debug!("Opened session {}", id);
            SessionEntry {
                selection: ChartSelection::default(),
                last_seen: now,
            }
        });
        let current = entry.selection;
        let next = current.apply(trigger);

        tracing::debug!("Session {}: {:?} --{:?}--> {:?}", id, current, trigger, next);
        entry.selection = next;
        entry.last_seen = now;
        next
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.ttl);

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!("Expired {} idle sessions", evicted);
        }
    }
}
