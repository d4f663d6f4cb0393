//! In-memory visitor state.
//!
//! Each visitor id maps to an optional signed-in [`Session`] and a queue of
//! flash notices. Entries idle for longer than the configured limit are
//! dropped by [`SessionStore::prune_idle`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::{Notice, Session};

/// Everything remembered about one visitor.
#[derive(Debug, Clone)]
pub struct VisitorState {
    pub session: Option<Session>,
    pub notices: Vec<Notice>,
    /// Last request or write for this visitor
    pub last_seen: Instant,
}

impl Default for VisitorState {
    fn default() -> Self {
        Self {
            session: None,
            notices: Vec::new(),
            last_seen: Instant::now(),
        }
    }
}

impl VisitorState {
    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }
}

/// In-memory visitor state, keyed by session id.
///
/// State is lost when the process restarts.
#[derive(Clone, Default)]
pub struct SessionStore {
    visitors: Arc<RwLock<HashMap<String, VisitorState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visitors holding state.
    pub async fn len(&self) -> usize {
        self.visitors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Handle for an existing or fresh visitor id.
    pub fn visitor(&self, id: impl Into<String>) -> Visitor {
        Visitor {
            id: id.into(),
            store: self.clone(),
        }
    }

    /// Handle for a brand new visitor.
    pub fn new_visitor(&self) -> Visitor {
        self.visitor(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Drop visitors that have gone quiet.
    ///
    /// Signed-in visitors are kept for `idle_timeout` after their last
    /// request. Anonymous entries only hold notices nobody came back for and
    /// are kept for `notice_ttl`. Returns the number of entries removed.
    pub async fn prune_idle(&self, idle_timeout: Duration, notice_ttl: Duration) -> usize {
        let mut visitors = self.visitors.write().await;
        let now = Instant::now();
        let before_count = visitors.len();

        visitors.retain(|_, state| {
            let limit = if state.session.is_some() { idle_timeout } else { notice_ttl };
            state.idle_for(now) < limit
        });

        before_count.saturating_sub(visitors.len())
    }
}

/// A visitor's view of the session store, handed to handlers by the
/// session middleware.
#[derive(Clone)]
pub struct Visitor {
    id: String,
    store: SessionStore,
}

impl Visitor {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn session(&self) -> Option<Session> {
        self.store
            .visitors
            .read()
            .await
            .get(&self.id)
            .and_then(|state| state.session.clone())
    }

    pub async fn sign_in(&self, session: Session) {
        let mut visitors = self.store.visitors.write().await;
        let state = visitors.entry(self.id.clone()).or_default();
        state.session = Some(session);
        state.last_seen = Instant::now();
    }

    /// Mark the visitor as active, if anything is stored for it.
    pub async fn touch(&self) {
        if let Some(state) = self.store.visitors.write().await.get_mut(&self.id) {
            state.last_seen = Instant::now();
        }
    }

    /// Move this visitor's state under a fresh id and forget the old one.
    ///
    /// Used on sign-in so an id handed out before authentication never
    /// carries a session.
    pub async fn rotate(&self) -> Visitor {
        let fresh = self.store.new_visitor();
        let mut visitors = self.store.visitors.write().await;
        if let Some(state) = visitors.remove(&self.id) {
            visitors.insert(fresh.id.clone(), state);
        }
        fresh
    }

    /// Forget everything about this visitor, pending notices included.
    pub async fn clear(&self) {
        self.store.visitors.write().await.remove(&self.id);
    }

    /// Queue a notice for the next rendered page.
    pub async fn flash(&self, notice: Notice) {
        let mut visitors = self.store.visitors.write().await;
        let state = visitors.entry(self.id.clone()).or_default();
        state.notices.push(notice);
        state.last_seen = Instant::now();
    }

    /// Drain queued notices.
    pub async fn take_notices(&self) -> Vec<Notice> {
        let mut visitors = self.store.visitors.write().await;
        match visitors.get_mut(&self.id) {
            Some(state) => {
                let notices = std::mem::take(&mut state.notices);
                if state.session.is_none() {
                    visitors.remove(&self.id);
                }
                notices
            }
            None => Vec::new(),
        }
    }
}
