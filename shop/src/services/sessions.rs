// src/services/sessions.rs

//! Server-side session storage keyed by the id carried in the session cookie.

use crate::models::{Cart, OrderSummary};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
  #[error("session store unavailable: {0}")]
  Unavailable(String),
}

/// Opaque session identifier, a random UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
  pub fn generate() -> Self {
    Self(Uuid::new_v4())
  }

  /// Accepts only well-formed v4 ids; anything else gets a fresh session.
  pub fn parse(raw: &str) -> Option<Self> {
    Uuid::parse_str(raw.trim())
      .ok()
      .filter(|id| id.get_version_num() == 4)
      .map(Self)
  }
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Everything the application keeps per visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
  pub cart: Cart,
  pub last_order: Option<OrderSummary>,
}

#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
  /// Returns `None` for unknown or expired sessions.
  async fn get(&self, id: &SessionId) -> Result<Option<SessionState>, SessionError>;

  /// Creates or replaces the session and restarts its idle timer.
  async fn set(&self, id: &SessionId, state: SessionState) -> Result<(), SessionError>;

  /// Drops every expired session and returns how many were removed.
  async fn purge_expired(&self) -> Result<usize, SessionError>;
}

pub const DEFAULT_MAX_SESSIONS: usize = 100_000;

const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct StoredSession {
  state: SessionState,
  expires_at: Instant,
}

/// Process-local store. Sessions expire after `ttl` without access and do not
/// survive a restart.
///
/// Expired entries are swept lazily from `set`, at most once per sweep interval,
/// or right away when a new session would exceed `max_entries`.
pub struct InMemorySessionStore {
  ttl: Duration,
  max_entries: usize,
  sweep_every: Duration,
  next_sweep: Mutex<Instant>,
  sessions: Mutex<HashMap<SessionId, StoredSession>>,
}

impl InMemorySessionStore {
  pub fn new(ttl: Duration, max_entries: usize) -> Self {
    let sweep_every = ttl.min(MAX_SWEEP_INTERVAL);
    Self {
      ttl,
      max_entries,
      sweep_every,
      next_sweep: Mutex::new(Instant::now() + sweep_every),
      sessions: Mutex::new(HashMap::new()),
    }
  }

  pub fn len(&self) -> usize {
    self.sessions.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn sweep_due(&self, now: Instant) -> bool {
    let mut next = self.next_sweep.lock();
    if now < *next {
      return false;
    }
    *next = now + self.sweep_every;
    true
  }

  fn is_full_for(&self, id: &SessionId) -> bool {
    let sessions = self.sessions.lock();
    !sessions.contains_key(id) && sessions.len() >= self.max_entries
  }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
  async fn get(&self, id: &SessionId) -> Result<Option<SessionState>, SessionError> {
    let now = Instant::now();
    let mut sessions = self.sessions.lock();
    match sessions.get_mut(id) {
      Some(stored) if stored.expires_at > now => {
        stored.expires_at = now + self.ttl;
        Ok(Some(stored.state.clone()))
      }
      Some(_) => {
        sessions.remove(id);
        debug!(session_id = %id, "Expired session dropped on read.");
        Ok(None)
      }
      None => Ok(None),
    }
  }

  async fn set(&self, id: &SessionId, state: SessionState) -> Result<(), SessionError> {
    let now = Instant::now();
    if self.sweep_due(now) || self.is_full_for(id) {
      let removed = self.purge_expired().await?;
      if removed > 0 {
        debug!(removed, "Expired sessions swept.");
      }
    }

    let mut sessions = self.sessions.lock();
    if !sessions.contains_key(id) && sessions.len() >= self.max_entries {
      warn!(max_entries = self.max_entries, "Session store is full.");
      return Err(SessionError::Unavailable(format!(
        "session limit of {} reached",
        self.max_entries
      )));
    }
    sessions.insert(
      *id,
      StoredSession {
        state,
        expires_at: now + self.ttl,
      },
    );
    Ok(())
  }

  async fn purge_expired(&self) -> Result<usize, SessionError> {
    let now = Instant::now();
    let mut sessions = self.sessions.lock();
    let before = sessions.len();
    sessions.retain(|_, stored| stored.expires_at > now);
    Ok(before - sessions.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cart_with(product_id: i64, quantity: u32) -> SessionState {
    let mut state = SessionState::default();
    state.cart.add(product_id, quantity).unwrap();
    state
  }

  #[test]
  fn session_ids_must_be_v4_uuids() {
    let id = SessionId::generate();
    assert_eq!(SessionId::parse(&id.to_string()), Some(id));
    assert_eq!(SessionId::parse("not-a-uuid"), None);
    assert_eq!(SessionId::parse("00000000-0000-0000-0000-000000000000"), None);
  }

  #[tokio::test]
  async fn stores_and_returns_state() {
    let store = InMemorySessionStore::new(Duration::from_secs(60), DEFAULT_MAX_SESSIONS);
    let id = SessionId::generate();
    assert_eq!(store.get(&id).await.unwrap(), None);

    store.set(&id, cart_with(1, 2)).await.unwrap();
    let state = store.get(&id).await.unwrap().unwrap();
    assert_eq!(state.cart.quantity_of(1), 2);
    assert_eq!(store.len(), 1);
  }

  #[tokio::test]
  async fn expired_sessions_read_as_missing() {
    let store = InMemorySessionStore::new(Duration::from_millis(20), DEFAULT_MAX_SESSIONS);
    let id = SessionId::generate();
    store.set(&id, cart_with(1, 1)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(store.get(&id).await.unwrap(), None);
    assert!(store.is_empty());
  }

  #[tokio::test]
  async fn purge_removes_only_expired_sessions() {
    let store = InMemorySessionStore::new(Duration::from_millis(20), DEFAULT_MAX_SESSIONS);
    let stale = SessionId::generate();
    store.set(&stale, cart_with(1, 1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;

    let fresh = SessionId::generate();
    store.sessions.lock().insert(
      fresh,
      StoredSession {
        state: cart_with(2, 1),
        expires_at: Instant::now() + Duration::from_secs(60),
      },
    );

    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert_eq!(store.len(), 1);
    assert!(store.get(&fresh).await.unwrap().is_some());
  }

  #[tokio::test]
  async fn writes_sweep_at_most_once_per_interval() {
    let store = InMemorySessionStore::new(Duration::from_secs(60), DEFAULT_MAX_SESSIONS);
    store.sessions.lock().insert(
      SessionId::generate(),
      StoredSession {
        state: cart_with(1, 1),
        expires_at: Instant::now(),
      },
    );

    store.set(&SessionId::generate(), cart_with(2, 1)).await.unwrap();
    assert_eq!(store.len(), 2, "no sweep before the interval elapses");

    *store.next_sweep.lock() = Instant::now();
    store.set(&SessionId::generate(), cart_with(3, 1)).await.unwrap();
    assert_eq!(store.len(), 2, "the due sweep drops the expired entry");
  }

  #[tokio::test]
  async fn full_store_rejects_new_sessions_until_some_expire() {
    let store = InMemorySessionStore::new(Duration::from_millis(30), 2);
    let first = SessionId::generate();
    store.set(&first, cart_with(1, 1)).await.unwrap();
    store.set(&SessionId::generate(), cart_with(1, 1)).await.unwrap();

    let err = store.set(&SessionId::generate(), cart_with(1, 1)).await.unwrap_err();
    assert!(matches!(err, SessionError::Unavailable(_)));
    store.set(&first, cart_with(1, 3)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    store.set(&SessionId::generate(), cart_with(1, 1)).await.unwrap();
    assert_eq!(store.len(), 1);
  }
}
