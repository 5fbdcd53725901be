//! Cookie-keyed sessions with one-shot flash messages.
//!
//! The browser only ever holds an opaque random id in the [`COOKIE_NAME`]
//! cookie. The state lives server-side in a [`SessionStore`]. Each request
//! works on a [`Session`] snapshot loaded from the store; the app commits it
//! back once the handler has produced its response.
//!
//! Stored sessions expire after [`DEFAULT_TTL`] without a request, and the
//! store never holds more than [`DEFAULT_MAX_SESSIONS`] of them; the least
//! recently seen one makes room for a new one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Name of the cookie carrying the session id.
pub const COOKIE_NAME: &str = "folio_session";

/// Idle time after which a stored session is forgotten.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound on the number of stored sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Everything folio remembers about one browser.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionData {
    pub signed_in: bool,
    pub user: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl SessionData {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Flash messages taken out of a session.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Flash {
    pub error: Option<String>,
    pub success: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    data: SessionData,
    dirty: bool,
    /// Set on sign-in: the session moves to a fresh id on commit.
    regenerate: bool,
}

/// Per-request handle on the session.
///
/// Cloning is cheap and every clone sees the same state, so the app can keep
/// one clone while the handler consumes the request.
#[derive(Clone, Debug, Default)]
pub struct Session {
    state: Arc<Mutex<State>>,
}

impl Session {
    fn from_data(data: SessionData) -> Self {
        Self { state: Arc::new(Mutex::new(State { data, dirty: false, regenerate: false })) }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut SessionData)) {
        let mut state = self.lock();
        f(&mut state.data);
        state.dirty = true;
    }

    pub fn is_signed_in(&self) -> bool {
        self.lock().data.signed_in
    }

    pub fn user(&self) -> Option<String> {
        self.lock().data.user.clone()
    }

    /// Marks the session as signed in. The session id is replaced on commit,
    /// so an id handed out before sign-in never carries the signed-in state.
    pub fn sign_in(&self, user: &str) {
        self.update(|data| {
            data.signed_in = true;
            data.user = Some(user.to_owned());
        });
        self.lock().regenerate = true;
    }

    pub fn sign_out(&self) {
        self.update(|data| {
            data.signed_in = false;
            data.user = None;
        });
    }

    pub fn flash_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|data| data.error = Some(message));
    }

    pub fn flash_success(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|data| data.success = Some(message));
    }

    /// Reads and clears both flash messages in one step.
    pub fn take_flash(&self) -> Flash {
        let mut state = self.lock();
        let flash = Flash {
            error: state.data.error.take(),
            success: state.data.success.take(),
        };
        if flash != Flash::default() {
            state.dirty = true;
        }
        flash
    }

    /// The data to write back, if any, and whether it needs a new id.
    fn snapshot(&self) -> Option<(SessionData, bool)> {
        let state = self.lock();
        state.dirty.then(|| (state.data.clone(), state.regenerate))
    }
}

#[derive(Debug)]
struct Entry {
    data: SessionData,
    last_seen: Instant,
}

/// Server-side session storage: an in-memory map from session id to state.
///
/// Sessions do not survive a restart; a browser presenting an unknown or
/// expired id simply starts over with an empty session.
#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Entry>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            sessions: Arc::default(),
            ttl: DEFAULT_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the idle time after which a session is forgotten.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the maximum number of stored sessions. At least one is kept.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_seen) >= self.ttl
    }

    /// Loads the session for `id`, or an empty one when the id is absent,
    /// unknown or expired.
    pub fn load(&self, id: Option<&str>) -> Session {
        self.load_at(id, Instant::now())
    }

    fn load_at(&self, id: Option<&str>, now: Instant) -> Session {
        let Some(id) = id else {
            return Session::default();
        };
        let mut map = self.map();
        let expired = map.get(id).map(|entry| self.is_expired(entry, now));
        let data = match expired {
            Some(true) => {
                map.remove(id);
                None
            }
            Some(false) => map.get_mut(id).map(|entry| {
                entry.last_seen = now;
                entry.data.clone()
            }),
            None => None,
        };
        Session::from_data(data.unwrap_or_default())
    }

    /// Writes `session` back under `id`.
    ///
    /// Returns the id of a freshly started session when the caller must hand
    /// a new cookie to the browser. Untouched sessions are not written, and
    /// sessions left empty are dropped.
    pub fn commit(&self, id: Option<&str>, session: &Session) -> Option<String> {
        self.commit_at(id, session, Instant::now())
    }

    fn commit_at(&self, id: Option<&str>, session: &Session, now: Instant) -> Option<String> {
        let (data, regenerate) = session.snapshot()?;
        let mut map = self.map();
        let mut live = id.filter(|id| map.contains_key(*id));
        if regenerate {
            if let Some(old) = live.take() {
                map.remove(old);
            }
        }
        match live {
            Some(id) if data.is_empty() => {
                map.remove(id);
                None
            }
            Some(id) => {
                map.insert(id.to_owned(), Entry { data, last_seen: now });
                None
            }
            None if data.is_empty() => None,
            None => {
                self.make_room(&mut map, now);
                let id = Uuid::new_v4().simple().to_string();
                map.insert(id.clone(), Entry { data, last_seen: now });
                Some(id)
            }
        }
    }

    /// Drops expired sessions, then the least recently seen ones until a new
    /// session fits.
    fn make_room(&self, map: &mut HashMap<String, Entry>, now: Instant) {
        map.retain(|_, entry| !self.is_expired(entry, now));
        while map.len() >= self.max_sessions {
            let Some(oldest) = map
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            map.remove(&oldest);
        }
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}

/// The `Set-Cookie` value handing session `id` to the browser.
pub fn set_cookie(id: &str) -> String {
    format!("{COOKIE_NAME}={id}; Path=/; HttpOnly; SameSite=Lax")
}
