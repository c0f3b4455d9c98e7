//! The single session slot shared by every operation of a [`Client`].
//!
//! The backend caps the number of concurrent sessions per account, so the
//! store hands out *leases* on one token instead of letting each operation
//! open its own. A token created on demand by [`SessionStore::acquire_or_create`]
//! is scoped: it is returned for closing when its last lease is released. A
//! token installed with [`SessionStore::set`] is caller-managed and is never
//! handed back by [`SessionStore::release`].
//!
//! A scoped token that leaves the slot while still leased (replaced, cleared,
//! taken or invalidated) is parked with its remaining lease count; its last
//! lease still closes it, exactly once.
//!
//! [`Client`]: crate::Client

use std::{future::Future, sync::Arc};

use tokio::sync::Mutex;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Origin {
    #[default]
    Caller,
    Scoped,
}

#[derive(Debug, Default)]
struct Slot {
    token: Option<String>,
    origin: Origin,
    leases: usize,
    /// Scoped tokens out of the slot that are still leased.
    parked: Vec<(String, usize)>,
}

impl Slot {
    fn replace(&mut self, token: Option<String>, origin: Origin) {
        if let Some(previous) = self.token.take()
            && self.origin == Origin::Scoped
            && self.leases > 0
        {
            self.parked.push((previous, self.leases));
        }
        self.token = token;
        self.origin = origin;
        self.leases = 0;
    }

    /// Whether the current token is scoped and still in use.
    fn scoped_in_use(&self) -> bool {
        self.token.is_some() && self.origin == Origin::Scoped && self.leases > 0
    }
}

/// A borrowed use of the current token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    token: String,
    created: bool,
}

impl Lease {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether this lease opened the session.
    pub fn created(&self) -> bool {
        self.created
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<Slot>>,
}

impl SessionStore {
    pub async fn get(&self) -> Option<String> {
        self.inner.lock().await.token.clone()
    }

    /// Installs a caller-managed token, replacing any previous one.
    pub async fn set(&self, token: String) {
        self.inner.lock().await.replace(Some(token), Origin::Caller);
    }

    pub async fn clear(&self) {
        self.inner.lock().await.replace(None, Origin::Caller);
    }

    pub async fn has(&self) -> bool {
        self.inner.lock().await.token.is_some()
    }

    /// Empties the slot and returns the token the caller must close.
    ///
    /// A scoped token that is still leased is not returned: it stays with
    /// its leases and the last one closes it.
    pub async fn take(&self) -> Option<String> {
        let mut slot = self.inner.lock().await;
        let in_use = slot.scoped_in_use();
        let token = slot.token.clone();
        slot.replace(None, Origin::Caller);
        if in_use {
            tracing::debug!("session still leased, left for its last operation to close");
            return None;
        }
        token
    }

    /// Drops `token` from the slot after the server rejected it.
    ///
    /// Does nothing if the slot already holds another token.
    pub async fn invalidate(&self, token: &str) {
        let mut slot = self.inner.lock().await;
        if slot.token.as_deref() == Some(token) {
            slot.replace(None, Origin::Caller);
            tracing::info!("dropped rejected data api session");
        }
    }

    /// Leases the current token, or runs `create` and stores its token.
    ///
    /// The lock is held across `create`, so concurrent callers that find the
    /// slot empty wait for the first one instead of opening a second session.
    pub async fn acquire_or_create<F, Fut, E>(&self, create: F) -> Result<Lease, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let mut slot = self.inner.lock().await;
        if let Some(token) = slot.token.clone() {
            slot.leases += 1;
            tracing::debug!(leases = slot.leases, "reusing data api session");
            return Ok(Lease {
                token,
                created: false,
            });
        }

        let token = create().await?;
        slot.replace(Some(token.clone()), Origin::Scoped);
        slot.leases = 1;
        Ok(Lease {
            token,
            created: true,
        })
    }

    /// Gives a lease back. Returns the token when the caller must close it.
    pub async fn release(&self, lease: &Lease) -> Option<String> {
        let mut slot = self.inner.lock().await;
        if slot.token.as_deref() != Some(lease.token()) {
            let index = slot
                .parked
                .iter()
                .position(|(token, _)| token == lease.token())?;
            slot.parked[index].1 -= 1;
            if slot.parked[index].1 == 0 {
                return Some(slot.parked.swap_remove(index).0);
            }
            return None;
        }

        slot.leases = slot.leases.saturating_sub(1);
        if slot.origin == Origin::Scoped && slot.leases == 0 {
            let token = slot.token.take();
            slot.replace(None, Origin::Caller);
            return token;
        }
        None
    }
}
