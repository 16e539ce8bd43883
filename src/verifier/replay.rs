//! Replay protection for consumed nonces.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use num_bigint::BigUint;
use tracing::{debug, warn};

use crate::config::ReplaySettings;
use crate::{Error, Result};

struct GuardState {
    consumed: HashSet<Vec<u8>>,
    order: VecDeque<(Instant, Vec<u8>)>,
}

impl GuardState {
    fn purge(&mut self, ttl: Option<Duration>, now: Instant) -> usize {
        let Some(ttl) = ttl else {
            return 0;
        };

        let mut removed = 0;
        while let Some((consumed_at, _)) = self.order.front() {
            if now.saturating_duration_since(*consumed_at) < ttl {
                break;
            }
            if let Some((_, key)) = self.order.pop_front() {
                self.consumed.remove(&key);
                removed += 1;
            }
        }
        removed
    }
}

/// Set of consumed nonces shared between verifier instances.
///
/// Cloning yields a handle to the same set. Every operation takes one lock, so
/// [`NonceGuard::consume_if_fresh`] is atomic: among concurrent callers with the
/// same nonce exactly one succeeds.
///
/// When `ttl` is set, a nonce is forgotten once it has been held that long.
/// When the guard is full, new nonces are refused rather than evicting old ones.
#[derive(Clone)]
pub struct NonceGuard {
    state: Arc<Mutex<GuardState>>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl NonceGuard {
    /// Creates an empty guard.
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            state: Arc::new(Mutex::new(GuardState {
                consumed: HashSet::new(),
                order: VecDeque::new(),
            })),
            capacity,
            ttl,
        }
    }

    /// Returns the maximum number of nonces held at once.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the retention window, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, GuardState> {
        // The state holds no invariant a panicking holder could break halfway.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if `nonce` has not been consumed.
    pub fn is_fresh(&self, nonce: &BigUint) -> bool {
        let mut state = self.lock();
        state.purge(self.ttl, Instant::now());
        !state.consumed.contains(&nonce.to_bytes_be())
    }

    /// Records `nonce` as consumed.
    ///
    /// Recording an already consumed nonce is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReplayCapacity`] if the guard is full.
    pub fn mark_consumed(&self, nonce: &BigUint) -> Result<()> {
        self.consume_if_fresh(nonce).map(|_| ())
    }

    /// Atomically checks and records `nonce`.
    ///
    /// Returns `Ok(true)` if the nonce was fresh and is now consumed, and
    /// `Ok(false)` if it had already been consumed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReplayCapacity`] if the nonce is fresh but the guard is full.
    pub fn consume_if_fresh(&self, nonce: &BigUint) -> Result<bool> {
        let key = nonce.to_bytes_be();
        let now = Instant::now();

        let mut state = self.lock();
        let purged = state.purge(self.ttl, now);
        if purged > 0 {
            debug!(purged, "Expired nonces removed");
        }

        if state.consumed.contains(&key) {
            return Ok(false);
        }

        if state.consumed.len() >= self.capacity {
            warn!(capacity = self.capacity, "Replay guard is full");
            return Err(Error::ReplayCapacity(self.capacity));
        }

        state.consumed.insert(key.clone());
        state.order.push_back((now, key));
        Ok(true)
    }

    /// Removes nonces older than the retention window and returns how many
    /// were removed. Always `0` without a TTL.
    pub fn purge_expired(&self) -> usize {
        self.lock().purge(self.ttl, Instant::now())
    }

    /// Returns the number of nonces currently held.
    pub fn len(&self) -> usize {
        self.lock().consumed.len()
    }

    /// Returns `true` if no nonce is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every consumed nonce.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.consumed.clear();
        state.order.clear();
    }
}

impl Default for NonceGuard {
    /// Capacity 100 000 and no TTL: nonces are never forgotten, and once the
    /// guard is full every new nonce is refused with [`Error::ReplayCapacity`].
    fn default() -> Self {
        ReplaySettings::default().build_guard()
    }
}

impl std::fmt::Debug for NonceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceGuard")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}
