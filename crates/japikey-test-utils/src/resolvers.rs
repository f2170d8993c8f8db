//! Key resolvers for tests
//!
//! `CountingResolver` records every lookup so tests can assert when (and
//! whether) verification reached key resolution.

use japikey::{JapikeyError, KeyId, KeyResolver, KeySet, PublicKeyMaterial};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug)]
enum Behavior {
    Serve(KeySet),
    Fail(JapikeyError),
}

/// Resolver that counts its calls and remembers the last request.
#[derive(Debug)]
pub struct CountingResolver {
    behavior: Behavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<(KeyId, Duration)>>,
}

impl CountingResolver {
    /// Resolve from `key_set`
    pub fn serving(key_set: KeySet) -> Self {
        Self::with_behavior(Behavior::Serve(key_set))
    }

    /// Fail every lookup with `error`
    pub fn failing(error: JapikeyError) -> Self {
        Self::with_behavior(Behavior::Fail(error))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of lookups so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The kid and timeout of the most recent lookup
    pub fn last_request(&self) -> Option<(KeyId, Duration)> {
        *self.last_request.lock().expect("resolver lock poisoned")
    }
}

impl KeyResolver for CountingResolver {
    fn resolve(&self, key_id: &KeyId, timeout: Duration) -> japikey::Result<PublicKeyMaterial> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("resolver lock poisoned") = Some((*key_id, timeout));

        match &self.behavior {
            Behavior::Serve(key_set) => key_set.get_public_key(key_id),
            Behavior::Fail(error) => Err(error.clone()),
        }
    }
}
