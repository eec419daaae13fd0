//! Per-key mutual exclusion for mutating operations.
//!
//! Every mutation in the engine runs under a lock scoped to its key (the item
//! id). Acquisition never blocks: a key already held by another session fails
//! fast so the caller can retry or refresh, matching the optimistic,
//! non-blocking pattern the engine is built for.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::EngineError;

#[derive(Debug)]
struct KeyState {
    held: Mutex<bool>,
}

impl KeyState {
    fn new() -> Self {
        KeyState {
            held: Mutex::new(false),
        }
    }

    fn try_acquire(&self) -> bool {
        let mut held = match self.held.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *held {
            false
        } else {
            *held = true;
            true
        }
    }

    fn release(&self) {
        let mut held = match self.held.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *held = false;
    }
}

/// A map of per-key try-locks.
///
/// Keys are created on first use and kept for the lifetime of the map.
pub struct KeyedLock {
    keys: Mutex<HashMap<String, Arc<KeyState>>>,
}

impl Default for KeyedLock {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyedLock {
    pub fn new() -> Self {
        KeyedLock {
            keys: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for `key`, failing fast with `Conflict` if it is
    /// already held. The returned guard releases on drop.
    pub fn acquire(&self, key: &str) -> Result<KeyGuard, EngineError> {
        let state = self.ensure_key(key)?;
        if state.try_acquire() {
            Ok(KeyGuard { state })
        } else {
            Err(EngineError::Conflict(format!(
                "concurrent mutation in progress for key {}",
                key
            )))
        }
    }

    fn ensure_key(&self, key: &str) -> Result<Arc<KeyState>, EngineError> {
        let mut keys = self
            .keys
            .lock()
            .map_err(|_| EngineError::Conflict("lock table poisoned".into()))?;
        Ok(keys
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(KeyState::new()))
            .clone())
    }
}

/// RAII guard for a held key. Dropping it releases the key.
#[derive(Debug)]
pub struct KeyGuard {
    state: Arc<KeyState>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        self.state.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_release() {
        let locks = KeyedLock::new();
        let guard = locks.acquire("item-1").unwrap();
        drop(guard);
        assert!(locks.acquire("item-1").is_ok());
    }

    #[test]
    fn second_acquire_conflicts() {
        let locks = KeyedLock::new();
        let _guard = locks.acquire("item-1").unwrap();
        let err = locks.acquire("item-1").unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn different_keys_are_independent() {
        let locks = KeyedLock::new();
        let _a = locks.acquire("item-1").unwrap();
        assert!(locks.acquire("item-2").is_ok());
    }
}
