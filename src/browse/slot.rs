// src/browse/slot.rs
// =============================================================================
// A slot holds the latest result of an async load: a directory listing, one
// file preview, or the README.
//
// Loads can overlap. The user changes branch while the old listing is still
// in flight, and the old response may arrive last. To keep the newest
// request in charge, every load takes a Ticket when it starts. The ticket
// records the slot generation at that moment, and a result is only installed
// if the generation hasn't moved since.
//
// Lifecycle:
//   begin(key)          -> new generation, returns a Ticket
//   commit(ticket, v)   -> installs v if the ticket is current,
//                          otherwise hands v back to be dropped
//   teardown()          -> new generation, drops the held value
//
// Dropping a value drops whatever it owns, which is how binary refs are
// released when they get replaced or thrown away.
// =============================================================================

use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard};

// Proof that a load was started, and for what
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    generation: u64,
    key: K,
}

impl<K> Ticket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

#[derive(Debug)]
struct SlotState<T> {
    generation: u64,
    value: Option<T>,
}

// K is the identity a load is tagged with (path, branch, dir...)
#[derive(Debug)]
pub struct Slot<K, T> {
    state: Mutex<SlotState<T>>,
    _key: PhantomData<fn(K)>,
}

impl<K, T> Default for Slot<K, T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(SlotState {
                generation: 0,
                value: None,
            }),
            _key: PhantomData,
        }
    }
}

impl<K, T> Slot<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    // Starts a new load for `key`. Any ticket issued before this one is stale
    // from now on.
    pub fn begin(&self, key: K) -> Ticket<K> {
        let mut state = self.lock();
        state.generation += 1;
        Ticket {
            generation: state.generation,
            key,
        }
    }

    // Installs `value` if `ticket` is still current
    //
    // Returns Err(value) for a stale ticket so the caller can drop it (and
    // log it) without the slot changing.
    pub fn commit(&self, ticket: &Ticket<K>, value: T) -> Result<(), T> {
        let displaced = {
            let mut state = self.lock();
            if state.generation != ticket.generation {
                return Err(value);
            }
            state.value.replace(value)
        };
        // Released outside the lock
        drop(displaced);
        Ok(())
    }

    // Drops the held value and makes every outstanding ticket stale
    pub fn teardown(&self) {
        let displaced = {
            let mut state = self.lock();
            state.generation += 1;
            state.value.take()
        };
        drop(displaced);
    }

    // Looks at the held value without taking it out
    pub fn inspect<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let state = self.lock();
        f(state.value.as_ref())
    }

    pub fn take(&self) -> Option<T> {
        self.lock().value.take()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a generation number and not just comparing keys?
//    - The same key can be requested twice (refresh, or A -> B -> A)
//    - Only the latest of those requests may write, even though the first
//      and third share a key
//
// 2. Why does commit() return the value on failure?
//    - Dropping it releases anything it owns (a TransientBinaryRef)
//    - The caller can also log what it threw away
//
// 3. Why a std Mutex in async code?
//    - The lock is never held across an .await, only for a few field updates
// -----------------------------------------------------------------------------
