// src/browse/blob.rs
// =============================================================================
// Transient handles to binary preview content.
//
// A TransientBinaryRef owns the bytes of one binary preview plus a
// "blob:repo-browser/<id>" URL that names it. The BlobRegistry hands them
// out and keeps count.
//
// Release happens in Drop, so every exit path (replaced by a newer preview,
// dropped after an error, slot torn down, stale result thrown away) releases
// the ref exactly once. Refs are deliberately not Clone.
// =============================================================================

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

#[derive(Debug, Default)]
struct Ledger {
    next_id: u64,
    live: HashSet<u64>,
    allocated: u64,
    released: u64,
}

/// Allocation counters for a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobStats {
    pub allocated: u64,
    pub released: u64,
    pub live: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    ledger: Arc<Mutex<Ledger>>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&self, bytes: Vec<u8>) -> TransientBinaryRef {
        let id = {
            let mut ledger = self.lock();
            ledger.next_id += 1;
            let id = ledger.next_id;
            ledger.live.insert(id);
            ledger.allocated += 1;
            id
        };
        trace!(id, size = bytes.len(), "allocated blob");

        TransientBinaryRef {
            id,
            bytes,
            registry: self.clone(),
        }
    }

    pub fn stats(&self) -> BlobStats {
        let ledger = self.lock();
        BlobStats {
            allocated: ledger.allocated,
            released: ledger.released,
            live: ledger.live.len(),
        }
    }

    fn release(&self, id: u64) {
        let mut ledger = self.lock();
        if ledger.live.remove(&id) {
            ledger.released += 1;
            trace!(id, "released blob");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug)]
pub struct TransientBinaryRef {
    id: u64,
    bytes: Vec<u8>,
    registry: BlobRegistry,
}

impl TransientBinaryRef {
    pub fn url(&self) -> String {
        format!("blob:repo-browser/{}", self.id)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // Writes the content to `path` (used by `preview --save`)
    pub async fn save_to(&self, path: &Path) -> io::Result<()> {
        tokio::fs::write(path, self.bytes()).await
    }
}

impl Drop for TransientBinaryRef {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}
