//! Snapshot handoff between the simulation thread and readers.
//!
//! The bridge holds an `Arc` to the latest complete snapshot. Publishing
//! swaps the pointer under a short lock; readers clone the `Arc` and keep
//! whatever snapshot they took, untouched by later publishes.

use std::sync::Arc;

use parking_lot::Mutex;

use bulwark_core::state::SimSnapshot;

/// Shared, immutable view of one tick.
pub type SnapshotHandle = Arc<SimSnapshot>;

#[derive(Debug, Default)]
pub struct SnapshotBridge {
    latest: Mutex<SnapshotHandle>,
}

impl SnapshotBridge {
    pub fn new(initial: SimSnapshot) -> Self {
        Self {
            latest: Mutex::new(Arc::new(initial)),
        }
    }

    /// Store `snapshot` as the latest, stamping the next sequence number.
    pub fn publish(&self, mut snapshot: SimSnapshot) -> SnapshotHandle {
        let mut latest = self.latest.lock();
        snapshot.sequence = latest.sequence + 1;
        let handle = Arc::new(snapshot);
        *latest = Arc::clone(&handle);
        handle
    }

    pub fn latest(&self) -> SnapshotHandle {
        Arc::clone(&self.latest.lock())
    }
}
