//! Correlation table for outstanding reservation requests.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use common::CorrelationId;
use messaging::ProductCheckMessage;
use tokio::sync::oneshot;

const SHARD_COUNT: usize = 16;

/// Table of in-flight reservation requests awaiting their replies.
///
/// Each entry is a single-resolution slot: it is settled exactly once, by
/// the matching reply or by the requester's timeout cleanup, whichever comes
/// first. Settlement removes the entry, so a late reply finds nothing and is
/// dropped.
///
/// The table is sharded by correlation-id hash; concurrent registration and
/// resolution for unrelated orders contend only within a shard, never on one
/// global lock.
pub struct CorrelationTable {
    shards: Vec<Mutex<HashMap<CorrelationId, oneshot::Sender<ProductCheckMessage>>>>,
}

impl CorrelationTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    fn shard(
        &self,
        id: &CorrelationId,
    ) -> &Mutex<HashMap<CorrelationId, oneshot::Sender<ProductCheckMessage>>> {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }

    /// Registers a slot for an outstanding request.
    pub fn register(&self, id: CorrelationId, slot: oneshot::Sender<ProductCheckMessage>) {
        self.shard(&id).lock().unwrap().insert(id, slot);
    }

    /// Settles the slot for `id` with its reply.
    ///
    /// Returns false when the slot is gone: already settled, timed out, or
    /// never registered.
    pub fn settle(&self, id: &CorrelationId, reply: ProductCheckMessage) -> bool {
        let slot = self.shard(id).lock().unwrap().remove(id);
        match slot {
            // the send only fails if the requester gave up in the meantime
            Some(sender) => sender.send(reply).is_ok(),
            None => false,
        }
    }

    /// Drops the slot for `id` without settling it (timeout cleanup).
    pub fn remove(&self, id: &CorrelationId) {
        self.shard(id).lock().unwrap().remove(id);
    }

    /// Number of outstanding requests.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().unwrap().len()).sum()
    }

    /// Returns true when no requests are outstanding.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}
