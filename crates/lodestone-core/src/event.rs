//! Block change records and the observers that receive them.
//!
//! Every effective mutation produces one [`BlockChange`] that is handed to
//! all observers currently registered with the world, before any physics
//! runs. With the `parallel` feature the hand-off fans out across observers
//! on the rayon pool; observers share no mutable state with each other and
//! the broadcast never touches world state.
//!
//! [`ChangeBuffer`] is a ready-made observer that keeps the most recent
//! records in a fixed-capacity ring, for transports that batch their sends.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::id::{BlockTypeId, ObserverId};

// ---------------------------------------------------------------------------
// Change record
// ---------------------------------------------------------------------------

/// What an observer learns about a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockChange {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub new_type: BlockTypeId,
    pub new_data: u8,
}

/// Receives change records. Called from the mutating thread, or from the
/// rayon pool when the `parallel` feature is enabled.
pub trait ChangeObserver: Send + Sync {
    fn send_block_change(&self, change: &BlockChange);
}

// ---------------------------------------------------------------------------
// ObserverSet
// ---------------------------------------------------------------------------

/// The observers currently connected to a world.
#[derive(Default)]
pub struct ObserverSet {
    observers: SlotMap<ObserverId, Arc<dyn ChangeObserver>>,
}

impl fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSet")
            .field("len", &self.observers.len())
            .finish()
    }
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, observer: Arc<dyn ChangeObserver>) -> ObserverId {
        self.observers.insert(observer)
    }

    /// Remove an observer. Returns `false` if it was not connected.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver `change` to every connected observer. Delivery order is
    /// unspecified.
    pub fn broadcast(&self, change: &BlockChange) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let targets: Vec<&Arc<dyn ChangeObserver>> = self.observers.values().collect();
            targets
                .par_iter()
                .for_each(|observer| observer.send_block_change(change));
        }

        #[cfg(not(feature = "parallel"))]
        for observer in self.observers.values() {
            observer.send_block_change(change);
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeBuffer
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Ring {
    slots: Vec<Option<BlockChange>>,
    head: usize,
    len: usize,
    total_written: u64,
    dropped: u64,
}

/// A bounded ring of the most recent change records. When full, the oldest
/// record is dropped.
#[derive(Debug)]
pub struct ChangeBuffer {
    ring: Mutex<Ring>,
}

impl ChangeBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Mutex::new(Ring {
                slots: vec![None; capacity],
                head: 0,
                len: 0,
                total_written: 0,
                dropped: 0,
            }),
        }
    }

    fn with_ring<R>(&self, f: impl FnOnce(&mut Ring) -> R) -> R {
        let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut ring)
    }

    pub fn push(&self, change: BlockChange) {
        self.with_ring(|ring| {
            let capacity = ring.slots.len();
            let head = ring.head;
            ring.slots[head] = Some(change);
            ring.head = (head + 1) % capacity;
            if ring.len < capacity {
                ring.len += 1;
            } else {
                ring.dropped += 1;
            }
            ring.total_written += 1;
        });
    }

    pub fn capacity(&self) -> usize {
        self.with_ring(|ring| ring.slots.len())
    }

    pub fn len(&self) -> usize {
        self.with_ring(|ring| ring.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total records written since creation, including dropped ones.
    pub fn total_written(&self) -> u64 {
        self.with_ring(|ring| ring.total_written)
    }

    /// Records overwritten before anyone read them. Drained records do not
    /// count.
    pub fn dropped_count(&self) -> u64 {
        self.with_ring(|ring| ring.dropped)
    }

    /// Copy of the buffered records, oldest first.
    pub fn snapshot(&self) -> Vec<BlockChange> {
        self.with_ring(|ring| {
            let capacity = ring.slots.len();
            // head is the next write position, which holds the oldest entry once full.
            let start = if ring.len < capacity { 0 } else { ring.head };
            (0..ring.len)
                .filter_map(|i| ring.slots[(start + i) % capacity])
                .collect()
        })
    }

    /// Take all buffered records, oldest first, leaving the buffer empty.
    pub fn drain(&self) -> Vec<BlockChange> {
        let records = self.snapshot();
        self.with_ring(|ring| {
            ring.slots.iter_mut().for_each(|slot| *slot = None);
            ring.head = 0;
            ring.len = 0;
        });
        records
    }
}

impl ChangeObserver for ChangeBuffer {
    fn send_block_change(&self, change: &BlockChange) {
        self.push(*change);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
