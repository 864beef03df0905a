//! Deduplicated vertex pool for indexed-vertex meshes.
//!
//! The pool is a stable-key slot arena: removing a vertex leaves a vacant
//! slot on a free list instead of shifting every index above it, so facet
//! index references stay valid across removals.

use std::collections::BTreeSet;

use crate::error::{ModelError, ModelResult};
use crate::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default relative tolerance below which two positions are treated as the
/// same pool entry.
pub const DEDUP_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct PoolEntry {
    position: Vector3,
    /// Facet indices currently referencing this slot (reverse lookup).
    facets: BTreeSet<usize>,
}

/// A mesh-owned, deduplicated vertex pool with per-slot reverse lookup.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexPool {
    slots: Vec<Option<PoolEntry>>,
    free: Vec<usize>,
    live: usize,
}

impl VertexPool {
    /// Create an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live vertices in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// True if the pool holds no live vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Resolve a slot to its position, if the slot is live.
    #[must_use]
    pub fn position(&self, slot: usize) -> Option<Vector3> {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .map(|entry| entry.position)
    }

    /// Resolve a slot or fail with [`ModelError::UnresolvedPoolSlot`].
    pub fn resolve(&self, slot: usize) -> ModelResult<Vector3> {
        self.position(slot)
            .ok_or(ModelError::UnresolvedPoolSlot { slot })
    }

    /// Reverse lookup: the facets currently referencing a slot.
    #[must_use]
    pub fn facets(&self, slot: usize) -> Option<&BTreeSet<usize>> {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .map(|entry| &entry.facets)
    }

    /// Iterate over live slots in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Vector3)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|e| (slot, e.position)))
    }

    /// Intern a position for a facet, deduplicating against live entries.
    ///
    /// Live slots are scanned in ascending order; the first entry within
    /// [`DEDUP_TOLERANCE`] (relative) wins and its slot is reused, with the
    /// facet registered in that slot's reverse-lookup set idempotently.
    /// Otherwise a vacant slot is recycled or a new slot appended.
    pub fn insert(&mut self, position: Vector3, facet: usize) -> usize {
        let found = self.iter().find_map(|(slot, existing)| {
            position
                .approx_eq(existing, 0.0, DEDUP_TOLERANCE)
                .then_some(slot)
        });
        match found {
            Some(slot) => {
                if let Some(entry) = self.slots.get_mut(slot).and_then(Option::as_mut) {
                    entry.facets.insert(facet);
                }
                slot
            }
            None => {
                let entry = PoolEntry {
                    position,
                    facets: BTreeSet::from([facet]),
                };
                self.occupy(entry)
            }
        }
    }

    /// Append a position without a dedup scan or facet registration.
    ///
    /// OBJ vertex records are authoritative and pre-deduplicated by
    /// convention, so the decoder bypasses the tolerance scan.
    pub fn append_authoritative(&mut self, position: Vector3) -> usize {
        self.occupy(PoolEntry {
            position,
            facets: BTreeSet::new(),
        })
    }

    fn occupy(&mut self, entry: PoolEntry) -> usize {
        self.live += 1;
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(entry);
            slot
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        }
    }

    /// Register a facet in a slot's reverse-lookup set (idempotent).
    pub fn register(&mut self, slot: usize, facet: usize) -> ModelResult<()> {
        let entry = self
            .slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or(ModelError::UnresolvedPoolSlot { slot })?;
        entry.facets.insert(facet);
        Ok(())
    }

    /// Deregister a facet from a slot.
    ///
    /// Returns the slot's position and whether the slot was vacated. The
    /// slot is vacated only when its reverse-lookup set becomes empty; a
    /// vacated slot is queued for reuse and never renumbers its neighbors.
    pub fn release(&mut self, slot: usize, facet: usize) -> ModelResult<(Vector3, bool)> {
        let entry = self
            .slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or(ModelError::UnresolvedPoolSlot { slot })?;
        entry.facets.remove(&facet);
        let position = entry.position;
        if entry.facets.is_empty() {
            self.slots[slot] = None;
            self.free.push(slot);
            self.live -= 1;
            Ok((position, true))
        } else {
            Ok((position, false))
        }
    }

    /// Renumber facet ids after a facet was removed from the owning mesh:
    /// drop `removed` from every set and shift ids above it down by one.
    pub(crate) fn renumber_after_facet_removal(&mut self, removed: usize) {
        for entry in self.slots.iter_mut().flatten() {
            entry.facets = entry
                .facets
                .iter()
                .filter(|&&id| id != removed)
                .map(|&id| if id > removed { id - 1 } else { id })
                .collect();
        }
    }

    /// Renumber facet ids after a facet was inserted mid-list: shift ids at
    /// or above the insertion point up by one.
    pub(crate) fn renumber_after_facet_insertion(&mut self, inserted: usize) {
        for entry in self.slots.iter_mut().flatten() {
            entry.facets = entry
                .facets
                .iter()
                .map(|&id| if id >= inserted { id + 1 } else { id })
                .collect();
        }
    }
}
