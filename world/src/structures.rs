//! Authoritative structure state management utilities.

use std::collections::BTreeMap;

use glam::Vec2;
use tower_fusion_core::{StructureId, StructureSnapshot};

/// Registry that stores placed structures and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct StructureRegistry {
    entries: BTreeMap<StructureId, Vec2>,
    next_structure_id: StructureId,
}

impl StructureRegistry {
    /// Creates an empty structure registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_structure_id: StructureId::new(0),
        }
    }

    /// Stores a structure and returns the identifier allocated to it.
    pub(crate) fn insert(&mut self, position: Vec2) -> StructureId {
        let id = self.next_structure_id;
        self.next_structure_id = StructureId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, position);
        id
    }

    /// Removes a structure, yielding its position when it existed.
    pub(crate) fn remove(&mut self, id: StructureId) -> Option<Vec2> {
        self.entries.remove(&id)
    }

    /// Positions of every structure in identifier order.
    pub(crate) fn positions(&self) -> Vec<Vec2> {
        self.entries.values().copied().collect()
    }

    /// Snapshots of every structure in identifier order.
    pub(crate) fn snapshots(&self) -> Vec<StructureSnapshot> {
        self.entries
            .iter()
            .map(|(&id, &position)| StructureSnapshot { id, position })
            .collect()
    }
}
