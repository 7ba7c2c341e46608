//! Folder counter upkeep and tree invariant checks

use crate::item::{ItemId, ItemKind};
use crate::registry::ItemRegistry;
use std::collections::HashMap;
use thiserror::Error;

/// Accumulates folder counter deltas for one logical operation.
///
/// Deltas are netted per folder and applied in one pass, so a bulk move
/// touches every affected folder exactly once and no observer sees an
/// intermediate total.
#[derive(Debug, Default)]
pub struct CounterLedger {
    deltas: HashMap<ItemId, i64>,
    order: Vec<ItemId>,
}

impl CounterLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, folder: &ItemId, delta: i64) {
        match self.deltas.get_mut(folder) {
            Some(existing) => *existing += delta,
            None => {
                self.order.push(folder.clone());
                self.deltas.insert(folder.clone(), delta);
            }
        }
    }

    /// An item appeared under `parent`
    pub fn added_to(&mut self, parent: Option<&ItemId>) {
        if let Some(folder) = parent {
            self.record(folder, 1);
        }
    }

    /// An item left `parent`
    pub fn removed_from(&mut self, parent: Option<&ItemId>) {
        if let Some(folder) = parent {
            self.record(folder, -1);
        }
    }

    /// An item was reparented from `from` to `to`
    pub fn moved(&mut self, from: Option<&ItemId>, to: Option<&ItemId>) {
        self.removed_from(from);
        self.added_to(to);
    }

    /// Net delta recorded for `folder`
    pub fn delta(&self, folder: &ItemId) -> i64 {
        self.deltas.get(folder).copied().unwrap_or(0)
    }

    /// Folders touched by this ledger, in first-touch order
    pub fn folders(&self) -> &[ItemId] {
        &self.order
    }

    /// Apply every recorded delta to the registry.
    ///
    /// Each touched folder gets its `updated_at` refreshed, even when its
    /// deltas net out to zero (its children still changed).
    ///
    /// # Panics
    ///
    /// Panics if a recorded folder does not resolve to a folder in the
    /// registry. Callers validate parents before mutating, so this is a
    /// broken contract rather than a user error.
    pub fn apply(self, registry: &mut ItemRegistry) {
        for folder_id in &self.order {
            let delta = self.deltas[folder_id];
            let Some(folder) = registry.get_mut(folder_id) else {
                panic!("counter ledger references unknown folder {}", folder_id);
            };
            let ItemKind::Folder { children_count, .. } = &mut folder.kind else {
                panic!("counter ledger references non-folder item {}", folder_id);
            };

            let next = i64::from(*children_count) + delta;
            debug_assert!(next >= 0, "children count of {} would go negative", folder_id);
            *children_count = next.clamp(0, i64::from(u32::MAX)) as u32;
            let count = *children_count;
            folder.touch();

            tracing::trace!("Folder {} children_count -> {}", folder_id, count);
        }
    }
}

/// Rebuild every folder counter from the actual tree shape.
///
/// Returns the number of folders whose stored counter was wrong.
pub fn recount(registry: &mut ItemRegistry) -> usize {
    let mut actual: HashMap<ItemId, u32> = HashMap::new();
    for item in registry.iter() {
        if let Some(parent) = &item.parent_id {
            *actual.entry(parent.clone()).or_default() += 1;
        }
    }

    let folder_ids: Vec<ItemId> = registry.folders().map(|f| f.id.clone()).collect();
    let mut corrected = 0;

    for id in folder_ids {
        let count = actual.get(&id).copied().unwrap_or(0);
        if let Some(folder) = registry.get_mut(&id) {
            if let ItemKind::Folder { children_count, .. } = &mut folder.kind {
                if *children_count != count {
                    tracing::debug!(
                        "Folder {} counter corrected {} -> {}",
                        id,
                        children_count,
                        count
                    );
                    *children_count = count;
                    corrected += 1;
                }
            }
        }
    }

    corrected
}

/// A broken tree invariant found by [`verify`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("Item {0} is its own ancestor")]
    Cycle(ItemId),

    #[error("Folder {id} reports {stored} children but has {actual}")]
    CounterMismatch { id: ItemId, stored: u32, actual: u32 },

    #[error("Item {item} references missing or non-folder parent {parent}")]
    DanglingParent { item: ItemId, parent: ItemId },
}

/// Check that the registry satisfies every tree invariant
pub fn verify(registry: &ItemRegistry) -> Result<(), InvariantViolation> {
    for item in registry.iter() {
        if let Some(parent) = &item.parent_id {
            if !registry.is_folder(parent) {
                return Err(InvariantViolation::DanglingParent {
                    item: item.id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        // Walk at most `len` steps; a chain that never reaches root is a cycle.
        let mut steps = 0;
        let mut next = item.parent_id.clone();
        while let Some(parent) = next {
            if parent == item.id || steps > registry.len() {
                return Err(InvariantViolation::Cycle(item.id.clone()));
            }
            steps += 1;
            next = registry.get(&parent).ok().and_then(|p| p.parent_id.clone());
        }
    }

    for folder in registry.folders() {
        let stored = folder.children_count().unwrap_or(0);
        let actual = registry.count_children(&folder.id);
        if stored != actual {
            return Err(InvariantViolation::CounterMismatch {
                id: folder.id.clone(),
                stored,
                actual,
            });
        }
    }

    Ok(())
}
