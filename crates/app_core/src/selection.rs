//! Multi-select state for gallery items

use crate::item::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What happens to the selection after a delete or move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Drop the whole selection
    #[default]
    #[serde(rename = "clear_all")]
    ClearAll,
    /// Drop only the ids the operation touched
    #[serde(rename = "prune_affected")]
    PruneAffected,
}

/// Set of selected item ids.
///
/// Independent of tree shape: deleting an item elsewhere does not remove
/// it from here, see [`SelectionManager::after_mutation`].
#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    selected: HashSet<ItemId>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`; returns whether it is selected afterwards
    pub fn toggle(&mut self, id: &ItemId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Replace the selection wholesale
    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ItemId>,
    {
        self.selected = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in sorted order
    pub fn ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Remove the given ids from the selection
    pub fn prune<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a ItemId>,
    {
        for id in ids {
            self.selected.remove(id);
        }
    }

    /// Bring the selection in line with `policy` after ids were deleted or moved
    pub fn after_mutation(&mut self, policy: SelectionPolicy, affected: &[ItemId]) {
        match policy {
            SelectionPolicy::ClearAll => self.clear(),
            SelectionPolicy::PruneAffected => self.prune(affected),
        }
    }
}
