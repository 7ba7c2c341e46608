//! Current folder, breadcrumbs and navigation history

use crate::item::{Item, ItemId};
use crate::registry::ItemRegistry;
use serde::{Deserialize, Serialize};

/// One step of the root-to-current path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// `None` for the root crumb
    pub id: Option<ItemId>,
    pub name: String,
}

/// Tracks the folder being browsed.
///
/// Everything it returns is projected from the registry on demand; only the
/// current folder id and the history stacks are stored.
#[derive(Debug, Clone)]
pub struct NavigationController {
    current: Option<ItemId>,
    root_label: String,

    /// Navigation history stack
    history: Vec<Option<ItemId>>,

    /// Forward stack
    forward: Vec<Option<ItemId>>,
}

impl NavigationController {
    pub fn new(root_label: &str) -> Self {
        Self {
            current: None,
            root_label: root_label.to_string(),
            history: Vec::new(),
            forward: Vec::new(),
        }
    }

    pub fn current_folder(&self) -> Option<&ItemId> {
        self.current.as_ref()
    }

    /// Navigate to `folder` (`None` = root)
    pub fn navigate_to(&mut self, folder: Option<ItemId>) {
        if folder == self.current {
            return;
        }
        let old = std::mem::replace(&mut self.current, folder);
        self.history.push(old);
        self.forward.clear();
        tracing::debug!("Navigated to {:?}", self.current);
    }

    /// Go back in history
    pub fn go_back(&mut self) -> bool {
        if let Some(prev) = self.history.pop() {
            let current = std::mem::replace(&mut self.current, prev);
            self.forward.push(current);
            true
        } else {
            false
        }
    }

    /// Go forward in history
    pub fn go_forward(&mut self) -> bool {
        if let Some(next) = self.forward.pop() {
            let current = std::mem::replace(&mut self.current, next);
            self.history.push(current);
            true
        } else {
            false
        }
    }

    /// Navigate to the parent of the current folder
    pub fn go_up(&mut self, registry: &ItemRegistry) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        let parent = registry
            .get_folder(current)
            .and_then(|folder| folder.parent_id.clone());
        self.navigate_to(parent);
        true
    }

    /// Forget folders that no longer exist.
    ///
    /// Deleted folders are dropped from both history stacks, and the current
    /// folder falls back to root if it vanished. Returns whether it did.
    pub fn revalidate(&mut self, registry: &ItemRegistry) -> bool {
        let alive = |entry: &Option<ItemId>| entry.as_ref().map_or(true, |id| registry.is_folder(id));
        self.history.retain(alive);
        self.forward.retain(alive);

        let reset = match &self.current {
            Some(id) if !registry.is_folder(id) => {
                tracing::debug!("Current folder {} vanished, returning to root", id);
                self.current = None;
                true
            }
            _ => false,
        };

        // Filtering can leave repeats that would make back/forward a no-op.
        self.history.dedup();
        self.forward.dedup();
        while self.history.last() == Some(&self.current) {
            self.history.pop();
        }
        while self.forward.last() == Some(&self.current) {
            self.forward.pop();
        }
        reset
    }

    /// Root-to-current path.
    ///
    /// If the current folder does not resolve, only the root crumb is
    /// returned.
    pub fn breadcrumbs(&self, registry: &ItemRegistry) -> Vec<Breadcrumb> {
        let mut crumbs = vec![Breadcrumb {
            id: None,
            name: self.root_label.clone(),
        }];

        let Some(folder) = self.current.as_ref().and_then(|id| registry.get_folder(id)) else {
            return crumbs;
        };

        let ancestors = registry.ancestors(&folder.id);
        crumbs.extend(
            ancestors
                .iter()
                .rev()
                .chain(std::iter::once(&folder))
                .map(|item| Breadcrumb {
                    id: Some(item.id.clone()),
                    name: item.name.clone(),
                }),
        );
        crumbs
    }

    /// Items shown for the current folder.
    ///
    /// At root: root folders, then root presentations. Inside a folder: the
    /// folder itself followed by its direct children. Deeper levels are
    /// reached by navigating again.
    pub fn items_for_current_folder<'a>(&self, registry: &'a ItemRegistry) -> Vec<&'a Item> {
        match &self.current {
            None => {
                let roots = registry.list_children(None);
                let (mut folders, presentations): (Vec<&Item>, Vec<&Item>) =
                    roots.into_iter().partition(|item| item.is_folder());
                folders.extend(presentations);
                folders
            }
            Some(id) => match registry.get_folder(id) {
                Some(folder) => {
                    let mut items = vec![folder];
                    items.extend(registry.list_children(Some(id)));
                    items
                }
                None => Vec::new(),
            },
        }
    }
}
