//! Canonical store of gallery items

use crate::error::{GalleryError, Result};
use crate::item::{is_valid_name, Item, ItemId, ItemKind, ItemPatch};
use std::collections::HashMap;

/// Owns every folder and presentation of the gallery.
///
/// Items are kept in insertion order; lookups go through an id index.
/// Other components hold ids only and re-resolve through the registry.
#[derive(Debug, Default)]
pub struct ItemRegistry {
    items: HashMap<ItemId, Item>,
    order: Vec<ItemId>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn get(&self, id: &ItemId) -> Result<&Item> {
        self.items
            .get(id)
            .ok_or_else(|| GalleryError::NotFound(id.clone()))
    }

    /// Resolve `id` only if it names a folder
    pub fn get_folder(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id).filter(|item| item.is_folder())
    }

    pub fn is_folder(&self, id: &ItemId) -> bool {
        self.get_folder(id).is_some()
    }

    pub(crate) fn get_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.get_mut(id)
    }

    /// All items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    pub fn folders(&self) -> impl Iterator<Item = &Item> {
        self.iter().filter(|item| item.is_folder())
    }

    /// Direct children of `parent` (`None` = root) in insertion order
    pub fn list_children(&self, parent: Option<&ItemId>) -> Vec<&Item> {
        self.iter()
            .filter(|item| item.parent_id.as_ref() == parent)
            .collect()
    }

    /// Number of items whose parent is `folder`
    pub fn count_children(&self, folder: &ItemId) -> u32 {
        self.items
            .values()
            .filter(|item| item.parent_id.as_ref() == Some(folder))
            .count() as u32
    }

    /// Ancestor chain of `id`, nearest parent first.
    ///
    /// The walk is bounded by the number of items, so a corrupted chain can
    /// never loop forever.
    pub fn ancestors(&self, id: &ItemId) -> Vec<&Item> {
        let mut chain = Vec::new();
        let mut next = self.items.get(id).and_then(|item| item.parent_id.as_ref());

        while let Some(parent_id) = next {
            if chain.len() >= self.items.len() {
                tracing::warn!("Ancestor walk from {} exceeded item count", id);
                break;
            }
            match self.items.get(parent_id) {
                Some(parent) => {
                    chain.push(parent);
                    next = parent.parent_id.as_ref();
                }
                None => break,
            }
        }

        chain
    }

    /// Is `ancestor` equal to `id` or somewhere on its parent chain?
    pub fn is_ancestor_or_self(&self, ancestor: &ItemId, id: &ItemId) -> bool {
        ancestor == id || self.ancestors(id).iter().any(|item| &item.id == ancestor)
    }

    /// Every item below `id`, depth first
    pub fn descendants(&self, id: &ItemId) -> Vec<&Item> {
        let mut found: Vec<&Item> = Vec::new();
        let mut frontier = vec![id.clone()];

        while let Some(current) = frontier.pop() {
            for child in self.list_children(Some(&current)) {
                if found.len() >= self.items.len() {
                    return found;
                }
                if child.is_folder() {
                    frontier.push(child.id.clone());
                }
                found.push(child);
            }
        }

        found
    }

    /// Add a new item.
    ///
    /// A folder always enters the registry with no children, so its counter
    /// is reset to zero; the caller accounts for the new item in its parent.
    pub fn insert(&mut self, mut item: Item) -> Result<&Item> {
        if self.items.contains_key(&item.id) {
            return Err(GalleryError::DuplicateId(item.id));
        }
        if !is_valid_name(&item.name) {
            return Err(GalleryError::EmptyName);
        }
        if let Some(parent) = &item.parent_id {
            if !self.is_folder(parent) {
                return Err(GalleryError::InvalidParent(parent.clone()));
            }
        }

        if let ItemKind::Folder { children_count, .. } = &mut item.kind {
            *children_count = 0;
        }

        let id = item.id.clone();
        tracing::debug!("Registry insert {} ({})", id, item.item_type().label());
        self.order.push(id.clone());
        Ok(&*self.items.entry(id).or_insert(item))
    }

    /// Insert without validating the parent or resetting counters.
    ///
    /// Used to load a stored tree whose items may arrive in any order;
    /// the caller must recount and verify afterwards.
    pub(crate) fn insert_unchecked(&mut self, item: Item) -> Result<()> {
        if self.items.contains_key(&item.id) {
            return Err(GalleryError::DuplicateId(item.id));
        }
        self.order.push(item.id.clone());
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    pub fn remove(&mut self, id: &ItemId) -> Result<Item> {
        let item = self
            .items
            .remove(id)
            .ok_or_else(|| GalleryError::NotFound(id.clone()))?;
        self.order.retain(|existing| existing != id);
        tracing::debug!("Registry remove {}", id);
        Ok(item)
    }

    /// Apply a partial mutation and refresh `updated_at`
    pub fn update(&mut self, id: &ItemId, patch: ItemPatch) -> Result<&Item> {
        if let Some(name) = &patch.name {
            if !is_valid_name(name) {
                return Err(GalleryError::EmptyName);
            }
        }

        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| GalleryError::NotFound(id.clone()))?;

        if let Some(name) = patch.name {
            item.name = name;
        }

        match &mut item.kind {
            ItemKind::Folder { is_expanded, .. } => {
                if let Some(expanded) = patch.is_expanded {
                    *is_expanded = expanded;
                }
            }
            ItemKind::Presentation {
                slide_count,
                thumbnail,
                last_opened,
            } => {
                if let Some(count) = patch.slide_count {
                    *slide_count = count;
                }
                if let Some(reference) = patch.thumbnail {
                    *thumbnail = reference;
                }
                if let Some(at) = patch.last_opened {
                    *last_opened = Some(at);
                }
            }
        }

        item.touch();
        Ok(&*item)
    }

    /// Set an item's parent without any validation or counter upkeep.
    ///
    /// Only the move engine and delete path call this, after validating the
    /// target and while holding a ledger for the counter deltas.
    pub(crate) fn set_parent(&mut self, id: &ItemId, parent: Option<ItemId>) -> Option<Option<ItemId>> {
        let item = self.items.get_mut(id)?;
        let previous = std::mem::replace(&mut item.parent_id, parent);
        item.touch();
        Some(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: &str, parent: Option<&str>) -> Item {
        Item::folder(id, parent.map(ItemId::new)).with_id(ItemId::new(id))
    }

    fn pres(id: &str, parent: Option<&str>) -> Item {
        Item::presentation(id, parent.map(ItemId::new)).with_id(ItemId::new(id))
    }

    #[test]
    fn test_insert_and_get() {
        let mut reg = ItemRegistry::new();
        reg.insert(folder("a", None)).unwrap();
        reg.insert(pres("p1", Some("a"))).unwrap();

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(&ItemId::new("p1")).unwrap().name, "p1");
        assert!(reg.is_folder(&ItemId::new("a")));
        assert!(!reg.is_folder(&ItemId::new("p1")));
        assert_eq!(
            reg.get(&ItemId::new("nope")),
            Err(GalleryError::NotFound(ItemId::new("nope")))
        );
    }

    #[test]
    fn test_insert_rejects_duplicates_and_bad_parents() {
        let mut reg = ItemRegistry::new();
        reg.insert(folder("a", None)).unwrap();
        reg.insert(pres("p1", None)).unwrap();

        assert_eq!(
            reg.insert(pres("a", None)).unwrap_err(),
            GalleryError::DuplicateId(ItemId::new("a"))
        );
        assert_eq!(
            reg.insert(pres("p2", Some("missing"))).unwrap_err(),
            GalleryError::InvalidParent(ItemId::new("missing"))
        );
        // A presentation cannot contain anything
        assert_eq!(
            reg.insert(pres("p3", Some("p1"))).unwrap_err(),
            GalleryError::InvalidParent(ItemId::new("p1"))
        );
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_insert_resets_folder_counter() {
        let mut reg = ItemRegistry::new();
        let mut stale = folder("a", None);
        stale.kind = ItemKind::Folder {
            is_expanded: true,
            children_count: 12,
        };
        let inserted = reg.insert(stale).unwrap();
        assert_eq!(inserted.children_count(), Some(0));
        assert_eq!(inserted.is_expanded(), Some(true));
    }

    #[test]
    fn test_list_children_keeps_insertion_order() {
        let mut reg = ItemRegistry::new();
        reg.insert(folder("a", None)).unwrap();
        reg.insert(pres("z", Some("a"))).unwrap();
        reg.insert(pres("root", None)).unwrap();
        reg.insert(pres("b", Some("a"))).unwrap();

        let names: Vec<_> = reg
            .list_children(Some(&ItemId::new("a")))
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["z", "b"]);

        let roots: Vec<_> = reg.list_children(None).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(roots, vec!["a", "root"]);
    }

    #[test]
    fn test_update_and_rename_validation() {
        let mut reg = ItemRegistry::new();
        reg.insert(pres("p1", None)).unwrap();
        let before = reg.get(&ItemId::new("p1")).unwrap().updated_at;

        let updated = reg
            .update(&ItemId::new("p1"), ItemPatch::rename("Quarterly").with_slide_count(24))
            .unwrap();
        assert_eq!(updated.name, "Quarterly");
        assert_eq!(updated.slide_count(), Some(24));
        assert!(updated.updated_at >= before);

        assert_eq!(
            reg.update(&ItemId::new("p1"), ItemPatch::rename("   ")).unwrap_err(),
            GalleryError::EmptyName
        );
        assert_eq!(reg.get(&ItemId::new("p1")).unwrap().name, "Quarterly");
        assert!(reg.update(&ItemId::new("x"), ItemPatch::default()).is_err());
    }

    #[test]
    fn test_remove() {
        let mut reg = ItemRegistry::new();
        reg.insert(pres("p1", None)).unwrap();
        assert_eq!(reg.remove(&ItemId::new("p1")).unwrap().name, "p1");
        assert!(reg.is_empty());
        assert!(reg.remove(&ItemId::new("p1")).is_err());
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let mut reg = ItemRegistry::new();
        reg.insert(folder("a", None)).unwrap();
        reg.insert(folder("b", Some("a"))).unwrap();
        reg.insert(folder("c", Some("b"))).unwrap();
        reg.insert(pres("p", Some("c"))).unwrap();

        let chain: Vec<_> = reg
            .ancestors(&ItemId::new("p"))
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(chain, vec!["c", "b", "a"]);

        assert!(reg.is_ancestor_or_self(&ItemId::new("a"), &ItemId::new("c")));
        assert!(reg.is_ancestor_or_self(&ItemId::new("c"), &ItemId::new("c")));
        assert!(!reg.is_ancestor_or_self(&ItemId::new("c"), &ItemId::new("a")));

        assert_eq!(reg.descendants(&ItemId::new("a")).len(), 3);
        assert!(reg.descendants(&ItemId::new("p")).is_empty());
    }
}
