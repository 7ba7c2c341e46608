//! Gallery items: folders and presentations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque item identifier, unique across folders and presentations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Generate a fresh id with the prefix used for the given item type
    pub fn generate(item_type: ItemType) -> Self {
        Self(format!("{}-{}", item_type.id_prefix(), Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The two item variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Folder,
    Presentation,
}

impl ItemType {
    fn id_prefix(self) -> &'static str {
        match self {
            ItemType::Folder => "folder",
            ItemType::Presentation => "pres",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemType::Folder => "folder",
            ItemType::Presentation => "presentation",
        }
    }
}

/// Variant-specific item data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    #[serde(rename_all = "camelCase")]
    Folder {
        #[serde(default)]
        is_expanded: bool,
        #[serde(default)]
        children_count: u32,
    },
    #[serde(rename_all = "camelCase")]
    Presentation {
        #[serde(default)]
        slide_count: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thumbnail: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_opened: Option<DateTime<Utc>>,
    },
}

/// A folder or presentation in the gallery tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Containing folder, `None` for root
    pub parent_id: Option<ItemId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    /// New collapsed, empty folder with a generated id
    pub fn folder(name: &str, parent_id: Option<ItemId>) -> Self {
        Self::new(
            ItemId::generate(ItemType::Folder),
            name,
            parent_id,
            ItemKind::Folder {
                is_expanded: false,
                children_count: 0,
            },
        )
    }

    /// New single-slide presentation with a generated id
    pub fn presentation(name: &str, parent_id: Option<ItemId>) -> Self {
        Self::new(
            ItemId::generate(ItemType::Presentation),
            name,
            parent_id,
            ItemKind::Presentation {
                slide_count: 1,
                thumbnail: None,
                last_opened: None,
            },
        )
    }

    fn new(id: ItemId, name: &str, parent_id: Option<ItemId>, kind: ItemKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.to_string(),
            parent_id,
            created_at: now,
            updated_at: now,
            author: None,
            kind,
        }
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = id;
        self
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    pub fn with_thumbnail(mut self, reference: &str) -> Self {
        if let ItemKind::Presentation { thumbnail, .. } = &mut self.kind {
            *thumbnail = Some(reference.to_string());
        }
        self
    }

    pub fn item_type(&self) -> ItemType {
        match self.kind {
            ItemKind::Folder { .. } => ItemType::Folder,
            ItemKind::Presentation { .. } => ItemType::Presentation,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ItemKind::Folder { .. })
    }

    /// Number of direct children, `None` for presentations
    pub fn children_count(&self) -> Option<u32> {
        match self.kind {
            ItemKind::Folder { children_count, .. } => Some(children_count),
            ItemKind::Presentation { .. } => None,
        }
    }

    /// Expansion flag, `None` for presentations
    pub fn is_expanded(&self) -> Option<bool> {
        match self.kind {
            ItemKind::Folder { is_expanded, .. } => Some(is_expanded),
            ItemKind::Presentation { .. } => None,
        }
    }

    pub fn slide_count(&self) -> Option<u32> {
        match self.kind {
            ItemKind::Presentation { slide_count, .. } => Some(slide_count),
            ItemKind::Folder { .. } => None,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Partial mutation applied through [`crate::ItemRegistry::update`].
///
/// Folder-only fields are ignored for presentations and vice versa.
/// Reparenting is not part of a patch; it goes through the move engine.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub is_expanded: Option<bool>,
    pub slide_count: Option<u32>,
    pub thumbnail: Option<Option<String>>,
    pub last_opened: Option<DateTime<Utc>>,
}

impl ItemPatch {
    pub fn rename(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn expanded(expanded: bool) -> Self {
        Self {
            is_expanded: Some(expanded),
            ..Self::default()
        }
    }

    pub fn opened_at(at: DateTime<Utc>) -> Self {
        Self {
            last_opened: Some(at),
            ..Self::default()
        }
    }

    pub fn with_slide_count(mut self, count: u32) -> Self {
        self.slide_count = Some(count);
        self
    }
}

/// Is the name acceptable for an item (non-blank after trimming)?
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids() {
        let folder = Item::folder("Reports", None);
        let pres = Item::presentation("Q1", Some(folder.id.clone()));

        assert!(folder.id.as_str().starts_with("folder-"));
        assert!(pres.id.as_str().starts_with("pres-"));
        assert_ne!(folder.id, Item::folder("Reports", None).id);
        assert_eq!(folder.children_count(), Some(0));
        assert_eq!(folder.is_expanded(), Some(false));
        assert_eq!(pres.slide_count(), Some(1));
        assert_eq!(pres.children_count(), None);
    }

    #[test]
    fn test_wire_shape() {
        let folder = Item::folder("Archive", None).with_id(ItemId::new("folder-2"));
        let json = serde_json::to_value(&folder).unwrap();

        assert_eq!(json["type"], "folder");
        assert_eq!(json["id"], "folder-2");
        assert_eq!(json["parentId"], serde_json::Value::Null);
        assert_eq!(json["childrenCount"], 0);
        assert_eq!(json["isExpanded"], false);

        let back: Item = serde_json::from_value(json).unwrap();
        assert_eq!(back, folder);
    }

    #[test]
    fn test_valid_name() {
        assert!(is_valid_name("Deck"));
        assert!(is_valid_name("  Deck "));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name(" \t\n"));
    }
}
