//! Initial gallery contents

use crate::config::DEFAULT_THUMBNAIL_BASE;
use crate::error::GalleryError;
use crate::invariants::{recount, verify, InvariantViolation};
use crate::item::{Item, ItemId, ItemKind};
use crate::persistence::{load_snapshot, PersistenceError};
use crate::registry::ItemRegistry;
use chrono::{DateTime, NaiveDate, Utc};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error(transparent)]
    Load(#[from] PersistenceError),

    #[error(transparent)]
    Item(#[from] GalleryError),

    #[error("Seed breaks the tree: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Build a registry from stored items in any order.
///
/// Stored folder counters are not trusted and are rebuilt; the result is
/// verified before it is returned.
pub fn registry_from_items(items: Vec<Item>) -> Result<ItemRegistry, SeedError> {
    let mut registry = ItemRegistry::new();
    for item in items {
        registry.insert_unchecked(item)?;
    }

    let corrected = recount(&mut registry);
    if corrected > 0 {
        tracing::warn!("Corrected {} stale folder counter(s) in seed", corrected);
    }
    verify(&registry)?;
    Ok(registry)
}

/// Load a registry from a JSON snapshot file
pub fn load_seed(path: &Path) -> Result<ItemRegistry, SeedError> {
    let registry = registry_from_items(load_snapshot(path)?)?;
    tracing::info!("Loaded {} item(s) from {:?}", registry.len(), path);
    Ok(registry)
}

fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, min, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

fn folder(id: &str, name: &str, author: &str, created: DateTime<Utc>, updated: DateTime<Utc>, stale_count: u32) -> Item {
    Item {
        id: ItemId::new(id),
        name: name.to_string(),
        parent_id: None,
        created_at: created,
        updated_at: updated,
        author: Some(author.to_string()),
        kind: ItemKind::Folder {
            is_expanded: false,
            children_count: stale_count,
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn presentation(
    id: &str,
    name: &str,
    parent: Option<&str>,
    author: &str,
    slides: u32,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    seed: &str,
) -> Item {
    Item {
        id: ItemId::new(id),
        name: name.to_string(),
        parent_id: parent.map(ItemId::new),
        created_at: created,
        updated_at: updated,
        author: Some(author.to_string()),
        kind: ItemKind::Presentation {
            slide_count: slides,
            thumbnail: Some(format!("{}{}", DEFAULT_THUMBNAIL_BASE, seed)),
            last_opened: None,
        },
    }
}

/// Sample gallery shown on first start.
///
/// The stored folder counters are stale; [`registry_from_items`] rebuilds
/// them.
pub fn sample_items() -> Vec<Item> {
    vec![
        folder("folder-1", "Work projects", "Ivan Petrov", at(2024, 1, 1, 0, 0), at(2024, 3, 25, 16, 20), 3),
        folder("folder-2", "Archive 2023", "System", at(2023, 12, 1, 0, 0), at(2024, 1, 10, 11, 30), 12),
        folder("folder-3", "Personal", "Current user", at(2024, 2, 15, 14, 30), at(2024, 3, 28, 9, 15), 5),
        presentation("pres-1", "Quarterly report Q1", None, "Ivan Petrov", 24, at(2024, 1, 15, 10, 30), at(2024, 3, 20, 14, 45), "Q1-report"),
        presentation("pres-2", "Investor pitch", Some("folder-1"), "Anna Sidorova", 18, at(2024, 2, 10, 9, 15), at(2024, 3, 25, 16, 20), "INV"),
        presentation("pres-3", "New hire onboarding", None, "Petr Ivanov", 32, at(2024, 3, 1, 11, 0), at(2024, 3, 28, 13, 10), "NEW"),
        presentation("pres-4", "2024 roadmap", Some("folder-1"), "Ivan Petrov", 42, at(2024, 2, 28, 15, 45), at(2024, 3, 22, 11, 20), "2024"),
        presentation("pres-5", "A/B test results", Some("folder-3"), "Anna Sidorova", 28, at(2024, 3, 15, 13, 30), at(2024, 3, 27, 17, 5), "AB-test"),
        presentation("pres-6", "Product X launch", None, "Petr Ivanov", 36, at(2024, 3, 10, 16, 20), at(2024, 3, 26, 10, 40), "Product-X"),
    ]
}

/// Registry holding [`sample_items`]
pub fn sample_registry() -> Result<ItemRegistry, SeedError> {
    registry_from_items(sample_items())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::save_snapshot;

    #[test]
    fn test_sample_counters_are_rebuilt() {
        let reg = sample_registry().unwrap();
        let count = |id: &str| reg.get(&ItemId::new(id)).unwrap().children_count();

        assert_eq!(reg.len(), 9);
        assert_eq!(count("folder-1"), Some(2));
        assert_eq!(count("folder-2"), Some(0));
        assert_eq!(count("folder-3"), Some(1));
    }

    #[test]
    fn test_items_may_arrive_child_first() {
        let mut items = sample_items();
        items.reverse();
        assert!(registry_from_items(items).is_ok());
    }

    #[test]
    fn test_sample_thumbnails_use_default_base() {
        let base = crate::config::GeneralConfig::default().thumbnail_base;
        let thumbnails: Vec<String> = sample_items()
            .into_iter()
            .filter_map(|item| match item.kind {
                ItemKind::Presentation { thumbnail, .. } => thumbnail,
                ItemKind::Folder { .. } => None,
            })
            .collect();

        assert!(!thumbnails.is_empty());
        assert!(thumbnails.iter().all(|url| url.starts_with(&base)));
    }

    #[test]
    fn test_rejects_broken_seeds() {
        let mut items = sample_items();
        items.push(items[0].clone());
        assert!(matches!(
            registry_from_items(items),
            Err(SeedError::Item(GalleryError::DuplicateId(_)))
        ));

        let mut items = sample_items();
        items[3].parent_id = Some(ItemId::new("pres-2"));
        assert!(matches!(
            registry_from_items(items),
            Err(SeedError::Invariant(InvariantViolation::DanglingParent { .. }))
        ));
    }

    #[test]
    fn test_load_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        save_snapshot(&path, &sample_items()).unwrap();

        let reg = load_seed(&path).unwrap();
        assert_eq!(reg.len(), 9);
        assert!(load_seed(&dir.path().join("missing.json")).is_err());
    }
}
