//! Optional persistence gateway.
//!
//! The core never calls a gateway itself: the host diffs snapshots taken
//! before and after a command and forwards the changes.

use crate::item::{Item, ItemId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot format error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(ItemId),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Backend receiving item changes
pub trait PersistenceGateway: Send + Sync {
    fn create(&self, item: &Item) -> Result<()>;
    fn update(&self, item: &Item) -> Result<()>;
    fn delete(&self, id: &ItemId) -> Result<()>;
}

/// One item-level change between two snapshots
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Created(Item),
    Updated(Item),
    Deleted(ItemId),
}

/// Compute the changes that turn `before` into `after`
pub fn diff(before: &[Item], after: &[Item]) -> Vec<Change> {
    let old: HashMap<&ItemId, &Item> = before.iter().map(|item| (&item.id, item)).collect();
    let new: HashMap<&ItemId, &Item> = after.iter().map(|item| (&item.id, item)).collect();

    let mut changes = Vec::new();
    for item in after {
        match old.get(&item.id) {
            None => changes.push(Change::Created(item.clone())),
            Some(previous) if *previous != item => changes.push(Change::Updated(item.clone())),
            Some(_) => {}
        }
    }
    for item in before {
        if !new.contains_key(&item.id) {
            changes.push(Change::Deleted(item.id.clone()));
        }
    }
    changes
}

/// Forward changes to a gateway, stopping at the first failure
pub fn apply_changes(gateway: &dyn PersistenceGateway, changes: &[Change]) -> Result<usize> {
    for change in changes {
        match change {
            Change::Created(item) => gateway.create(item)?,
            Change::Updated(item) => gateway.update(item)?,
            Change::Deleted(id) => gateway.delete(id)?,
        }
    }
    Ok(changes.len())
}

/// Read a JSON array of items
pub fn load_snapshot(path: &Path) -> Result<Vec<Item>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write items as a pretty JSON array
pub fn save_snapshot(path: &Path, items: &[Item]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(items)?)?;
    Ok(())
}

/// Gateway keeping a JSON snapshot file in step with the gallery.
///
/// The whole file is rewritten on every change.
pub struct JsonSnapshotGateway {
    path: PathBuf,
    items: Mutex<Vec<Item>>,
}

impl JsonSnapshotGateway {
    /// Open `path`, starting empty if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = if path.exists() {
            load_snapshot(&path)?
        } else {
            Vec::new()
        };
        tracing::debug!("Snapshot gateway at {:?} with {} item(s)", path, items.len());
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Items currently stored
    pub fn items(&self) -> Vec<Item> {
        self.items.lock().clone()
    }

    fn flush(&self, items: &[Item]) -> Result<()> {
        save_snapshot(&self.path, items)
    }
}

impl PersistenceGateway for JsonSnapshotGateway {
    fn create(&self, item: &Item) -> Result<()> {
        let mut items = self.items.lock();
        items.retain(|existing| existing.id != item.id);
        items.push(item.clone());
        self.flush(&items)
    }

    fn update(&self, item: &Item) -> Result<()> {
        let mut items = self.items.lock();
        let slot = items
            .iter_mut()
            .find(|existing| existing.id == item.id)
            .ok_or_else(|| PersistenceError::NotFound(item.id.clone()))?;
        *slot = item.clone();
        self.flush(&items)
    }

    fn delete(&self, id: &ItemId) -> Result<()> {
        let mut items = self.items.lock();
        let before = items.len();
        items.retain(|existing| &existing.id != id);
        if items.len() == before {
            return Err(PersistenceError::NotFound(id.clone()));
        }
        self.flush(&items)
    }
}
