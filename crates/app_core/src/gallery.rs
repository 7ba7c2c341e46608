//! Gallery state: the single owner of the content tree and its views

use crate::command::{BulkAction, CommandOutcome, Confirm, ContextAction, GalleryCommand};
use crate::config::{DeletePolicy, GalleryConfig};
use crate::error::{GalleryError, Result};
use crate::invariants::CounterLedger;
use crate::item::{Item, ItemId, ItemPatch, ItemType};
use crate::move_engine::{DragPhase, MoveEngine, MoveSummary, MoveTarget};
use crate::navigation::{Breadcrumb, NavigationController};
use crate::notify::{Notification, Notifier};
use crate::registry::ItemRegistry;
use crate::selection::SelectionManager;
use chrono::Utc;
use std::collections::HashSet;

/// Main gallery state.
///
/// Constructed explicitly and handed to whatever drives the UI; every
/// command runs synchronously against the owned registry.
pub struct Gallery {
    config: GalleryConfig,
    registry: ItemRegistry,
    selection: SelectionManager,
    moves: MoveEngine,
    navigation: NavigationController,
    notifier: Box<dyn Notifier>,
}

impl Gallery {
    /// Create an empty gallery
    pub fn new(config: GalleryConfig, notifier: Box<dyn Notifier>) -> Self {
        Self::with_registry(config, ItemRegistry::new(), notifier)
    }

    /// Create a gallery over an existing, already verified registry
    pub fn with_registry(
        config: GalleryConfig,
        registry: ItemRegistry,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let navigation = NavigationController::new(&config.general.root_label);
        Self {
            config,
            registry,
            selection: SelectionManager::new(),
            moves: MoveEngine::new(),
            navigation,
            notifier,
        }
    }

    // ===== Queries =====

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn get(&self, id: &ItemId) -> Result<&Item> {
        self.registry.get(id)
    }

    pub fn list_children(&self, parent: Option<&ItemId>) -> Vec<&Item> {
        self.registry.list_children(parent)
    }

    pub fn items_for_current_folder(&self) -> Vec<&Item> {
        self.navigation.items_for_current_folder(&self.registry)
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.navigation.breadcrumbs(&self.registry)
    }

    pub fn current_folder(&self) -> Option<&ItemId> {
        self.navigation.current_folder()
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.selection.is_selected(id)
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn drag_phase(&self) -> &DragPhase {
        self.moves.phase()
    }

    /// Copy of every item in insertion order
    pub fn snapshot(&self) -> Vec<Item> {
        self.registry.iter().cloned().collect()
    }

    // ===== Creation =====

    pub fn create_folder(&mut self, name: &str, parent: Option<ItemId>) -> Result<ItemId> {
        let item = Item::folder(name.trim(), parent).with_author(&self.config.general.default_author);
        let id = self.create(item)?;
        self.notifier.notify(Notification::success(
            "Folder created",
            format!("Folder \"{}\" was created", name.trim()),
        ));
        Ok(id)
    }

    pub fn create_presentation(&mut self, name: &str, parent: Option<ItemId>) -> Result<ItemId> {
        let name = name.trim();
        let thumbnail = format!(
            "{}{}",
            self.config.general.thumbnail_base,
            url::form_urlencoded::byte_serialize(name.as_bytes()).collect::<String>()
        );
        let item = Item::presentation(name, parent)
            .with_author(&self.config.general.default_author)
            .with_thumbnail(&thumbnail);
        let id = self.create(item)?;
        self.notifier.notify(Notification::success(
            "Presentation created",
            format!("Presentation \"{}\" was created", name),
        ));
        Ok(id)
    }

    fn create(&mut self, item: Item) -> Result<ItemId> {
        let parent = item.parent_id.clone();
        let id = match self.registry.insert(item) {
            Ok(inserted) => inserted.id.clone(),
            Err(e) => return Err(self.reject(e)),
        };

        let mut ledger = CounterLedger::new();
        ledger.added_to(parent.as_ref());
        ledger.apply(&mut self.registry);

        tracing::info!("Created {} under {:?}", id, parent);
        Ok(id)
    }

    // ===== Mutation =====

    pub fn rename(&mut self, id: &ItemId, new_name: &str) -> Result<()> {
        let result = self
            .registry
            .update(id, ItemPatch::rename(new_name.trim()))
            .map(|item| item.item_type());

        match result {
            Ok(item_type) => {
                tracing::info!("Renamed {} to {:?}", id, new_name.trim());
                self.notifier.notify(Notification::success(
                    "Renamed",
                    format!("The {} was renamed", item_type.label()),
                ));
                Ok(())
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Delete items by id.
    ///
    /// Folders that still hold children outside the batch are handled per
    /// the configured [`DeletePolicy`]. All ids are validated before
    /// anything is removed.
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub fn delete(&mut self, ids: &[ItemId]) -> Result<usize> {
        match self.delete_items(ids) {
            Ok(deleted) => {
                if !deleted.is_empty() {
                    self.selection
                        .after_mutation(self.config.behavior.selection_after_mutation, &deleted);
                    self.navigation.revalidate(&self.registry);
                    self.notifier.notify(Notification::success(
                        "Items deleted",
                        format!("Deleted {} item(s)", deleted.len()),
                    ));
                }
                Ok(deleted.len())
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    fn delete_items(&mut self, ids: &[ItemId]) -> Result<Vec<ItemId>> {
        let mut seen = HashSet::new();
        let batch: Vec<ItemId> = ids.iter().filter(|id| seen.insert(*id)).cloned().collect();

        for id in &batch {
            self.registry.get(id)?;
        }

        let mut orphans = Vec::new();
        for id in &batch {
            if !self.registry.is_folder(id) {
                continue;
            }
            let survivors: Vec<ItemId> = self
                .registry
                .list_children(Some(id))
                .into_iter()
                .filter(|child| !seen.contains(&child.id))
                .map(|child| child.id.clone())
                .collect();
            if survivors.is_empty() {
                continue;
            }
            match self.config.behavior.delete_policy {
                DeletePolicy::Forbid => {
                    return Err(GalleryError::NotEmptyFolder {
                        id: id.clone(),
                        children: self.registry.count_children(id),
                    });
                }
                DeletePolicy::OrphanToRoot => orphans.extend(survivors),
            }
        }

        // Validation done; from here on nothing can fail.
        for orphan in &orphans {
            tracing::debug!("Orphaning {} to root", orphan);
            self.registry.set_parent(orphan, None);
        }

        let mut ledger = CounterLedger::new();
        for id in &batch {
            if let Some(parent) = self.registry.get(id).ok().and_then(|i| i.parent_id.clone()) {
                if !seen.contains(&parent) {
                    ledger.removed_from(Some(&parent));
                }
            }
        }
        for id in &batch {
            self.registry.remove(id)?;
        }
        ledger.apply(&mut self.registry);

        tracing::info!("Deleted {} item(s), orphaned {}", batch.len(), orphans.len());
        Ok(batch)
    }

    /// Move items to `target`; see [`MoveEngine::commit`]
    pub fn move_items(&mut self, ids: &[ItemId], target: MoveTarget) -> Result<MoveSummary> {
        match self.moves.commit(&mut self.registry, ids, &target) {
            Ok(summary) => {
                self.selection
                    .after_mutation(self.config.behavior.selection_after_mutation, &summary.moved);
                self.notifier.notify(Notification::success(
                    "Moved",
                    format!(
                        "Moved {} item(s) to \"{}\"",
                        summary.count(),
                        summary.target_label(&self.config.general.root_label)
                    ),
                ));
                Ok(summary)
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Expansion flag of `id`, rejecting missing items and presentations
    fn expansion_of(&self, id: &ItemId) -> Result<bool> {
        let item = self.registry.get(id).map_err(|e| self.reject(e))?;
        item.is_expanded()
            .ok_or_else(|| self.reject(GalleryError::NotAFolder(id.clone())))
    }

    /// Flip a folder's expansion flag; returns the new state
    pub fn toggle_folder_expansion(&mut self, id: &ItemId) -> Result<bool> {
        let expanded = self.expansion_of(id)?;
        self.registry.update(id, ItemPatch::expanded(!expanded))?;
        Ok(!expanded)
    }

    /// Set the expansion flag on a folder and every folder below it.
    ///
    /// Returns the number of folders whose flag changed.
    pub fn set_expanded_recursive(&mut self, id: &ItemId, expanded: bool) -> Result<usize> {
        self.expansion_of(id)?;

        let targets: Vec<ItemId> = std::iter::once(self.registry.get(id)?)
            .chain(self.registry.descendants(id))
            .filter(|item| item.is_expanded() == Some(!expanded))
            .map(|item| item.id.clone())
            .collect();

        for folder in &targets {
            self.registry.update(folder, ItemPatch::expanded(expanded))?;
        }
        Ok(targets.len())
    }

    // ===== Selection & navigation =====

    pub fn toggle_selection(&mut self, id: &ItemId) -> bool {
        self.selection.toggle(id)
    }

    pub fn select_all(&mut self, ids: Vec<ItemId>) {
        self.selection.select_all(ids);
    }

    /// Select everything currently listed
    pub fn select_visible(&mut self) {
        let ids: Vec<ItemId> = self
            .items_for_current_folder()
            .into_iter()
            .map(|item| item.id.clone())
            .collect();
        self.selection.select_all(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn navigate_to(&mut self, folder: Option<ItemId>) {
        if let Some(id) = &folder {
            if !self.registry.is_folder(id) {
                tracing::warn!("Navigating to {} which is not a folder", id);
            }
        }
        self.navigation.navigate_to(folder);
    }

    pub fn go_back(&mut self) -> bool {
        self.navigation.go_back()
    }

    pub fn go_forward(&mut self) -> bool {
        self.navigation.go_forward()
    }

    pub fn go_up(&mut self) -> bool {
        self.navigation.go_up(&self.registry)
    }

    /// Enter a folder, or mark a presentation opened
    pub fn open(&mut self, id: &ItemId) -> Result<CommandOutcome> {
        let item_type = match self.registry.get(id) {
            Ok(item) => item.item_type(),
            Err(e) => return Err(self.reject(e)),
        };
        match item_type {
            ItemType::Folder => {
                self.navigate_to(Some(id.clone()));
                Ok(CommandOutcome::OpenFolder(id.clone()))
            }
            ItemType::Presentation => {
                self.registry.update(id, ItemPatch::opened_at(Utc::now()))?;
                Ok(CommandOutcome::OpenPresentation(id.clone()))
            }
        }
    }

    // ===== Drag gesture =====

    pub(crate) fn moves_mut(&mut self) -> (&mut MoveEngine, &ItemRegistry) {
        (&mut self.moves, &self.registry)
    }

    // ===== Commands =====

    /// Run one command.
    ///
    /// Destructive commands ask `confirm` first when the configuration
    /// requests it; a declined confirmation leaves the gallery untouched.
    pub fn execute(&mut self, command: GalleryCommand, confirm: &dyn Confirm) -> Result<CommandOutcome> {
        if command.is_destructive() && self.config.behavior.confirm_delete {
            if let Some(prompt) = command.confirmation_prompt() {
                if !confirm.confirm(&prompt) {
                    tracing::debug!("Confirmation declined: {}", prompt);
                    return Ok(CommandOutcome::Declined);
                }
            }
        }

        match command {
            GalleryCommand::Open(id) => self.open(&id),
            GalleryCommand::Rename { id, name } => {
                self.rename(&id, &name)?;
                Ok(CommandOutcome::Done)
            }
            GalleryCommand::Delete(ids) => self.delete(&ids).map(CommandOutcome::Deleted),
            GalleryCommand::Move { ids, target } => {
                self.move_items(&ids, target).map(CommandOutcome::Moved)
            }
            GalleryCommand::NewFolder { name, parent } => {
                self.create_folder(&name, parent).map(CommandOutcome::Created)
            }
            GalleryCommand::NewPresentation { name, parent } => {
                self.create_presentation(&name, parent).map(CommandOutcome::Created)
            }
            GalleryCommand::ToggleExpand(id) => {
                self.toggle_folder_expansion(&id)?;
                Ok(CommandOutcome::Done)
            }
            GalleryCommand::ExpandAll(id) => {
                self.set_expanded_recursive(&id, true)?;
                Ok(CommandOutcome::Done)
            }
            GalleryCommand::CollapseAll(id) => {
                self.set_expanded_recursive(&id, false)?;
                Ok(CommandOutcome::Done)
            }
            GalleryCommand::ToggleSelection(id) => {
                self.toggle_selection(&id);
                Ok(CommandOutcome::Done)
            }
            GalleryCommand::SelectAll(ids) => {
                self.select_all(ids);
                Ok(CommandOutcome::Done)
            }
            GalleryCommand::ClearSelection => {
                self.clear_selection();
                Ok(CommandOutcome::Done)
            }
            GalleryCommand::Navigate(folder) => {
                self.navigate_to(folder);
                Ok(CommandOutcome::Done)
            }
        }
    }

    /// Context menu pick on one item
    pub fn context_action(
        &mut self,
        action: ContextAction,
        item: &ItemId,
        input: Option<&str>,
        confirm: &dyn Confirm,
    ) -> Result<CommandOutcome> {
        match action.command(item, input) {
            Some(command) => self.execute(command, confirm),
            None => Ok(CommandOutcome::Declined),
        }
    }

    /// Bulk action over the current selection
    pub fn bulk_action(
        &mut self,
        action: BulkAction,
        input: Option<&str>,
        confirm: &dyn Confirm,
    ) -> Result<CommandOutcome> {
        let command = action.command(self.selection.ids(), input);
        self.execute(command, confirm)
    }

    /// Notify about a failed operation and hand the error back
    fn reject(&self, error: GalleryError) -> GalleryError {
        tracing::debug!("Rejected: {}", error);
        self.notifier.notify(Notification::new(
            error.notification_kind(),
            error.title(),
            error.user_message(),
        ));
        error
    }
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("items", &self.registry.len())
            .field("selected", &self.selection.len())
            .field("current_folder", &self.navigation.current_folder())
            .finish()
    }
}
