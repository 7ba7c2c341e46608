//! Command system for gallery actions

use crate::item::{ItemId, ItemType};
use crate::move_engine::{MoveSummary, MoveTarget};
use std::fmt;
use std::str::FromStr;

/// Entries of the per-item context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextAction {
    Open,
    Rename,
    Move,
    Delete,
    NewPresentation,
    NewFolder,
    ExpandAll,
    CollapseAll,
}

const COMMON_ACTIONS: &[ContextAction] = &[
    ContextAction::Open,
    ContextAction::Rename,
    ContextAction::Move,
    ContextAction::Delete,
];

const FOLDER_ACTIONS: &[ContextAction] = &[
    ContextAction::NewPresentation,
    ContextAction::NewFolder,
    ContextAction::CollapseAll,
    ContextAction::ExpandAll,
    ContextAction::Open,
    ContextAction::Rename,
    ContextAction::Move,
    ContextAction::Delete,
];

impl ContextAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextAction::Open => "open",
            ContextAction::Rename => "rename",
            ContextAction::Move => "move",
            ContextAction::Delete => "delete",
            ContextAction::NewPresentation => "new_presentation",
            ContextAction::NewFolder => "new_folder",
            ContextAction::ExpandAll => "expand_all",
            ContextAction::CollapseAll => "collapse_all",
        }
    }

    /// Menu entries offered for an item of the given type
    pub fn menu_for(item_type: ItemType) -> &'static [ContextAction] {
        match item_type {
            ItemType::Folder => FOLDER_ACTIONS,
            ItemType::Presentation => COMMON_ACTIONS,
        }
    }

    /// Translate a menu pick on `item` into a command.
    ///
    /// `input` is the text the user typed, `None` if the prompt was
    /// dismissed; a dismissed prompt yields no command. For `Move` an empty
    /// input means root.
    pub fn command(self, item: &ItemId, input: Option<&str>) -> Option<GalleryCommand> {
        let command = match self {
            ContextAction::Open => GalleryCommand::Open(item.clone()),
            ContextAction::Delete => GalleryCommand::Delete(vec![item.clone()]),
            ContextAction::ExpandAll => GalleryCommand::ExpandAll(item.clone()),
            ContextAction::CollapseAll => GalleryCommand::CollapseAll(item.clone()),
            ContextAction::Rename => GalleryCommand::Rename {
                id: item.clone(),
                name: input?.to_string(),
            },
            ContextAction::NewPresentation => GalleryCommand::NewPresentation {
                name: input?.to_string(),
                parent: Some(item.clone()),
            },
            ContextAction::NewFolder => GalleryCommand::NewFolder {
                name: input?.to_string(),
                parent: Some(item.clone()),
            },
            ContextAction::Move => {
                let target = match input.map(str::trim) {
                    None => MoveTarget::Nowhere,
                    Some("") => MoveTarget::Root,
                    Some(folder) => MoveTarget::Folder(ItemId::new(folder)),
                };
                GalleryCommand::Move {
                    ids: vec![item.clone()],
                    target,
                }
            }
        };
        Some(command)
    }
}

impl fmt::Display for ContextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "open" => ContextAction::Open,
            "rename" => ContextAction::Rename,
            "move" => ContextAction::Move,
            "delete" => ContextAction::Delete,
            "new_presentation" => ContextAction::NewPresentation,
            "new_folder" => ContextAction::NewFolder,
            "expand_all" => ContextAction::ExpandAll,
            "collapse_all" => ContextAction::CollapseAll,
            other => return Err(UnknownAction(other.to_string())),
        })
    }
}

/// Actions offered for the current multi-selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkAction {
    Move,
    Delete,
}

impl BulkAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BulkAction::Move => "move",
            BulkAction::Delete => "delete",
        }
    }

    /// Translate the action over `selected` into a command.
    ///
    /// A bulk move without a target folder is a no-op move, never a move to
    /// root.
    pub fn command(self, selected: Vec<ItemId>, input: Option<&str>) -> GalleryCommand {
        match self {
            BulkAction::Delete => GalleryCommand::Delete(selected),
            BulkAction::Move => {
                let target = match input.map(str::trim) {
                    None | Some("") => MoveTarget::Nowhere,
                    Some(folder) => MoveTarget::Folder(ItemId::new(folder)),
                };
                GalleryCommand::Move {
                    ids: selected,
                    target,
                }
            }
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move" => Ok(BulkAction::Move),
            "delete" => Ok(BulkAction::Delete),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown action: {0}")]
pub struct UnknownAction(pub String);

/// Every operation the gallery accepts from its UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryCommand {
    /// Enter a folder or open a presentation
    Open(ItemId),
    Rename { id: ItemId, name: String },
    Delete(Vec<ItemId>),
    Move { ids: Vec<ItemId>, target: MoveTarget },
    NewFolder { name: String, parent: Option<ItemId> },
    NewPresentation { name: String, parent: Option<ItemId> },
    ToggleExpand(ItemId),
    /// Expand a folder and every folder below it
    ExpandAll(ItemId),
    CollapseAll(ItemId),
    ToggleSelection(ItemId),
    SelectAll(Vec<ItemId>),
    ClearSelection,
    Navigate(Option<ItemId>),
}

impl GalleryCommand {
    /// Commands that need user confirmation before running
    pub fn is_destructive(&self) -> bool {
        matches!(self, GalleryCommand::Delete(_))
    }

    /// Question to ask before running a destructive command
    pub fn confirmation_prompt(&self) -> Option<String> {
        match self {
            GalleryCommand::Delete(ids) if ids.len() == 1 => {
                Some("Delete the selected item?".to_string())
            }
            GalleryCommand::Delete(ids) => Some(format!("Delete {} items?", ids.len())),
            _ => None,
        }
    }
}

/// What a successfully dispatched command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Done,
    Created(ItemId),
    Moved(MoveSummary),
    Deleted(usize),
    OpenFolder(ItemId),
    /// The host should open the presentation editor
    OpenPresentation(ItemId),
    /// The user declined a confirmation or dismissed a prompt
    Declined,
}

/// Confirmation for destructive actions
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirms everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ItemId {
        ItemId::new(s)
    }

    #[test]
    fn test_tags_round_trip() {
        for action in ContextAction::menu_for(ItemType::Folder) {
            assert_eq!(action.as_str().parse::<ContextAction>().unwrap(), *action);
        }
        assert_eq!("move".parse::<BulkAction>().unwrap(), BulkAction::Move);
        assert_eq!(
            "copy".parse::<BulkAction>().unwrap_err(),
            UnknownAction("copy".to_string())
        );
    }

    #[test]
    fn test_menu_contents() {
        let pres = ContextAction::menu_for(ItemType::Presentation);
        assert!(!pres.contains(&ContextAction::NewFolder));
        assert!(pres.contains(&ContextAction::Delete));

        let folder = ContextAction::menu_for(ItemType::Folder);
        assert!(folder.contains(&ContextAction::NewPresentation));
        assert!(folder.contains(&ContextAction::ExpandAll));
    }

    #[test]
    fn test_dismissed_prompt_gives_no_command() {
        assert_eq!(ContextAction::Rename.command(&id("a"), None), None);
        assert_eq!(ContextAction::NewFolder.command(&id("a"), None), None);
        assert_eq!(
            ContextAction::Rename.command(&id("a"), Some("")),
            Some(GalleryCommand::Rename {
                id: id("a"),
                name: String::new(),
            })
        );
    }

    #[test]
    fn test_move_target_parsing() {
        let to = |action: ContextAction, input| match action.command(&id("p"), input) {
            Some(GalleryCommand::Move { target, .. }) => target,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(to(ContextAction::Move, Some("  ")), MoveTarget::Root);
        assert_eq!(to(ContextAction::Move, None), MoveTarget::Nowhere);
        assert_eq!(
            to(ContextAction::Move, Some("folder-1")),
            MoveTarget::Folder(id("folder-1"))
        );

        assert_eq!(
            BulkAction::Move.command(vec![id("p")], Some("")),
            GalleryCommand::Move {
                ids: vec![id("p")],
                target: MoveTarget::Nowhere,
            }
        );
    }

    #[test]
    fn test_confirmation_prompts() {
        assert!(GalleryCommand::Delete(vec![id("a")]).is_destructive());
        assert_eq!(
            GalleryCommand::Delete(vec![id("a"), id("b")]).confirmation_prompt(),
            Some("Delete 2 items?".to_string())
        );
        assert_eq!(GalleryCommand::ClearSelection.confirmation_prompt(), None);
    }
}
