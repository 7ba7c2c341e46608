//! Gallery error types

use crate::item::ItemId;
use crate::notify::NotificationKind;
use thiserror::Error;

/// Errors returned by gallery tree operations.
///
/// Every variant is recoverable: the tree is left exactly as it was before
/// the failed call and the UI is expected to surface the error as a
/// notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("Parent is not an existing folder: {0}")]
    InvalidParent(ItemId),

    #[error("Duplicate item id: {0}")]
    DuplicateId(ItemId),

    #[error("Moving {moved} into {target} would make it its own ancestor")]
    CyclicMove { moved: ItemId, target: ItemId },

    #[error("Name must not be empty")]
    EmptyName,

    // Not a failure: the gesture ended outside of any folder.
    #[error("Nothing was dropped on a folder")]
    NoOpMove,

    #[error("Target folder not found: {0}")]
    TargetNotFound(ItemId),

    #[error("Not a folder: {0}")]
    NotAFolder(ItemId),

    #[error("Folder {id} still contains {children} item(s)")]
    NotEmptyFolder { id: ItemId, children: u32 },
}

impl GalleryError {
    /// Is this the "drop outside any folder" outcome rather than a real failure?
    pub fn is_noop(&self) -> bool {
        matches!(self, GalleryError::NoOpMove)
    }

    /// Severity used when the error is shown to the user
    pub fn notification_kind(&self) -> NotificationKind {
        if self.is_noop() {
            NotificationKind::Info
        } else {
            NotificationKind::Error
        }
    }

    /// Short title for a notification
    pub fn title(&self) -> &'static str {
        match self {
            GalleryError::NoOpMove => "Move cancelled",
            GalleryError::CyclicMove { .. } | GalleryError::TargetNotFound(_) => "Move failed",
            GalleryError::EmptyName => "Invalid name",
            GalleryError::NotEmptyFolder { .. } => "Delete failed",
            _ => "Error",
        }
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            GalleryError::NoOpMove => "Drag the item onto a folder to move it".to_string(),
            GalleryError::TargetNotFound(_) => "Target folder not found".to_string(),
            GalleryError::CyclicMove { .. } => {
                "A folder cannot be moved into itself or one of its subfolders".to_string()
            }
            GalleryError::EmptyName => "Enter a name".to_string(),
            GalleryError::NotAFolder(_) => "This action needs a folder".to_string(),
            GalleryError::NotEmptyFolder { children, .. } => {
                format!("The folder is not empty ({} item(s))", children)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_is_informational() {
        assert!(GalleryError::NoOpMove.is_noop());
        assert_eq!(GalleryError::NoOpMove.notification_kind(), NotificationKind::Info);

        let err = GalleryError::TargetNotFound(ItemId::new("folder-x"));
        assert!(!err.is_noop());
        assert_eq!(err.notification_kind(), NotificationKind::Error);
    }

    #[test]
    fn test_user_message() {
        let err = GalleryError::NotEmptyFolder {
            id: ItemId::new("folder-1"),
            children: 3,
        };
        assert_eq!(err.user_message(), "The folder is not empty (3 item(s))");
        assert_eq!(
            GalleryError::NotFound(ItemId::new("pres-9")).user_message(),
            "Item not found: pres-9"
        );
        assert_eq!(
            GalleryError::NotAFolder(ItemId::new("pres-9")).user_message(),
            "This action needs a folder"
        );
    }
}
