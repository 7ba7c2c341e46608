//! Drag-and-drop protocol consumed from the UI layer

use crate::error::{GalleryError, Result};
use crate::gallery::Gallery;
use crate::item::ItemId;
use crate::move_engine::{DropVerdict, MoveSummary, MoveTarget};

/// Pointer-level drag events, independent of any particular UI toolkit.
///
/// Only [`DragInteraction::on_drag_end`] mutates the tree; the other events
/// just track the gesture.
pub trait DragInteraction {
    fn on_drag_start(&mut self, dragged: &ItemId) -> Result<()>;

    /// Pointer moved over `over` (or over nothing)
    fn on_drag_over(&mut self, over: Option<&ItemId>) -> DropVerdict;

    /// Pointer released; `over` is whatever was under it
    fn on_drag_end(&mut self, dragged: &ItemId, over: Option<&ItemId>) -> Result<MoveSummary>;

    fn on_drag_cancel(&mut self);
}

impl DragInteraction for Gallery {
    fn on_drag_start(&mut self, dragged: &ItemId) -> Result<()> {
        let (moves, registry) = self.moves_mut();
        moves.begin(registry, dragged)
    }

    fn on_drag_over(&mut self, over: Option<&ItemId>) -> DropVerdict {
        let (moves, registry) = self.moves_mut();
        match moves.phase().dragged().cloned() {
            Some(dragged) => moves.propose(registry, &dragged, over),
            None => DropVerdict::UnknownDragged,
        }
    }

    fn on_drag_end(&mut self, dragged: &ItemId, over: Option<&ItemId>) -> Result<MoveSummary> {
        // Only a live gesture for this item may commit.
        if self.drag_phase().dragged() != Some(dragged) {
            tracing::debug!("Drag end for {} without a live gesture", dragged);
            return Err(GalleryError::NoOpMove);
        }

        // Releasing over nothing, over the dragged item or over a
        // presentation is not a drop.
        let target = match over {
            Some(id) if id != dragged && self.registry().is_folder(id) => {
                MoveTarget::Folder(id.clone())
            }
            _ => MoveTarget::Nowhere,
        };
        self.move_items(std::slice::from_ref(dragged), target)
    }

    fn on_drag_cancel(&mut self) {
        let (moves, _) = self.moves_mut();
        moves.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;
    use crate::move_engine::DragPhase;
    use crate::notify::{NotificationKind, RecordingNotifier};
    use std::sync::Arc;

    fn setup() -> (Gallery, Arc<RecordingNotifier>, ItemId, ItemId, ItemId) {
        let notes = Arc::new(RecordingNotifier::new());
        let mut gallery = Gallery::new(GalleryConfig::default(), Box::new(notes.clone()));
        let folder = gallery.create_folder("Work", None).unwrap();
        let inner = gallery.create_folder("Inner", Some(folder.clone())).unwrap();
        let deck = gallery.create_presentation("Deck", None).unwrap();
        notes.drain();
        (gallery, notes, folder, inner, deck)
    }

    #[test]
    fn test_drop_on_folder_moves() {
        let (mut gallery, notes, folder, _, deck) = setup();

        gallery.on_drag_start(&deck).unwrap();
        assert_eq!(gallery.on_drag_over(Some(&folder)), DropVerdict::Valid);
        let summary = gallery.on_drag_end(&deck, Some(&folder)).unwrap();

        assert_eq!(summary.count(), 1);
        assert_eq!(gallery.get(&deck).unwrap().parent_id, Some(folder.clone()));
        assert_eq!(gallery.get(&folder).unwrap().children_count(), Some(2));
        assert_eq!(gallery.drag_phase(), &DragPhase::Committed { moved: 1 });
        assert_eq!(notes.last().unwrap().kind, NotificationKind::Success);
    }

    #[test]
    fn test_drop_outside_is_noop() {
        let (mut gallery, notes, folder, _, deck) = setup();
        let other = gallery.create_presentation("Other", None).unwrap();
        notes.drain();

        gallery.on_drag_start(&deck).unwrap();
        assert_eq!(gallery.on_drag_over(None), DropVerdict::NoTarget);
        assert_eq!(gallery.on_drag_end(&deck, None), Err(GalleryError::NoOpMove));
        gallery.on_drag_start(&deck).unwrap();
        assert_eq!(gallery.on_drag_end(&deck, Some(&deck)), Err(GalleryError::NoOpMove));
        gallery.on_drag_start(&deck).unwrap();
        assert_eq!(gallery.on_drag_end(&deck, Some(&other)), Err(GalleryError::NoOpMove));

        assert_eq!(gallery.get(&deck).unwrap().parent_id, None);
        assert_eq!(gallery.get(&folder).unwrap().children_count(), Some(1));
        assert!(notes.drain().iter().all(|n| n.kind == NotificationKind::Info));
    }

    #[test]
    fn test_over_descendant_is_flagged_but_gesture_continues() {
        let (mut gallery, _, folder, inner, deck) = setup();

        gallery.on_drag_start(&folder).unwrap();
        assert_eq!(gallery.on_drag_over(Some(&inner)), DropVerdict::Descendant);
        assert_eq!(gallery.on_drag_over(Some(&deck)), DropVerdict::NotAFolder);
        assert!(gallery.drag_phase().is_active());

        assert!(matches!(
            gallery.on_drag_end(&folder, Some(&inner)),
            Err(GalleryError::CyclicMove { .. })
        ));
        assert_eq!(gallery.get(&folder).unwrap().parent_id, None);
    }

    #[test]
    fn test_cancel() {
        let (mut gallery, _, folder, _, deck) = setup();
        let before = gallery.snapshot();

        gallery.on_drag_start(&deck).unwrap();
        gallery.on_drag_over(Some(&folder));
        gallery.on_drag_cancel();

        assert_eq!(gallery.drag_phase(), &DragPhase::Cancelled);
        assert_eq!(gallery.on_drag_over(Some(&folder)), DropVerdict::UnknownDragged);
        assert_eq!(gallery.snapshot(), before);
    }

    #[test]
    fn test_end_without_live_gesture_is_noop() {
        let (mut gallery, notes, folder, _, deck) = setup();
        let before = gallery.snapshot();

        gallery.on_drag_start(&deck).unwrap();
        gallery.on_drag_over(Some(&folder));
        gallery.on_drag_cancel();
        assert_eq!(gallery.on_drag_end(&deck, Some(&folder)), Err(GalleryError::NoOpMove));

        let other = ItemId::new("pres-never-dragged");
        assert_eq!(gallery.on_drag_end(&other, Some(&folder)), Err(GalleryError::NoOpMove));

        gallery.on_drag_start(&folder).unwrap();
        assert_eq!(gallery.on_drag_end(&deck, Some(&folder)), Err(GalleryError::NoOpMove));
        assert!(gallery.drag_phase().is_active());

        assert_eq!(gallery.snapshot(), before);
        assert!(notes.is_empty());
    }
}
