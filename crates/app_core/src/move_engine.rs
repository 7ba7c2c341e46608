//! Reparenting of gallery items: drop-target evaluation and committed moves

use crate::error::{GalleryError, Result};
use crate::invariants::CounterLedger;
use crate::item::ItemId;
use crate::registry::ItemRegistry;
use std::collections::HashSet;

/// Where a move should put the items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTarget {
    /// The gesture ended outside any folder; nothing moves
    Nowhere,
    /// Explicit move to the top level
    Root,
    /// Into an existing folder
    Folder(ItemId),
}

impl MoveTarget {
    /// Parent id the moved items end up with
    fn parent(&self) -> Option<&ItemId> {
        match self {
            MoveTarget::Folder(id) => Some(id),
            MoveTarget::Root | MoveTarget::Nowhere => None,
        }
    }
}

// A missing drop target is never shorthand for root.
impl From<Option<ItemId>> for MoveTarget {
    fn from(target: Option<ItemId>) -> Self {
        match target {
            Some(id) => MoveTarget::Folder(id),
            None => MoveTarget::Nowhere,
        }
    }
}

/// Legality of the current drop candidate during a drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropVerdict {
    Valid,
    /// Pointer is not over any item
    NoTarget,
    /// Pointer is over the dragged item itself
    SelfTarget,
    /// Pointer is over a presentation
    NotAFolder,
    /// Pointer is over a folder nested inside the dragged folder
    Descendant,
    /// Candidate id does not resolve
    UnknownTarget,
    /// Dragged id does not resolve
    UnknownDragged,
}

impl DropVerdict {
    pub fn is_valid(self) -> bool {
        self == DropVerdict::Valid
    }
}

/// Phase of the current drag gesture
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    /// Gesture started, pointer not over anything yet
    Dragging { dragged: ItemId },
    Proposed {
        dragged: ItemId,
        over: Option<ItemId>,
        verdict: DropVerdict,
    },
    Committed { moved: usize },
    Rejected(GalleryError),
    Cancelled,
}

impl DragPhase {
    pub fn is_active(&self) -> bool {
        matches!(self, DragPhase::Dragging { .. } | DragPhase::Proposed { .. })
    }

    pub fn dragged(&self) -> Option<&ItemId> {
        match self {
            DragPhase::Dragging { dragged } | DragPhase::Proposed { dragged, .. } => Some(dragged),
            _ => None,
        }
    }
}

/// Result of a committed move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSummary {
    /// Moved ids in request order, duplicates removed
    pub moved: Vec<ItemId>,
    /// New parent, `None` for root
    pub target: Option<ItemId>,
    /// Name of the target folder, `None` for root
    pub target_name: Option<String>,
    /// Parent each item had before the move
    pub previous_parents: Vec<(ItemId, Option<ItemId>)>,
}

impl MoveSummary {
    pub fn count(&self) -> usize {
        self.moved.len()
    }

    /// Target name for display, with `root_label` standing in for root
    pub fn target_label<'a>(&'a self, root_label: &'a str) -> &'a str {
        self.target_name.as_deref().unwrap_or(root_label)
    }
}

/// Validates and executes moves.
///
/// Holds only the drag gesture state; the tree itself is borrowed from the
/// registry for each call.
#[derive(Debug, Default)]
pub struct MoveEngine {
    phase: DragPhase,
}

impl MoveEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// Start a drag gesture for `dragged`
    pub fn begin(&mut self, registry: &ItemRegistry, dragged: &ItemId) -> Result<()> {
        registry.get(dragged)?;
        self.phase = DragPhase::Dragging {
            dragged: dragged.clone(),
        };
        Ok(())
    }

    /// Judge a drop candidate without touching any state
    pub fn evaluate(registry: &ItemRegistry, dragged: &ItemId, over: Option<&ItemId>) -> DropVerdict {
        if !registry.contains(dragged) {
            return DropVerdict::UnknownDragged;
        }
        let Some(over) = over else {
            return DropVerdict::NoTarget;
        };
        if over == dragged {
            return DropVerdict::SelfTarget;
        }
        let Ok(candidate) = registry.get(over) else {
            return DropVerdict::UnknownTarget;
        };
        if !candidate.is_folder() {
            return DropVerdict::NotAFolder;
        }
        if registry.is_ancestor_or_self(dragged, over) {
            return DropVerdict::Descendant;
        }
        DropVerdict::Valid
    }

    /// Record the pointer's current drop candidate.
    ///
    /// Never mutates the registry; repeated calls with the same arguments
    /// yield the same verdict and leave the engine in the same phase.
    pub fn propose(
        &mut self,
        registry: &ItemRegistry,
        dragged: &ItemId,
        over: Option<&ItemId>,
    ) -> DropVerdict {
        let verdict = Self::evaluate(registry, dragged, over);
        self.phase = DragPhase::Proposed {
            dragged: dragged.clone(),
            over: over.cloned(),
            verdict,
        };
        verdict
    }

    /// Abandon the gesture without mutation
    pub fn cancel(&mut self) {
        if self.phase.is_active() {
            tracing::debug!("Drag cancelled");
            self.phase = DragPhase::Cancelled;
        }
    }

    /// Validate and execute a move of `dragged_ids` to `target`.
    ///
    /// Either every item moves or nothing changes. Each distinct old parent
    /// loses exactly the number of its children that moved and the target
    /// gains the total, in a single counter pass.
    #[tracing::instrument(skip(self, registry, dragged_ids), fields(count = dragged_ids.len()))]
    pub fn commit(
        &mut self,
        registry: &mut ItemRegistry,
        dragged_ids: &[ItemId],
        target: &MoveTarget,
    ) -> Result<MoveSummary> {
        let result = Self::execute(registry, dragged_ids, target);

        if self.phase != DragPhase::Idle {
            self.phase = match &result {
                Ok(summary) => DragPhase::Committed {
                    moved: summary.count(),
                },
                Err(e) => DragPhase::Rejected(e.clone()),
            };
        }

        result
    }

    fn execute(
        registry: &mut ItemRegistry,
        dragged_ids: &[ItemId],
        target: &MoveTarget,
    ) -> Result<MoveSummary> {
        if *target == MoveTarget::Nowhere {
            tracing::debug!("Move skipped: no drop target");
            return Err(GalleryError::NoOpMove);
        }

        let mut seen = HashSet::new();
        let moved: Vec<ItemId> = dragged_ids
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect();
        if moved.is_empty() {
            return Err(GalleryError::NoOpMove);
        }

        for id in &moved {
            registry.get(id)?;
        }

        let target_name = match target {
            MoveTarget::Folder(folder_id) => {
                let folder = registry
                    .get_folder(folder_id)
                    .ok_or_else(|| GalleryError::TargetNotFound(folder_id.clone()))?;
                for id in &moved {
                    if registry.is_ancestor_or_self(id, folder_id) {
                        return Err(GalleryError::CyclicMove {
                            moved: id.clone(),
                            target: folder_id.clone(),
                        });
                    }
                }
                Some(folder.name.clone())
            }
            MoveTarget::Root | MoveTarget::Nowhere => None,
        };

        // Validation done; from here on nothing can fail.
        let new_parent = target.parent().cloned();
        let mut ledger = CounterLedger::new();
        let mut previous_parents = Vec::with_capacity(moved.len());

        for id in &moved {
            if let Some(previous) = registry.set_parent(id, new_parent.clone()) {
                ledger.moved(previous.as_ref(), new_parent.as_ref());
                previous_parents.push((id.clone(), previous));
            }
        }
        ledger.apply(registry);

        tracing::info!(
            "Moved {} item(s) to {}",
            moved.len(),
            new_parent.as_ref().map_or("root", |id| id.as_str())
        );

        Ok(MoveSummary {
            moved,
            target: new_parent,
            target_name,
            previous_parents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::verify;
    use crate::item::Item;

    fn id(s: &str) -> ItemId {
        ItemId::new(s)
    }

    /// a/ { b/ { p2 }, p1 }, c/, p3
    fn sample() -> ItemRegistry {
        let mut reg = ItemRegistry::new();
        let mut ledger = CounterLedger::new();
        for item in [
            Item::folder("A", None).with_id(id("a")),
            Item::folder("B", Some(id("a"))).with_id(id("b")),
            Item::folder("C", None).with_id(id("c")),
            Item::presentation("P1", Some(id("a"))).with_id(id("p1")),
            Item::presentation("P2", Some(id("b"))).with_id(id("p2")),
            Item::presentation("P3", None).with_id(id("p3")),
        ] {
            ledger.added_to(item.parent_id.as_ref());
            reg.insert(item).unwrap();
        }
        ledger.apply(&mut reg);
        verify(&reg).unwrap();
        reg
    }

    fn count(reg: &ItemRegistry, folder: &str) -> u32 {
        reg.get(&id(folder)).unwrap().children_count().unwrap()
    }

    #[test]
    fn test_missing_target_is_not_root() {
        assert_eq!(MoveTarget::from(None), MoveTarget::Nowhere);
        assert_eq!(MoveTarget::from(Some(id("c"))), MoveTarget::Folder(id("c")));
    }

    #[test]
    fn test_evaluate_verdicts() {
        let reg = sample();
        assert_eq!(MoveEngine::evaluate(&reg, &id("p1"), Some(&id("c"))), DropVerdict::Valid);
        assert_eq!(MoveEngine::evaluate(&reg, &id("p1"), None), DropVerdict::NoTarget);
        assert_eq!(MoveEngine::evaluate(&reg, &id("a"), Some(&id("a"))), DropVerdict::SelfTarget);
        assert_eq!(MoveEngine::evaluate(&reg, &id("p1"), Some(&id("p3"))), DropVerdict::NotAFolder);
        assert_eq!(MoveEngine::evaluate(&reg, &id("a"), Some(&id("b"))), DropVerdict::Descendant);
        assert_eq!(MoveEngine::evaluate(&reg, &id("p1"), Some(&id("zz"))), DropVerdict::UnknownTarget);
        assert_eq!(MoveEngine::evaluate(&reg, &id("zz"), Some(&id("c"))), DropVerdict::UnknownDragged);
    }

    #[test]
    fn test_propose_is_idempotent() {
        let reg = sample();
        let before: Vec<Item> = reg.iter().cloned().collect();
        let mut engine = MoveEngine::new();
        engine.begin(&reg, &id("a")).unwrap();

        let first = engine.propose(&reg, &id("a"), Some(&id("b")));
        let phase = engine.phase().clone();
        for _ in 0..5 {
            assert_eq!(engine.propose(&reg, &id("a"), Some(&id("b"))), first);
            assert_eq!(engine.phase(), &phase);
        }

        assert_eq!(first, DropVerdict::Descendant);
        let after: Vec<Item> = reg.iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_bulk_move_adjusts_each_folder_once() {
        let mut reg = sample();
        let mut engine = MoveEngine::new();

        let summary = engine
            .commit(
                &mut reg,
                &[id("p1"), id("p2"), id("p3"), id("p1")],
                &MoveTarget::Folder(id("c")),
            )
            .unwrap();

        assert_eq!(summary.count(), 3);
        assert_eq!(summary.target_name.as_deref(), Some("C"));
        assert_eq!(summary.previous_parents[1], (id("p2"), Some(id("b"))));
        assert_eq!(count(&reg, "c"), 3);
        assert_eq!(count(&reg, "a"), 1);
        assert_eq!(count(&reg, "b"), 0);
        verify(&reg).unwrap();
    }

    #[test]
    fn test_move_to_root() {
        let mut reg = sample();
        let summary = MoveEngine::new()
            .commit(&mut reg, &[id("b")], &MoveTarget::Root)
            .unwrap();

        assert_eq!(summary.target, None);
        assert_eq!(summary.target_label("All presentations"), "All presentations");
        assert_eq!(reg.get(&id("b")).unwrap().parent_id, None);
        assert_eq!(count(&reg, "a"), 1);
        verify(&reg).unwrap();
    }

    #[test]
    fn test_rejected_moves_leave_tree_untouched() {
        let mut reg = sample();
        let before: Vec<Item> = reg.iter().cloned().collect();
        let mut engine = MoveEngine::new();

        assert_eq!(
            engine.commit(&mut reg, &[id("p1")], &MoveTarget::Nowhere),
            Err(GalleryError::NoOpMove)
        );
        assert_eq!(
            engine.commit(&mut reg, &[], &MoveTarget::Root),
            Err(GalleryError::NoOpMove)
        );
        assert_eq!(
            engine.commit(&mut reg, &[id("p1"), id("ghost")], &MoveTarget::Root),
            Err(GalleryError::NotFound(id("ghost")))
        );
        assert_eq!(
            engine.commit(&mut reg, &[id("p1")], &MoveTarget::Folder(id("p3"))),
            Err(GalleryError::TargetNotFound(id("p3")))
        );
        assert_eq!(
            engine.commit(&mut reg, &[id("p3"), id("a")], &MoveTarget::Folder(id("b"))),
            Err(GalleryError::CyclicMove {
                moved: id("a"),
                target: id("b"),
            })
        );
        assert_eq!(
            engine.commit(&mut reg, &[id("a")], &MoveTarget::Folder(id("a"))),
            Err(GalleryError::CyclicMove {
                moved: id("a"),
                target: id("a"),
            })
        );

        let after: Vec<Item> = reg.iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_phase_transitions() {
        let mut reg = sample();
        let mut engine = MoveEngine::new();
        assert_eq!(engine.phase(), &DragPhase::Idle);

        engine.begin(&reg, &id("p3")).unwrap();
        assert_eq!(engine.phase().dragged(), Some(&id("p3")));
        engine.cancel();
        assert_eq!(engine.phase(), &DragPhase::Cancelled);

        engine.begin(&reg, &id("p3")).unwrap();
        engine.propose(&reg, &id("p3"), Some(&id("c")));
        engine
            .commit(&mut reg, &[id("p3")], &MoveTarget::Folder(id("c")))
            .unwrap();
        assert_eq!(engine.phase(), &DragPhase::Committed { moved: 1 });

        engine.begin(&reg, &id("p3")).unwrap();
        let _ = engine.commit(&mut reg, &[id("p3")], &MoveTarget::Nowhere);
        assert_eq!(engine.phase(), &DragPhase::Rejected(GalleryError::NoOpMove));

        assert!(engine.begin(&reg, &id("ghost")).is_err());
    }
}
