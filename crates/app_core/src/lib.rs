//! iSlides Gallery Core Domain Logic
//!
//! This crate contains:
//! - Item model and registry
//! - Folder counter upkeep and invariant checks
//! - Selection, navigation and move engine
//! - Command system and drag protocol
//! - Configuration
//! - Error types
//! - Notification and persistence seams

pub mod item;
pub mod registry;
pub mod invariants;
pub mod selection;
pub mod move_engine;
pub mod navigation;
pub mod command;
pub mod drag;
pub mod gallery;
pub mod config;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod seed;

pub use item::{Item, ItemId, ItemKind, ItemPatch, ItemType};
pub use registry::ItemRegistry;
pub use invariants::{CounterLedger, InvariantViolation};
pub use selection::{SelectionManager, SelectionPolicy};
pub use move_engine::{DragPhase, DropVerdict, MoveEngine, MoveSummary, MoveTarget};
pub use navigation::{Breadcrumb, NavigationController};
pub use command::{
    AlwaysConfirm, BulkAction, CommandOutcome, Confirm, ContextAction, GalleryCommand,
    UnknownAction,
};
pub use drag::DragInteraction;
pub use gallery::Gallery;
pub use config::{
    BehaviorConfig, DeletePolicy, GalleryConfig, GeneralConfig, LoggingConfig,
    DEFAULT_THUMBNAIL_BASE,
};
pub use error::GalleryError;
pub use notify::{Notification, NotificationKind, Notifier, RecordingNotifier, TracingNotifier};
pub use persistence::{JsonSnapshotGateway, PersistenceError, PersistenceGateway};
pub use seed::SeedError;
