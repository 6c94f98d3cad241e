//! # Pagecraft Editor
//!
//! Editing session controller for Pagecraft pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: scene graph store                 │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditingSession                      │
//! │  - Desktop/mobile snapshots + switching     │
//! │  - Overlay exclusivity + Escape priority    │
//! │  - Copy/cut/paste with id remapping         │
//! │  - Undo baseline guard                      │
//! │  - Local and remote auto-save               │
//! └─────────────────────────────────────────────┘
//!           ↓                       ↓
//! ┌───────────────────┐   ┌───────────────────┐
//! │ Synchronizer      │   │ Persistence       │
//! │ (desktop⇄mobile)  │   │ (remote save)     │
//! └───────────────────┘   └───────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **One session per mount**: no global editor state
//! 2. **The host owns the clock**: deferred steps run on [`EditingSession::advance`]
//! 3. **Collaborator failures are reported, not thrown**: they become notifications
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_document::InMemoryStore;
//! use pagecraft_editor::{
//!     EditingSession, MirrorSynchronizer, Platform, PlatformContent, SessionConfig,
//! };
//!
//! let mut session = EditingSession::mount(
//!     InMemoryStore::default(),
//!     MirrorSynchronizer::new(),
//!     SessionConfig::default(),
//!     PlatformContent::new(Some(stored_desktop), None),
//!     Platform::Desktop,
//! )?;
//!
//! session.select_node(Some("btn-1".into()));
//! session.copy()?;
//! let pasted = session.paste()?;
//!
//! // Selection lands after the defer delay
//! session.advance(std::time::Duration::from_millis(50));
//!
//! session.switch_platform(Platform::Mobile)?;
//! session.auto_save_local()?;
//! ```

mod baseline;
mod clipboard;
mod config;
mod deferred;
mod errors;
mod keymap;
mod notifications;
mod overlay;
mod persistence;
mod platform;
mod session;
mod sync;

pub use baseline::BaselineGuard;
pub use clipboard::{
    apply_position_offset, build_remap_table, capture_subtree, clone_root_only,
    remap_tree, resolve_paste_target, Clipboard, PasteTarget, POSITION_PROPS,
};
pub use config::{BaselineComparison, SessionConfig};
pub use deferred::{DeferredAction, DeferredHandle, DeferredQueue};
pub use errors::{SessionError, ValidationError};
pub use keymap::{resolve_shortcut, EditorCommand, FocusScope, KeyChord};
pub use notifications::{Notification, NotificationLevel};
pub use overlay::{EscapeTarget, LightBoxEvent, Overlay, Overlays};
pub use persistence::{Persistence, PersistenceError, SaveRequest};
pub use platform::{Platform, PlatformContent};
pub use session::{
    AutoSaveOutcome, EditingSession, RemoteSaveOutcome, ShortcutOutcome, SyncOutcome,
    UndoOutcome,
};
pub use sync::{MirrorSynchronizer, PlatformSynchronizer, SyncError, LAYOUT_PROPS};

// Re-export document types for convenience
pub use pagecraft_document::{NodeId, SceneGraphStore};
