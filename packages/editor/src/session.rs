//! # Editing Session
//!
//! The controller that owns everything about one open editor: the
//! per-platform snapshots, the live scene graph store, the active overlay,
//! the clipboard, the undo baseline and the pending deferred actions.
//!
//! A session is created on mount and dropped on unmount. Dropping it (or
//! calling [`EditingSession::teardown`]) cancels every deferred action it
//! scheduled.
//!
//! Synchronizer and persistence failures never escape the session. They are
//! logged, pushed onto the notification queue, and leave overlay and platform
//! state as it was.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use pagecraft_document::{default_document, DocumentError, NodeId, SceneGraph, SceneGraphStore};

use crate::clipboard::{capture_subtree, clone_root_only, remap_tree, resolve_paste_target};
use crate::{
    resolve_shortcut, BaselineGuard, Clipboard, DeferredAction, DeferredHandle, DeferredQueue,
    EditorCommand, EscapeTarget, FocusScope, KeyChord, Notification, Overlay, Overlays,
    Persistence, PersistenceError, Platform, PlatformContent, PlatformSynchronizer, SaveRequest,
    SessionConfig, SessionError, SyncError, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSaveOutcome {
    /// Loading, view-only, or paused after a remote save
    Skipped,

    /// Live graph already matches the stored snapshot
    Clean,

    Saved,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteSaveOutcome {
    NothingToSave,
    Saved,
    Failed(PersistenceError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Content is loading; nothing was read or written
    Skipped,

    /// Slots updated, live graph already matched
    Synced,

    /// Slots updated and the live graph was reloaded
    Reloaded,

    Failed(SyncError),
}

impl RemoteSaveOutcome {
    /// Turn a failed save into an error for callers that propagate with `?`
    pub fn into_result(self) -> Result<Self, SessionError> {
        match self {
            RemoteSaveOutcome::Failed(e) => Err(e.into()),
            other => Ok(other),
        }
    }
}

impl SyncOutcome {
    /// Turn a failed sync into an error for callers that propagate with `?`
    pub fn into_result(self) -> Result<Self, SessionError> {
        match self {
            SyncOutcome::Failed(e) => Err(e.into()),
            other => Ok(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UndoOutcome {
    Undone,

    /// The live graph is still the loaded document
    AtInitialState,

    NothingToUndo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ShortcutOutcome {
    /// Not a shortcut here (or focus is outside the canvas)
    Ignored,
    Copied,
    Cut,
    Pasted(NodeId),
    Undo(UndoOutcome),
    Redone(bool),
    Closed(EscapeTarget),
    NothingToClose,
}

/// A remote save between its two phases
#[derive(Debug)]
struct InFlightSave {
    request: SaveRequest,

    /// The platform's slot when the save began
    slot: Option<String>,
}

pub struct EditingSession<S: SceneGraphStore, Y: PlatformSynchronizer> {
    store: S,
    synchronizer: Y,
    config: SessionConfig,

    /// Latest snapshot of each platform
    content: PlatformContent,

    /// Last snapshot of each platform known to be saved remotely
    persisted: PlatformContent,

    current_platform: Platform,

    /// Held while the live graph is being replaced
    is_loading_content: bool,

    overlays: Overlays,
    clipboard: Clipboard,
    baseline: BaselineGuard,
    deferred: DeferredQueue,
    pending_selection: Option<DeferredHandle>,

    save_in_flight: Option<InFlightSave>,
    auto_save_pause: Option<DeferredHandle>,
    last_auto_save_time: Option<DateTime<Utc>>,

    notifications: Vec<Notification>,
}

impl<S: SceneGraphStore, Y: PlatformSynchronizer> EditingSession<S, Y> {
    /// Create a session and load `platform` into the store.
    ///
    /// `content` is what storage holds for each platform. A platform with
    /// no content gets a default one-section document.
    pub fn mount(
        store: S,
        synchronizer: Y,
        config: SessionConfig,
        content: PlatformContent,
        platform: Platform,
    ) -> Result<Self, SessionError> {
        let baseline = BaselineGuard::new(config.baseline_comparison);
        let mut session = Self {
            store,
            synchronizer,
            config,
            persisted: content.clone(),
            content,
            current_platform: platform,
            is_loading_content: false,
            overlays: Overlays::new(),
            clipboard: Clipboard::new(),
            baseline,
            deferred: DeferredQueue::new(),
            pending_selection: None,
            save_in_flight: None,
            auto_save_pause: None,
            last_auto_save_time: None,
            notifications: Vec::new(),
        };

        session.load_platform(platform)?;
        tracing::info!(%platform, view_only = session.config.view_only, "[Session] mounted");
        Ok(session)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access for property edits made by the host
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn synchronizer(&self) -> &Y {
        &self.synchronizer
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_platform(&self) -> Platform {
        self.current_platform
    }

    pub fn content(&self) -> &PlatformContent {
        &self.content
    }

    pub fn is_loading_content(&self) -> bool {
        self.is_loading_content
    }

    pub fn active_overlay(&self) -> Option<&Overlay> {
        self.overlays.active()
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn baseline(&self) -> &BaselineGuard {
        &self.baseline
    }

    pub fn last_auto_save_time(&self) -> Option<DateTime<Utc>> {
        self.last_auto_save_time
    }

    pub fn is_save_in_flight(&self) -> bool {
        self.save_in_flight.is_some()
    }

    pub fn is_auto_save_paused(&self) -> bool {
        self.auto_save_pause.is_some()
    }

    pub fn pending_actions(&self) -> usize {
        self.deferred.pending()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn select_node(&mut self, id: Option<NodeId>) {
        self.store.select_node(id);
    }

    pub fn serialize(&self) -> Result<String, SessionError> {
        Ok(self.store.serialize()?)
    }

    // ---------------------------------------------------------------------
    // Platform content
    // ---------------------------------------------------------------------

    /// Replace the live graph with `platform`'s snapshot and schedule its
    /// baseline capture
    fn load_platform(&mut self, platform: Platform) -> Result<(), SessionError> {
        let snapshot = match self.content.get(platform) {
            Some(snapshot) => snapshot.to_string(),
            None => {
                let snapshot = default_document().to_snapshot()?;
                tracing::info!(%platform, "[Session] no content, using default document");
                self.content.set(platform, snapshot.clone());
                if let Some(handle) = self.baseline.reset(platform) {
                    self.deferred.cancel(handle);
                }
                snapshot
            }
        };

        self.replace_live_graph(&snapshot)?;

        if self.baseline.needs_capture(platform) {
            let handle = self.deferred.schedule(
                DeferredAction::CaptureBaseline(platform),
                self.config.baseline_capture_delay(),
            );
            self.baseline.mark_pending(platform, handle);
        }
        Ok(())
    }

    fn replace_live_graph(&mut self, snapshot: &str) -> Result<(), DocumentError> {
        self.is_loading_content = true;
        let result = self.store.deserialize(snapshot);
        self.is_loading_content = false;
        result
    }

    pub fn switch_platform(&mut self, target: Platform) -> Result<(), SessionError> {
        if target == self.current_platform {
            tracing::debug!(%target, "[Session] already on platform");
            return Ok(());
        }
        if self.is_loading_content {
            return Err(SessionError::StateConflict("platform content is loading"));
        }

        let outgoing = self.current_platform;
        let live = self.store.serialize()?;
        self.content.set(outgoing, live);
        // Failures are reported; the outgoing slot is already stored
        let _ = self.sync_or_notify(outgoing);

        self.close_all_overlays();
        self.cancel_pending_selection();

        self.current_platform = target;
        if let Err(e) = self.load_platform(target) {
            tracing::error!(error = ?e, %target, "[Session] platform load failed");
            self.current_platform = outgoing;
            return Err(e);
        }

        tracing::info!(from = %outgoing, to = %target, "[Session] platform switched");
        Ok(())
    }

    /// Run the synchronizer over both slots with `source` as the edited side.
    /// Slots are only replaced when the whole result is usable.
    fn reconcile(&mut self, source: Platform) -> Result<(), SyncError> {
        let result = self.synchronizer.bidirectional_sync(
            self.content.get(Platform::Desktop),
            self.content.get(Platform::Mobile),
            source,
        )?;

        for platform in [Platform::Desktop, Platform::Mobile] {
            let Some(after) = result.get(platform) else {
                if self.content.has(platform) {
                    return Err(SyncError::ContentLost(platform));
                }
                continue;
            };

            SceneGraph::from_snapshot(after).map_err(|e| SyncError::InvalidContent {
                platform,
                message: e.to_string(),
            })?;

            if let Some(before) = self.content.get(platform) {
                if before != after {
                    tracing::debug!(
                        %platform,
                        structural = self.synchronizer.has_structural_changes(before, after),
                        "[Sync] platform content updated"
                    );
                }
            }
        }

        self.content = result;
        Ok(())
    }

    fn sync_or_notify(&mut self, source: Platform) -> Result<(), SyncError> {
        self.reconcile(source).map_err(|e| {
            tracing::warn!(error = ?e, %source, "[Sync] cross-platform sync failed");
            self.notifications
                .push(Notification::warning(format!("Could not sync platforms: {}", e)));
            e
        })
    }

    /// Push the live graph (or the stored slot of the other platform)
    /// through the synchronizer, reloading the live graph if its reconciled
    /// content changed
    pub fn cross_platform_sync(&mut self, source: Platform) -> SyncOutcome {
        if self.is_loading_content {
            tracing::debug!("[Sync] skipped while loading");
            return SyncOutcome::Skipped;
        }

        let loaded = match self.store.serialize() {
            Ok(live) => live,
            Err(e) => {
                tracing::warn!(error = ?e, "[Sync] cannot read live graph");
                return SyncOutcome::Failed(SyncError::Failed(e.to_string()));
            }
        };
        if source == self.current_platform {
            self.content.set(source, loaded.clone());
        }

        if let Err(e) = self.sync_or_notify(source) {
            return SyncOutcome::Failed(e);
        }

        self.reload_if_changed(&loaded)
    }

    fn reload_if_changed(&mut self, loaded: &str) -> SyncOutcome {
        let Some(reconciled) = self.content.get(self.current_platform).map(String::from) else {
            return SyncOutcome::Synced;
        };
        if reconciled == loaded {
            return SyncOutcome::Synced;
        }

        match self.replace_live_graph(&reconciled) {
            Ok(()) => {
                tracing::info!(platform = %self.current_platform, "[Sync] live graph reloaded");
                SyncOutcome::Reloaded
            }
            Err(e) => {
                tracing::warn!(error = ?e, "[Sync] reload failed");
                let error = SyncError::Failed(e.to_string());
                self.notifications
                    .push(Notification::warning(format!("Could not sync platforms: {}", error)));
                SyncOutcome::Failed(error)
            }
        }
    }

    /// Regenerate the mobile page from the desktop page
    pub fn convert_desktop_to_mobile(&mut self) -> SyncOutcome {
        if self.is_loading_content {
            return SyncOutcome::Skipped;
        }

        let loaded = match self.store.serialize() {
            Ok(live) => live,
            Err(e) => return SyncOutcome::Failed(SyncError::Failed(e.to_string())),
        };
        if self.current_platform == Platform::Desktop {
            self.content.set(Platform::Desktop, loaded.clone());
        }

        let converted = self
            .content
            .get(Platform::Desktop)
            .ok_or_else(|| SyncError::Failed("desktop has no content".to_string()))
            .and_then(|desktop| self.synchronizer.convert_desktop_content_to_mobile(desktop))
            .and_then(|mobile| {
                SceneGraph::from_snapshot(&mobile)
                    .map(|_| mobile)
                    .map_err(|e| SyncError::InvalidContent {
                        platform: Platform::Mobile,
                        message: e.to_string(),
                    })
            });

        let mobile = match converted {
            Ok(mobile) => mobile,
            Err(e) => {
                tracing::warn!(error = ?e, "[Sync] desktop to mobile conversion failed");
                self.notifications
                    .push(Notification::warning(format!("Could not convert to mobile: {}", e)));
                return SyncOutcome::Failed(e);
            }
        };

        self.content.set(Platform::Mobile, mobile);
        if let Some(handle) = self.baseline.reset(Platform::Mobile) {
            self.deferred.cancel(handle);
        }
        tracing::info!("[Sync] mobile content regenerated from desktop");

        if self.current_platform != Platform::Mobile {
            return SyncOutcome::Synced;
        }
        let outcome = self.reload_if_changed(&loaded);
        if self.baseline.needs_capture(Platform::Mobile) {
            let handle = self.deferred.schedule(
                DeferredAction::CaptureBaseline(Platform::Mobile),
                self.config.baseline_capture_delay(),
            );
            self.baseline.mark_pending(Platform::Mobile, handle);
        }
        outcome
    }

    // ---------------------------------------------------------------------
    // Auto-save
    // ---------------------------------------------------------------------

    fn auto_save_blocked(&self) -> bool {
        self.is_loading_content || self.config.view_only || self.auto_save_pause.is_some()
    }

    /// Store the live graph in the current platform's slot when it changed
    pub fn auto_save_local(&mut self) -> Result<AutoSaveOutcome, SessionError> {
        if self.auto_save_blocked() {
            return Ok(AutoSaveOutcome::Skipped);
        }

        let live = self.store.serialize()?;
        if self.content.get(self.current_platform) == Some(live.as_str()) {
            return Ok(AutoSaveOutcome::Clean);
        }

        self.content.set(self.current_platform, live);
        let _ = self.sync_or_notify(self.current_platform);
        tracing::debug!(platform = %self.current_platform, "[AutoSave] local snapshot stored");
        Ok(AutoSaveOutcome::Saved)
    }

    /// First phase of a remote save: returns the payload to persist, or
    /// `None` when nothing changed since the last successful save
    pub fn begin_remote_save(&mut self) -> Result<Option<SaveRequest>, SessionError> {
        if let Some(in_flight) = &self.save_in_flight {
            tracing::warn!(platform = %in_flight.request.platform, "[AutoSave] save already in flight");
            return Err(SessionError::StateConflict("a remote save is already in flight"));
        }
        if self.auto_save_blocked() {
            return Ok(None);
        }

        let live = self.store.serialize()?;
        if self.persisted.get(self.current_platform) == Some(live.as_str()) {
            return Ok(None);
        }

        let request = SaveRequest {
            platform: self.current_platform,
            payload: live,
            requested_at: Utc::now(),
        };
        self.save_in_flight = Some(InFlightSave {
            request: request.clone(),
            slot: self.content.get(self.current_platform).map(str::to_string),
        });
        tracing::debug!(platform = %request.platform, "[AutoSave] remote save started");
        Ok(Some(request))
    }

    /// Second phase of a remote save, with the host's result
    pub fn finish_remote_save(
        &mut self,
        request: SaveRequest,
        result: Result<(), PersistenceError>,
    ) -> Result<RemoteSaveOutcome, SessionError> {
        let slot_at_begin = match self.save_in_flight.take() {
            Some(in_flight) if in_flight.request == request => in_flight.slot,
            other => {
                self.save_in_flight = other;
                return Err(SessionError::StateConflict("save request is not in flight"));
            }
        };

        if let Err(e) = result {
            tracing::warn!(error = ?e, platform = %request.platform, "[AutoSave] remote save failed");
            self.notifications
                .push(Notification::error(format!("Auto-save failed: {}", e)));
            return Ok(RemoteSaveOutcome::Failed(e));
        }

        let platform = request.platform;
        self.persisted.set(platform, request.payload.clone());
        // Local content stored while the save was in flight is newer
        let slot = self.content.get(platform);
        let superseded =
            slot != slot_at_begin.as_deref() && slot != Some(request.payload.as_str());
        if superseded {
            tracing::debug!(%platform, "[AutoSave] keeping newer local content");
        } else {
            self.content.set(platform, request.payload);
            let _ = self.sync_or_notify(platform);
        }

        let now = Utc::now();
        self.last_auto_save_time = Some(now);

        let handle = self
            .deferred
            .schedule(DeferredAction::ResumeAutoSave, self.config.post_save_resume());
        if let Some(previous) = self.auto_save_pause.replace(handle) {
            self.deferred.cancel(previous);
        }

        tracing::info!(%platform, at = %now, "[AutoSave] remote save complete");
        Ok(RemoteSaveOutcome::Saved)
    }

    /// Both save phases against a collaborator that answers immediately
    pub fn auto_save_remote(
        &mut self,
        persistence: &dyn Persistence,
    ) -> Result<RemoteSaveOutcome, SessionError> {
        let Some(request) = self.begin_remote_save()? else {
            return Ok(RemoteSaveOutcome::NothingToSave);
        };
        let result = persistence.save(request.platform, &request.payload);
        self.finish_remote_save(request, result)
    }

    // ---------------------------------------------------------------------
    // Overlays
    // ---------------------------------------------------------------------

    pub fn open_overlay(&mut self, overlay: Overlay) {
        self.close_all_overlays();
        if let Some(id) = overlay.selects() {
            self.store.select_node(Some(id.clone()));
        }
        tracing::debug!(?overlay, "[Overlay] opened");
        self.overlays.open(overlay);
    }

    pub fn close_all_overlays(&mut self) {
        if let Some(handle) = self.overlays.close_all() {
            self.deferred.cancel(handle);
        }
        self.store.select_node(None);
    }

    /// Show the non-modal dropbox preview for `id`
    pub fn hover_dropbox(&mut self, id: NodeId) {
        if let Some(handle) = self.overlays.hover(id) {
            self.deferred.cancel(handle);
        }
    }

    /// Close the dropbox preview after the hover delay unless hovered again
    pub fn schedule_hover_close(&mut self) -> Option<DeferredHandle> {
        self.overlays.hovered_dropbox()?;
        let handle = self
            .deferred
            .schedule(DeferredAction::CloseHoverDropbox, self.config.hover_close_delay());
        if let Some(previous) = self.overlays.arm_hover_close(handle) {
            self.deferred.cancel(previous);
        }
        Some(handle)
    }

    /// Close the topmost surface by Escape priority
    pub fn escape(&mut self) -> Option<EscapeTarget> {
        let target = self.overlays.escape_target()?;
        match target {
            EscapeTarget::Dropbox => {
                if let Some(handle) = self.overlays.close_dropbox() {
                    self.deferred.cancel(handle);
                }
            }
            _ => {
                self.overlays.close_active();
                self.store.select_node(None);
            }
        }
        tracing::debug!(?target, "[Overlay] closed by escape");
        Some(target)
    }

    // ---------------------------------------------------------------------
    // Clipboard
    // ---------------------------------------------------------------------

    fn editable_selection(&self) -> Result<NodeId, SessionError> {
        if self.config.view_only {
            return Err(ValidationError::ViewOnly.into());
        }
        Ok(self
            .store
            .selected()
            .cloned()
            .ok_or(ValidationError::NoSelection)?)
    }

    pub fn copy(&mut self) -> Result<(), SessionError> {
        let selected = self.editable_selection()?;
        let tree = capture_subtree(self.store.graph(), &selected, &self.config)?;
        tracing::info!(node = %selected, nodes = tree.len(), "[Clipboard] copied");
        self.clipboard.put(tree);
        Ok(())
    }

    pub fn cut(&mut self) -> Result<(), SessionError> {
        let selected = self.editable_selection()?;
        let tree = capture_subtree(self.store.graph(), &selected, &self.config)?;
        self.clipboard.put(tree);

        if let Err(e) = self.store.delete(&selected) {
            tracing::warn!(error = ?e, node = %selected, "[Clipboard] delete failed, hiding node");
            self.store.set_hidden(&selected, true)?;
        }
        self.store.select_node(None);
        tracing::info!(node = %selected, "[Clipboard] cut");
        Ok(())
    }

    /// Paste a fresh clone of the clipboard and return its root id. The new
    /// root becomes selected once the selection delay elapses.
    pub fn paste(&mut self) -> Result<NodeId, SessionError> {
        if self.config.view_only {
            return Err(ValidationError::ViewOnly.into());
        }
        let tree = self
            .clipboard
            .contents()
            .cloned()
            .ok_or(ValidationError::EmptyClipboard)?;
        let selection = self.editable_selection()?;

        let target = resolve_paste_target(
            self.store.graph(),
            self.overlays.active(),
            &selection,
            &self.config,
        );

        let offset = self.config.paste_offset;
        let store = &mut self.store;
        let clone = remap_tree(&tree, || store.fresh_id(), offset);
        let new_root = clone.root_node_id.clone();

        if let Err(e) = self.store.add_tree(clone, &target.parent, target.index) {
            tracing::warn!(
                error = ?e,
                parent = %target.parent,
                "[Clipboard] subtree insert failed, pasting root only"
            );
            let node = clone_root_only(&tree, new_root.clone(), offset).ok_or_else(|| {
                DocumentError::InvalidTree("clipboard tree has no root".to_string())
            })?;
            self.store.add(node, &target.parent, target.index)?;
        }

        self.store.select_node(None);
        self.cancel_pending_selection();
        self.pending_selection = Some(self.deferred.schedule(
            DeferredAction::SelectNode(new_root.clone()),
            self.config.selection_defer(),
        ));

        tracing::info!(node = %new_root, parent = %target.parent, "[Clipboard] pasted");
        Ok(new_root)
    }

    fn cancel_pending_selection(&mut self) {
        if let Some(handle) = self.pending_selection.take() {
            self.deferred.cancel(handle);
        }
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    pub fn is_at_initial_state(&self) -> bool {
        match self.store.serialize() {
            Ok(live) => self.baseline.is_at_initial_state(self.current_platform, &live),
            Err(e) => {
                tracing::warn!(error = ?e, "[History] cannot read live graph");
                false
            }
        }
    }

    /// Undo one step unless the live graph is still the loaded document
    pub fn undo(&mut self) -> Result<UndoOutcome, SessionError> {
        if self.is_at_initial_state() {
            tracing::debug!("[History] undo blocked at initial state");
            return Ok(UndoOutcome::AtInitialState);
        }
        if !self.store.can_undo() {
            return Ok(UndoOutcome::NothingToUndo);
        }
        self.store.undo()?;
        Ok(UndoOutcome::Undone)
    }

    pub fn redo(&mut self) -> Result<bool, SessionError> {
        if !self.store.can_redo() {
            return Ok(false);
        }
        Ok(self.store.redo()?)
    }

    /// Forget a platform's baseline so its next load captures a new one
    pub fn reset_baseline(&mut self, platform: Platform) {
        if let Some(handle) = self.baseline.reset(platform) {
            self.deferred.cancel(handle);
        }
    }

    // ---------------------------------------------------------------------
    // Keyboard
    // ---------------------------------------------------------------------

    pub fn handle_key(
        &mut self,
        chord: &KeyChord,
        focus: FocusScope,
    ) -> Result<ShortcutOutcome, SessionError> {
        let Some(command) = resolve_shortcut(chord, focus) else {
            return Ok(ShortcutOutcome::Ignored);
        };

        Ok(match command {
            EditorCommand::Copy => {
                self.copy()?;
                ShortcutOutcome::Copied
            }
            EditorCommand::Cut => {
                self.cut()?;
                ShortcutOutcome::Cut
            }
            EditorCommand::Paste => ShortcutOutcome::Pasted(self.paste()?),
            EditorCommand::Undo => ShortcutOutcome::Undo(self.undo()?),
            EditorCommand::Redo => ShortcutOutcome::Redone(self.redo()?),
            EditorCommand::Escape => match self.escape() {
                Some(target) => ShortcutOutcome::Closed(target),
                None => ShortcutOutcome::NothingToClose,
            },
        })
    }

    // ---------------------------------------------------------------------
    // Deferred actions
    // ---------------------------------------------------------------------

    /// Move the session clock forward and run every action now due
    pub fn advance(&mut self, elapsed: Duration) {
        for action in self.deferred.advance(elapsed) {
            self.apply_deferred(action);
        }
    }

    fn apply_deferred(&mut self, action: DeferredAction) {
        match action {
            DeferredAction::SelectNode(id) => {
                self.pending_selection = None;
                if self.store.contains(&id) {
                    self.store.select_node(Some(id));
                } else {
                    tracing::debug!(node = %id, "[Session] deferred selection target is gone");
                }
            }
            DeferredAction::CaptureBaseline(platform) => {
                if platform != self.current_platform || self.is_loading_content {
                    self.baseline.reset(platform);
                    return;
                }
                match self.store.serialize() {
                    Ok(snapshot) => {
                        self.baseline.capture(platform, snapshot);
                    }
                    Err(e) => {
                        tracing::warn!(error = ?e, %platform, "[History] baseline capture failed");
                        self.baseline.reset(platform);
                    }
                }
            }
            DeferredAction::CloseHoverDropbox => {
                self.overlays.close_dropbox();
            }
            DeferredAction::ResumeAutoSave => {
                self.auto_save_pause = None;
                tracing::debug!("[AutoSave] resumed");
            }
        }
    }

    /// Cancel every outstanding deferred action
    pub fn teardown(&mut self) {
        let cancelled = self.deferred.cancel_all();
        self.pending_selection = None;
        self.auto_save_pause = None;
        if let Some(handle) = self.overlays.close_all() {
            tracing::trace!(?handle, "[Session] hover timer dropped");
        }
        tracing::debug!(cancelled, "[Session] torn down");
    }
}

impl<S: SceneGraphStore, Y: PlatformSynchronizer> Drop for EditingSession<S, Y> {
    fn drop(&mut self) {
        self.teardown();
    }
}
