//! # Deferred Actions
//!
//! Fixed-delay continuations for the editing session.
//!
//! The session never sleeps. Steps that must happen "a moment later"
//! (restoring selection after a paste, capturing the undo baseline once a
//! load has settled) are scheduled here and handed back to the session when
//! the host advances the clock. Every scheduled step has a handle that can
//! be cancelled, and the session cancels everything outstanding on teardown.

use std::time::Duration;

use pagecraft_document::NodeId;

use crate::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeferredHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    /// Select a node once the clear-selection step has rendered
    SelectNode(NodeId),

    /// Capture the undo baseline of a freshly loaded platform
    CaptureBaseline(Platform),

    /// Close the hovered (non-modal) dropbox
    CloseHoverDropbox,

    /// Lift the post-save auto-save pause
    ResumeAutoSave,
}

#[derive(Debug)]
struct Entry {
    handle: DeferredHandle,
    due: Duration,
    action: DeferredAction,
}

/// Queue of pending continuations on a virtual monotonic clock
#[derive(Debug, Default)]
pub struct DeferredQueue {
    now: Duration,
    next_handle: u64,
    entries: Vec<Entry>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, action: DeferredAction, delay: Duration) -> DeferredHandle {
        self.next_handle += 1;
        let handle = DeferredHandle(self.next_handle);
        tracing::trace!(?handle, ?action, ?delay, "deferred action scheduled");
        self.entries.push(Entry {
            handle,
            due: self.now + delay,
            action,
        });
        handle
    }

    /// Cancel one pending action. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, handle: DeferredHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        before != self.entries.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.entries.len();
        self.entries.clear();
        cancelled
    }

    /// Move the clock forward and return every action now due,
    /// earliest first (ties keep scheduling order)
    pub fn advance(&mut self, elapsed: Duration) -> Vec<DeferredAction> {
        self.now += elapsed;
        let now = self.now;

        let (mut due, pending): (Vec<Entry>, Vec<Entry>) =
            std::mem::take(&mut self.entries)
                .into_iter()
                .partition(|e| e.due <= now);
        self.entries = pending;

        due.sort_by_key(|e| (e.due, e.handle));
        due.into_iter().map(|e| e.action).collect()
    }

    pub fn is_pending(&self, handle: DeferredHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn now(&self) -> Duration {
        self.now
    }
}
