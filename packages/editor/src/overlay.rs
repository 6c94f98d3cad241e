//! # Overlays
//!
//! Modal-like editing surfaces that sit above the page.
//!
//! At most one overlay is open at a time. The only transitions are
//! `None → X` and `X → None`; opening a second overlay always closes the
//! first one before the new one is set. A hovered dropbox preview is not an
//! overlay and can coexist with one, but it is closed together with them.

use serde::{Deserialize, Serialize};

use pagecraft_document::NodeId;

use crate::DeferredHandle;

/// Payload of a lightbox opened from a gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightBoxEvent {
    pub gallery_id: NodeId,
    pub images: Vec<String>,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum Overlay {
    Popup(NodeId),
    DropboxEditor(NodeId),
    LightBox(LightBoxEvent),
    AlbumModal(NodeId),
}

impl Overlay {
    /// Root node that paste targets while this overlay is open
    pub fn modal_root(&self) -> Option<&NodeId> {
        match self {
            Overlay::Popup(id) | Overlay::DropboxEditor(id) => Some(id),
            Overlay::LightBox(_) | Overlay::AlbumModal(_) => None,
        }
    }

    /// Node that becomes selected when this overlay opens
    pub fn selects(&self) -> Option<&NodeId> {
        match self {
            Overlay::DropboxEditor(id) => Some(id),
            _ => None,
        }
    }

    pub fn escape_target(&self) -> EscapeTarget {
        match self {
            Overlay::LightBox(_) => EscapeTarget::LightBox,
            Overlay::Popup(_) => EscapeTarget::Popup,
            Overlay::DropboxEditor(_) => EscapeTarget::DropboxEditor,
            Overlay::AlbumModal(_) => EscapeTarget::AlbumModal,
        }
    }
}

/// What Escape closes, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EscapeTarget {
    LightBox,
    Popup,
    DropboxEditor,
    AlbumModal,
    Dropbox,
}

#[derive(Debug, Default)]
pub struct Overlays {
    active: Option<Overlay>,
    hovered_dropbox: Option<NodeId>,
    hover_close: Option<DeferredHandle>,
}

impl Overlays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&Overlay> {
        self.active.as_ref()
    }

    pub fn hovered_dropbox(&self) -> Option<&NodeId> {
        self.hovered_dropbox.as_ref()
    }

    /// Set the active overlay. Callers must have closed everything first.
    pub(crate) fn open(&mut self, overlay: Overlay) {
        debug_assert!(self.active.is_none(), "overlay opened without closing first");
        self.active = Some(overlay);
    }

    /// Close every overlay and the dropbox preview, returning the hover
    /// timer that must be cancelled
    pub(crate) fn close_all(&mut self) -> Option<DeferredHandle> {
        self.active = None;
        self.hovered_dropbox = None;
        self.hover_close.take()
    }

    /// Close the active overlay only, leaving a dropbox preview open
    pub(crate) fn close_active(&mut self) -> Option<Overlay> {
        self.active.take()
    }

    pub(crate) fn hover(&mut self, id: NodeId) -> Option<DeferredHandle> {
        self.hovered_dropbox = Some(id);
        self.hover_close.take()
    }

    pub(crate) fn arm_hover_close(&mut self, handle: DeferredHandle) -> Option<DeferredHandle> {
        self.hover_close.replace(handle)
    }

    pub(crate) fn close_dropbox(&mut self) -> Option<DeferredHandle> {
        self.hovered_dropbox = None;
        self.hover_close.take()
    }

    /// The surface Escape should close, by priority
    pub fn escape_target(&self) -> Option<EscapeTarget> {
        let modal = self.active.as_ref().map(Overlay::escape_target);
        let dropbox = self.hovered_dropbox.as_ref().map(|_| EscapeTarget::Dropbox);
        modal.into_iter().chain(dropbox).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_priority_order() {
        assert!(EscapeTarget::LightBox < EscapeTarget::Popup);
        assert!(EscapeTarget::Popup < EscapeTarget::DropboxEditor);
        assert!(EscapeTarget::DropboxEditor < EscapeTarget::Dropbox);
    }

    #[test]
    fn test_escape_prefers_overlay_over_dropbox_preview() {
        let mut overlays = Overlays::new();
        overlays.hover("dropbox-1".into());
        assert_eq!(overlays.escape_target(), Some(EscapeTarget::Dropbox));

        overlays.open(Overlay::Popup("popup-1".into()));
        assert_eq!(overlays.escape_target(), Some(EscapeTarget::Popup));
    }

    #[test]
    fn test_close_all_returns_hover_timer() {
        let mut queue = crate::DeferredQueue::new();
        let mut overlays = Overlays::new();

        overlays.hover("dropbox-1".into());
        let handle = queue.schedule(
            crate::DeferredAction::CloseHoverDropbox,
            std::time::Duration::from_millis(300),
        );
        overlays.arm_hover_close(handle);

        assert_eq!(overlays.close_all(), Some(handle));
        assert_eq!(overlays.hovered_dropbox(), None);
        assert_eq!(overlays.escape_target(), None);
    }

    #[test]
    fn test_modal_root_only_for_popup_and_dropbox_editor() {
        assert!(Overlay::Popup("p".into()).modal_root().is_some());
        assert!(Overlay::DropboxEditor("d".into()).modal_root().is_some());
        assert!(Overlay::AlbumModal("a".into()).modal_root().is_none());
        assert_eq!(Overlay::DropboxEditor("d".into()).selects(), Some(&"d".into()));
    }

    #[test]
    fn test_overlay_serializes_with_kind_tag() {
        let json = serde_json::to_value(Overlay::Popup("popup-7".into())).unwrap();
        assert_eq!(json["kind"], "popup");
        assert_eq!(json["payload"], "popup-7");
    }
}
