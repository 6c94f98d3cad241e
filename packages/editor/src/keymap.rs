//! Keyboard shortcuts for the editing canvas

use serde::{Deserialize, Serialize};

/// A key press with its modifiers, as reported by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Ctrl on most platforms, Cmd on macOS
    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Where keyboard focus currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusScope {
    Canvas,
    FormControl,
    Sidebar,
    Toolbar,
    Dialog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorCommand {
    Copy,
    Cut,
    Paste,
    Undo,
    Redo,
    Escape,
}

/// Map a key press to an editor command. Only the canvas receives shortcuts;
/// form controls and editor chrome keep their native key handling.
pub fn resolve_shortcut(chord: &KeyChord, focus: FocusScope) -> Option<EditorCommand> {
    if focus != FocusScope::Canvas || chord.alt {
        return None;
    }

    if chord.key == "Escape" {
        return Some(EditorCommand::Escape);
    }
    if !chord.command() {
        return None;
    }

    match (chord.key.to_ascii_lowercase().as_str(), chord.shift) {
        ("c", false) => Some(EditorCommand::Copy),
        ("x", false) => Some(EditorCommand::Cut),
        ("v", false) => Some(EditorCommand::Paste),
        ("z", false) => Some(EditorCommand::Undo),
        ("z", true) => Some(EditorCommand::Redo),
        ("y", false) if chord.ctrl => Some(EditorCommand::Redo),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipboard_shortcuts() {
        let canvas = FocusScope::Canvas;
        assert_eq!(
            resolve_shortcut(&KeyChord::new("c").ctrl(), canvas),
            Some(EditorCommand::Copy)
        );
        assert_eq!(
            resolve_shortcut(&KeyChord::new("x").meta(), canvas),
            Some(EditorCommand::Cut)
        );
        assert_eq!(
            resolve_shortcut(&KeyChord::new("V").ctrl(), canvas),
            Some(EditorCommand::Paste)
        );
        assert_eq!(resolve_shortcut(&KeyChord::new("c"), canvas), None);
    }

    #[test]
    fn test_history_shortcuts() {
        let canvas = FocusScope::Canvas;
        assert_eq!(
            resolve_shortcut(&KeyChord::new("z").meta(), canvas),
            Some(EditorCommand::Undo)
        );
        assert_eq!(
            resolve_shortcut(&KeyChord::new("Z").meta().shift(), canvas),
            Some(EditorCommand::Redo)
        );
        assert_eq!(
            resolve_shortcut(&KeyChord::new("y").ctrl(), canvas),
            Some(EditorCommand::Redo)
        );
        assert_eq!(resolve_shortcut(&KeyChord::new("y").meta(), canvas), None);
    }

    #[test]
    fn test_escape_needs_no_modifier() {
        assert_eq!(
            resolve_shortcut(&KeyChord::new("Escape"), FocusScope::Canvas),
            Some(EditorCommand::Escape)
        );
    }

    #[test]
    fn test_suppressed_outside_canvas() {
        for focus in [
            FocusScope::FormControl,
            FocusScope::Sidebar,
            FocusScope::Toolbar,
            FocusScope::Dialog,
        ] {
            assert_eq!(resolve_shortcut(&KeyChord::new("v").ctrl(), focus), None);
            assert_eq!(resolve_shortcut(&KeyChord::new("Escape"), focus), None);
        }
    }

    #[test]
    fn test_chord_from_json() {
        let chord: KeyChord = serde_json::from_str(r#"{"key":"z","meta":true}"#).unwrap();
        assert_eq!(chord, KeyChord::new("z").meta());
    }
}
