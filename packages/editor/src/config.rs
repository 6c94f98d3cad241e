use serde::{Deserialize, Serialize};
use std::time::Duration;

use pagecraft_document::{default_document, InMemoryStore};

use crate::SessionError;

/// How the undo baseline decides the live graph is still "as loaded"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineComparison {
    /// Structural JSON equality of the two serializations
    Strict,

    /// Also accept graphs whose node id sets match, regardless of content
    Tolerant,
}

/// Editing session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Offset added to a pasted root's `top` and `left`
    #[serde(default = "default_paste_offset")]
    pub paste_offset: f64,

    /// Delay between clearing and restoring selection after paste
    #[serde(default = "default_selection_defer_ms")]
    pub selection_defer_ms: u64,

    /// Delay between a platform load and its baseline capture
    #[serde(default = "default_baseline_capture_delay_ms")]
    pub baseline_capture_delay_ms: u64,

    /// Auto-save stays paused this long after a successful remote save
    #[serde(default = "default_post_save_resume_ms")]
    pub post_save_resume_ms: u64,

    /// Delay before a hovered dropbox closes on its own
    #[serde(default = "default_hover_close_delay_ms")]
    pub hover_close_delay_ms: u64,

    /// View-only sessions never save and reject editing actions
    #[serde(default)]
    pub view_only: bool,

    #[serde(default = "default_baseline_comparison")]
    pub baseline_comparison: BaselineComparison,

    /// Display types that copy/cut refuse (singleton overlay roots)
    #[serde(default = "default_non_duplicable_types")]
    pub non_duplicable_types: Vec<String>,

    /// Display types that act as paste containers
    #[serde(default = "default_section_types")]
    pub section_types: Vec<String>,

    /// Undo history depth of stores built by [`SessionConfig::in_memory_store`]
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
}

fn default_paste_offset() -> f64 {
    20.0
}

fn default_selection_defer_ms() -> u64 {
    50
}

fn default_baseline_capture_delay_ms() -> u64 {
    100
}

fn default_post_save_resume_ms() -> u64 {
    500
}

fn default_hover_close_delay_ms() -> u64 {
    300
}

fn default_baseline_comparison() -> BaselineComparison {
    BaselineComparison::Strict
}

fn default_non_duplicable_types() -> Vec<String> {
    ["Popup", "DropboxEditor", "LightBox", "AlbumModal"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_section_types() -> Vec<String> {
    vec![pagecraft_document::SECTION_TYPE.to_string()]
}

fn default_history_depth() -> usize {
    100
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn selection_defer(&self) -> Duration {
        Duration::from_millis(self.selection_defer_ms)
    }

    pub fn baseline_capture_delay(&self) -> Duration {
        Duration::from_millis(self.baseline_capture_delay_ms)
    }

    pub fn post_save_resume(&self) -> Duration {
        Duration::from_millis(self.post_save_resume_ms)
    }

    pub fn hover_close_delay(&self) -> Duration {
        Duration::from_millis(self.hover_close_delay_ms)
    }

    /// A blank in-memory store whose history keeps `history_depth` steps
    pub fn in_memory_store(&self) -> InMemoryStore {
        InMemoryStore::with_history_depth(default_document(), self.history_depth)
    }

    pub fn is_non_duplicable(&self, display_type: &str) -> bool {
        self.non_duplicable_types.iter().any(|t| t == display_type)
    }

    pub fn is_section(&self, display_type: &str) -> bool {
        self.section_types.iter().any(|t| t == display_type)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            paste_offset: default_paste_offset(),
            selection_defer_ms: default_selection_defer_ms(),
            baseline_capture_delay_ms: default_baseline_capture_delay_ms(),
            post_save_resume_ms: default_post_save_resume_ms(),
            hover_close_delay_ms: default_hover_close_delay_ms(),
            view_only: false,
            baseline_comparison: default_baseline_comparison(),
            non_duplicable_types: default_non_duplicable_types(),
            section_types: default_section_types(),
            history_depth: default_history_depth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_document::{Node, NodeData, SceneGraphStore, DEFAULT_SECTION_ID};

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "pasteOffset": 10,
            "viewOnly": true,
            "baselineComparison": "tolerant",
            "sectionTypes": ["Section", "Stripe"]
        }"#;

        let config = SessionConfig::from_json(json).unwrap();
        assert_eq!(config.paste_offset, 10.0);
        assert!(config.view_only);
        assert_eq!(config.baseline_comparison, BaselineComparison::Tolerant);
        assert!(config.is_section("Stripe"));
        assert_eq!(config.selection_defer_ms, 50);
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.paste_offset, 20.0);
        assert!(!config.view_only);
        assert_eq!(config.baseline_comparison, BaselineComparison::Strict);
        assert!(config.is_non_duplicable("Popup"));
        assert!(!config.is_non_duplicable("Button"));
    }

    #[test]
    fn test_empty_json_matches_default() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config.history_depth, SessionConfig::default().history_depth);
        assert_eq!(config.non_duplicable_types, default_non_duplicable_types());
    }

    #[test]
    fn test_store_history_follows_config() {
        let config = SessionConfig::from_json(r#"{"historyDepth": 2}"#).unwrap();
        let mut store = config.in_memory_store();
        for id in ["a", "b", "c"] {
            store
                .add(
                    Node::new(id, NodeData::new("Text")),
                    &DEFAULT_SECTION_ID.into(),
                    None,
                )
                .unwrap();
        }
        assert_eq!(store.history().undo_levels(), 2);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        assert!(matches!(
            SessionConfig::from_json(r#"{"pasteOffset": "far"}"#),
            Err(SessionError::Config(_))
        ));
    }
}
