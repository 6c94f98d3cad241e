//! # Cross-Platform Synchronization
//!
//! The desktop and mobile variants of a page are separate scene graphs.
//! A synchronizer reconciles them after one side has been edited. The
//! session treats it as a collaborator: its errors are reported, never
//! fatal, and a result that would drop existing content is refused.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use pagecraft_document::{NodeId, SceneGraph};

use crate::{Platform, PlatformContent};

/// Props that stay per-platform when content is mirrored
pub const LAYOUT_PROPS: [&str; 4] = ["top", "left", "width", "height"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("Cannot read {platform} content: {message}")]
    InvalidContent { platform: Platform, message: String },

    #[error("Sync would discard existing {0} content")]
    ContentLost(Platform),

    #[error("Synchronizer failed: {0}")]
    Failed(String),
}

pub trait PlatformSynchronizer {
    /// Reconcile both snapshots, treating `source` as the edited side
    fn bidirectional_sync(
        &self,
        desktop: Option<&str>,
        mobile: Option<&str>,
        source: Platform,
    ) -> Result<PlatformContent, SyncError>;

    fn convert_desktop_content_to_mobile(&self, desktop: &str) -> Result<String, SyncError>;

    /// True when the node structure differs, ignoring props
    fn has_structural_changes(&self, before: &str, after: &str) -> bool;
}

/// Mirrors props between nodes that share a stable custom identifier
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorSynchronizer;

impl MirrorSynchronizer {
    pub fn new() -> Self {
        Self
    }
}

fn parse(platform: Platform, snapshot: &str) -> Result<SceneGraph, SyncError> {
    SceneGraph::from_snapshot(snapshot).map_err(|e| SyncError::InvalidContent {
        platform,
        message: e.to_string(),
    })
}

fn render(graph: &SceneGraph) -> Result<String, SyncError> {
    graph
        .to_snapshot()
        .map_err(|e| SyncError::Failed(e.to_string()))
}

/// Source props with the target's own layout values kept
fn mirrored_props(source: &Map<String, Value>, target: &Map<String, Value>) -> Map<String, Value> {
    let mut props: Map<String, Value> = source
        .iter()
        .filter(|(key, _)| !LAYOUT_PROPS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for key in LAYOUT_PROPS {
        if let Some(value) = target.get(key) {
            props.insert(key.to_string(), value.clone());
        }
    }
    props
}

impl PlatformSynchronizer for MirrorSynchronizer {
    fn bidirectional_sync(
        &self,
        desktop: Option<&str>,
        mobile: Option<&str>,
        source: Platform,
    ) -> Result<PlatformContent, SyncError> {
        let content = PlatformContent::new(desktop.map(String::from), mobile.map(String::from));
        let target = source.other();
        let (source_snapshot, target_snapshot) = match source {
            Platform::Desktop => (desktop, mobile),
            Platform::Mobile => (mobile, desktop),
        };

        let (Some(source_snapshot), Some(target_snapshot)) = (source_snapshot, target_snapshot) else {
            return Ok(content);
        };

        let source_graph = parse(source, source_snapshot)?;
        let mut target_graph = parse(target, target_snapshot)?;

        let by_custom_id: BTreeMap<&str, &Map<String, Value>> = source_graph
            .nodes()
            .filter_map(|n| n.custom_id().map(|custom| (custom, &n.data.props)))
            .collect();

        let matched: Vec<(NodeId, Map<String, Value>)> = target_graph
            .nodes()
            .filter_map(|n| {
                let source_props = by_custom_id.get(n.custom_id()?)?;
                let props = mirrored_props(source_props, &n.data.props);
                (props != n.data.props).then(|| (n.id.clone(), props))
            })
            .collect();

        if matched.is_empty() {
            return Ok(content);
        }

        tracing::debug!(%source, updated = matched.len(), "mirroring props across platforms");
        for (id, props) in matched {
            if let Some(node) = target_graph.get_mut(&id) {
                node.data.props = props;
            }
        }

        let mut reconciled = content;
        reconciled.set(target, render(&target_graph)?);
        Ok(reconciled)
    }

    fn convert_desktop_content_to_mobile(&self, desktop: &str) -> Result<String, SyncError> {
        let mut graph = parse(Platform::Desktop, desktop)?;
        let ids: Vec<NodeId> = graph.nodes().map(|n| n.id.clone()).collect();
        for id in ids {
            if let Some(node) = graph.get_mut(&id) {
                node.data.props.remove("top");
                node.data.props.remove("left");
            }
        }
        render(&graph)
    }

    fn has_structural_changes(&self, before: &str, after: &str) -> bool {
        let (Ok(before), Ok(after)) = (
            SceneGraph::from_snapshot(before),
            SceneGraph::from_snapshot(after),
        ) else {
            return true;
        };

        let shape = |graph: &SceneGraph| -> Vec<(NodeId, Vec<NodeId>, Vec<NodeId>)> {
            graph
                .nodes()
                .map(|n| {
                    (
                        n.id.clone(),
                        n.children.clone(),
                        n.linked_nodes.values().cloned().collect(),
                    )
                })
                .collect()
        };

        shape(&before) != shape(&after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_document::{Node, NodeData};

    fn page(title: &str, top: i64) -> String {
        SceneGraph::from_nodes(vec![
            Node::new("ROOT", NodeData::new("Container")).with_children(["s"]),
            Node::new("s", NodeData::new("Section")).with_children(["t"]),
            Node::new(
                "t",
                NodeData::new("Text")
                    .with_custom_id("title")
                    .with_prop("text", title)
                    .with_prop("top", top),
            ),
        ])
        .unwrap()
        .to_snapshot()
        .unwrap()
    }

    #[test]
    fn test_source_props_flow_to_other_platform() {
        let sync = MirrorSynchronizer::new();
        let desktop = page("Anna & Ben", 10);
        let mobile = page("Save the date", 400);

        let result = sync
            .bidirectional_sync(Some(&desktop), Some(&mobile), Platform::Desktop)
            .unwrap();

        assert_eq!(result.desktop.as_deref(), Some(desktop.as_str()));
        let mobile = SceneGraph::from_snapshot(result.mobile.as_deref().unwrap()).unwrap();
        let title = mobile.get(&"t".into()).unwrap();
        assert_eq!(title.prop("text"), Some(&Value::from("Anna & Ben")));
        assert_eq!(title.prop("top"), Some(&Value::from(400)));
    }

    #[test]
    fn test_missing_counterpart_stays_empty() {
        let sync = MirrorSynchronizer::new();
        let desktop = page("Anna & Ben", 10);

        let result = sync
            .bidirectional_sync(Some(&desktop), None, Platform::Desktop)
            .unwrap();
        assert_eq!(result.mobile, None);
        assert_eq!(result.desktop, Some(desktop));
    }

    #[test]
    fn test_unchanged_content_is_returned_verbatim() {
        let sync = MirrorSynchronizer::new();
        let desktop = page("Same", 10);
        let mobile = page("Same", 99);

        let result = sync
            .bidirectional_sync(Some(&desktop), Some(&mobile), Platform::Mobile)
            .unwrap();
        assert_eq!(result.mobile, Some(mobile));
        assert_eq!(result.desktop, Some(desktop));
    }

    #[test]
    fn test_invalid_content_is_an_error() {
        let sync = MirrorSynchronizer::new();
        let result = sync.bidirectional_sync(Some("{"), Some(&page("x", 0)), Platform::Desktop);
        assert!(matches!(
            result,
            Err(SyncError::InvalidContent {
                platform: Platform::Desktop,
                ..
            })
        ));
    }

    #[test]
    fn test_convert_drops_absolute_position() {
        let sync = MirrorSynchronizer::new();
        let mobile = sync
            .convert_desktop_content_to_mobile(&page("Anna & Ben", 10))
            .unwrap();
        let graph = SceneGraph::from_snapshot(&mobile).unwrap();
        assert_eq!(graph.get(&"t".into()).unwrap().prop("top"), None);
    }

    #[test]
    fn test_structural_changes_ignore_props() {
        let sync = MirrorSynchronizer::new();
        assert!(!sync.has_structural_changes(&page("a", 1), &page("b", 2)));

        let other = SceneGraph::from_nodes(vec![
            Node::new("ROOT", NodeData::new("Container")).with_children(["s"]),
            Node::new("s", NodeData::new("Section")),
        ])
        .unwrap()
        .to_snapshot()
        .unwrap();
        assert!(sync.has_structural_changes(&page("a", 1), &other));
        assert!(sync.has_structural_changes("not json", &other));
    }
}
