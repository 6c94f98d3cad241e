//! # Scene graph nodes
//!
//! A node is one addressable element of a page: a section, a button, a
//! text block. Nodes refer to each other only by id. `children` holds the
//! ordered visual children, `linked_nodes` holds auxiliary nodes owned by
//! the node but rendered by it directly (a button's text and icon).
//!
//! `parent` is a back-reference kept for consumers that want it. Traversal
//! never trusts it; the graph recomputes it after every structural change.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::graph::validate_structure;
use crate::DocumentError;

/// Id of the document root in every scene graph
pub const ROOT_NODE_ID: &str = "ROOT";

/// Key in `custom` holding the user-assigned stable identifier
pub const CUSTOM_ID_KEY: &str = "customId";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn root() -> Self {
        Self(ROOT_NODE_ID.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_NODE_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Everything about a node except its place in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Component type tag ("Section", "Button", "Text", ...)
    #[serde(rename = "type")]
    pub type_name: String,

    /// Display type shown in the editor, when it differs from the type tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub props: Map<String, Value>,

    #[serde(default)]
    pub custom: Map<String, Value>,

    /// Hidden nodes are kept in the graph but neither rendered nor interactive
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl NodeData {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            display_name: None,
            props: Map::new(),
            custom: Map::new(),
            hidden: false,
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom
            .insert(CUSTOM_ID_KEY.to_string(), Value::String(custom_id.into()));
        self
    }

    /// The type used for editor decisions (display name wins over type tag)
    pub fn display_type(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.type_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    #[serde(flatten)]
    pub data: NodeData,

    #[serde(default)]
    pub children: Vec<NodeId>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub linked_nodes: BTreeMap<String, NodeId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, data: NodeData) -> Self {
        Self {
            id: id.into(),
            data,
            children: Vec::new(),
            linked_nodes: BTreeMap::new(),
            parent: None,
        }
    }

    pub fn with_children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_linked(mut self, name: impl Into<String>, id: impl Into<NodeId>) -> Self {
        self.linked_nodes.insert(name.into(), id.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.data.type_name
    }

    pub fn display_type(&self) -> &str {
        self.data.display_type()
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.data.props.get(key)
    }

    /// User-assigned stable identifier, if any
    pub fn custom_id(&self) -> Option<&str> {
        self.data.custom.get(CUSTOM_ID_KEY).and_then(Value::as_str)
    }

    /// Ids this node owns: children first, then linked nodes
    pub fn owned_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.children.iter().chain(self.linked_nodes.values())
    }
}

/// Detached subtree: a root plus every node reachable from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTree {
    pub root_node_id: NodeId,
    pub nodes: BTreeMap<NodeId, Node>,
}

impl NodeTree {
    pub fn single(node: Node) -> Self {
        let root_node_id = node.id.clone();
        let mut nodes = BTreeMap::new();
        nodes.insert(root_node_id.clone(), node);
        Self { root_node_id, nodes }
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(&self.root_node_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check the tree is closed, acyclic and fully reachable from its root
    pub fn validate(&self) -> Result<(), DocumentError> {
        validate_structure(&self.root_node_id, &self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_serialization_shape() {
        let node = Node::new(
            "btn-1",
            NodeData::new("Button")
                .with_prop("top", 10)
                .with_custom_id("rsvp-button"),
        )
        .with_linked("text", "btn-1-text");

        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "Button");
        assert_eq!(json["props"]["top"], 10);
        assert_eq!(json["linkedNodes"]["text"], "btn-1-text");
        assert!(json.get("hidden").is_none());
        assert_eq!(node.custom_id(), Some("rsvp-button"));
    }

    #[test]
    fn test_props_keep_insertion_order() {
        let data = NodeData::new("Text")
            .with_prop("zIndex", 2)
            .with_prop("align", "center")
            .with_prop("body", "Save the date");

        let keys: Vec<&str> = data.props.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zIndex", "align", "body"]);
    }

    #[test]
    fn test_display_type_prefers_display_name() {
        let data = NodeData::new("Container").with_display_name("Popup");
        assert_eq!(data.display_type(), "Popup");
        assert_eq!(NodeData::new("Text").display_type(), "Text");
    }
}
