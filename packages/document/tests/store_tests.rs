//! Integration tests for the in-memory scene graph store

use pagecraft_document::{
    DocumentError, InMemoryStore, Node, NodeData, NodeId, NodeTree, SceneGraph, SceneGraphStore,
};

fn invitation() -> SceneGraph {
    SceneGraph::from_nodes(vec![
        Node::new("ROOT", NodeData::new("Container")).with_children(["hero", "details"]),
        Node::new("hero", NodeData::new("Section")).with_children(["title", "rsvp"]),
        Node::new("details", NodeData::new("Section")),
        Node::new("title", NodeData::new("Text").with_prop("body", "We're getting married")),
        Node::new("rsvp", NodeData::new("Button"))
            .with_linked("text", "rsvp-text")
            .with_linked("icon", "rsvp-icon"),
        Node::new("rsvp-text", NodeData::new("Text").with_prop("body", "RSVP")),
        Node::new("rsvp-icon", NodeData::new("Icon").with_prop("name", "heart")),
    ])
    .unwrap()
}

#[test]
fn test_add_tree_is_one_undo_step() -> anyhow::Result<()> {
    let mut store = InMemoryStore::new(invitation());
    let before = store.serialize()?;

    let tree = NodeTree {
        root_node_id: "gallery".into(),
        nodes: [
            (
                NodeId::from("gallery"),
                Node::new("gallery", NodeData::new("Gallery")).with_children(["photo"]),
            ),
            (NodeId::from("photo"), Node::new("photo", NodeData::new("Image"))),
        ]
        .into_iter()
        .collect(),
    };

    store.add_tree(tree, &"details".into(), Some(0))?;
    assert_eq!(
        store.get(&"photo".into()).and_then(|n| n.parent.clone()),
        Some(NodeId::from("gallery"))
    );

    assert!(store.undo()?);
    assert_eq!(store.serialize()?, before);
    assert!(!store.can_undo());
    assert!(store.can_redo());
    Ok(())
}

#[test]
fn test_add_tree_rejects_open_trees() {
    let mut store = InMemoryStore::new(invitation());

    let tree = NodeTree::single(Node::new("card", NodeData::new("Card")).with_children(["missing"]));
    let result = store.add_tree(tree, &"details".into(), None);

    assert!(matches!(result, Err(DocumentError::InvalidTree(_))));
    assert!(!store.can_undo());
}

#[test]
fn test_delete_root_is_refused() {
    let mut store = InMemoryStore::new(invitation());
    assert_eq!(store.delete(&NodeId::root()), Err(DocumentError::CannotDeleteRoot));
}

#[test]
fn test_deserialize_rejects_invalid_snapshot_and_keeps_graph() -> anyhow::Result<()> {
    let mut store = InMemoryStore::new(invitation());
    let before = store.serialize()?;

    let broken = r#"{"ROOT":{"id":"ROOT","type":"Container","children":["ghost"]}}"#;
    assert!(store.deserialize(broken).is_err());
    assert_eq!(store.serialize()?, before);

    assert!(store.deserialize("not json").is_err());
    assert_eq!(store.serialize()?, before);
    Ok(())
}

#[test]
fn test_parse_serialized_node() -> anyhow::Result<()> {
    let store = InMemoryStore::new(invitation());
    let node = store.parse_serialized_node(serde_json::json!({
        "id": "n1",
        "type": "Text",
        "props": { "body": "Hi" },
        "custom": { "customId": "greeting" }
    }))?;

    assert_eq!(node.id, NodeId::from("n1"));
    assert_eq!(node.custom_id(), Some("greeting"));
    assert!(node.children.is_empty());
    Ok(())
}
