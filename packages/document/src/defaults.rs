use crate::{Node, NodeData, NodeId, SceneGraph};

/// Id of the section in a synthesized default document
pub const DEFAULT_SECTION_ID: &str = "default-section";

/// Type tag of page sections
pub const SECTION_TYPE: &str = "Section";

/// A blank page: the root container holding one empty section.
///
/// Used whenever a platform has no stored content yet.
pub fn default_document() -> SceneGraph {
    let mut graph = SceneGraph::with_root(Node::new(
        NodeId::root(),
        NodeData::new("Container").with_prop("background", "#ffffff"),
    ));

    let section = Node::new(
        DEFAULT_SECTION_ID,
        NodeData::new(SECTION_TYPE)
            .with_prop("height", 800)
            .with_prop("padding", 0),
    );

    // Inserting one childless node under an existing root cannot fail
    if let Err(e) = graph.insert_node(section, &NodeId::root(), None) {
        tracing::error!(error = %e, "failed to build default document");
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_has_one_section() {
        let graph = default_document();
        graph.validate().unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.root().children, vec![NodeId::from(DEFAULT_SECTION_ID)]);
        assert_eq!(
            graph.get(&DEFAULT_SECTION_ID.into()).unwrap().type_name(),
            SECTION_TYPE
        );
    }
}
