//! Rules applied to a node at the moment it closes. Open nodes are never
//! inspected here.

use crate::error::ValidationError;
use crate::options::ValidatorOptions;
use crate::tree::{Node, NodeId, NodeKind, Tree};

pub(crate) fn closing_errors(
    tree: &Tree,
    id: NodeId,
    closing_line: Option<usize>,
    options: &ValidatorOptions,
) -> Vec<ValidationError> {
    let node = tree.node(id);
    let mut errors = Vec::new();

    if node.is_pending_slot() {
        let key = node.key_or_marker.as_deref().unwrap_or_default();
        errors.push(ValidationError::grammar(
            closing_line.unwrap_or(node.line_no),
            format!("key '{key}' has no value"),
        ));
    }

    if node.block.is_some() {
        errors.extend(block_body_errors(node));
    } else if options.strict_sibling_homogeneity {
        errors.extend(mixed_siblings(node));
    }

    errors
}

/// Children must be uniformly mapping entries or uniformly sequence items.
fn mixed_siblings(node: &Node) -> Option<ValidationError> {
    let (first_kind, first_line) = node.stats.first_entry?;
    let (stray_kind, stray_line) = node.stats.stray_entry?;
    Some(ValidationError::structure(
        stray_line,
        format!(
            "{} mixed with {} from line {} under the same parent",
            describe(stray_kind),
            describe(first_kind),
            first_line
        ),
    ))
}

/// Every body line must sit at or beyond the body indent, which the
/// indentation indicator fixes when present and the first body line otherwise.
fn block_body_errors(owner: &Node) -> Vec<ValidationError> {
    let Some(body_indent) = owner.stats.body_indent else {
        return Vec::new();
    };
    owner
        .stats
        .shallow_body_lines
        .iter()
        .map(|&(line_no, indent)| {
            ValidationError::indent(
                line_no,
                format!(
                    "block scalar line indented {indent} but the body started at indent {body_indent}"
                ),
            )
        })
        .collect()
}

fn describe(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Mapping => "mapping entry",
        NodeKind::Sequence => "sequence item",
        NodeKind::ScalarLeaf => "scalar",
        NodeKind::BlockScalar => "block scalar line",
        NodeKind::Document => "document",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::scalar::parse_block_header;
    use pretty_assertions::assert_eq;

    #[test]
    fn pending_slot_reports_at_closing_line() {
        let mut tree = Tree::new();
        let doc = tree.open_document(1);
        let foo = tree.add_child(doc, Node::new(NodeKind::Mapping, 0, 1).with_key("foo"));

        let errors = closing_errors(&tree, foo, Some(2), &ValidatorOptions::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Grammar);
        assert_eq!(errors[0].line_no, 2);
        assert_eq!(errors[0].message, "key 'foo' has no value");

        let errors = closing_errors(&tree, foo, None, &ValidatorOptions::default());
        assert_eq!(errors[0].line_no, 1);
    }

    #[test]
    fn mixed_children_are_reported_once() {
        let mut tree = Tree::new();
        let doc = tree.open_document(1);
        let parent = tree.add_child(doc, Node::new(NodeKind::Mapping, 0, 1).with_key("a"));
        tree.add_child(parent, Node::new(NodeKind::Mapping, 2, 2).with_key("b").with_value("1"));
        tree.add_child(parent, Node::new(NodeKind::Sequence, 2, 3).with_key("-").with_value("c"));
        tree.add_child(parent, Node::new(NodeKind::Sequence, 2, 4).with_key("-").with_value("d"));

        let errors = closing_errors(&tree, parent, Some(5), &ValidatorOptions::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Structure);
        assert_eq!(errors[0].line_no, 3);

        let lenient = ValidatorOptions {
            strict_sibling_homogeneity: false,
            ..ValidatorOptions::default()
        };
        assert!(closing_errors(&tree, parent, Some(5), &lenient).is_empty());
    }

    #[test]
    fn block_body_must_not_dedent_below_first_line() {
        let mut tree = Tree::new();
        let doc = tree.open_document(1);
        let mut owner = Node::new(NodeKind::Mapping, 0, 1).with_key("text").with_value("|");
        owner.block = Some(parse_block_header("|", 1).unwrap());
        let owner = tree.add_child(doc, owner);
        tree.add_child(owner, Node::new(NodeKind::BlockScalar, 4, 2).with_value("deep"));
        tree.add_child(owner, Node::new(NodeKind::BlockScalar, 2, 3).with_value("shallow"));

        let errors = closing_errors(&tree, owner, Some(4), &ValidatorOptions::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Indent);
        assert_eq!(errors[0].line_no, 3);
    }

    #[test]
    fn indentation_indicator_fixes_body_indent() {
        let mut tree = Tree::new();
        let doc = tree.open_document(1);
        let mut owner = Node::new(NodeKind::Mapping, 0, 1).with_key("text").with_value("|4");
        owner.block = Some(parse_block_header("|4", 1).unwrap());
        let owner = tree.add_child(doc, owner);
        tree.add_child(owner, Node::new(NodeKind::BlockScalar, 2, 2).with_value("short"));

        let errors = closing_errors(&tree, owner, None, &ValidatorOptions::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line_no, 2);
    }
}
