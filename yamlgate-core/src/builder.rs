//! Document tree builder.
//!
//! Interprets a content line as a sequence item, a mapping entry or a bare
//! scalar and attaches the resulting node(s) under the owner chosen by the
//! automaton. One line can open several nodes (`- - key: value`).

use crate::error::ValidationError;
use crate::line::Line;
use crate::machine::{BlockBody, Placement, Validator};
use crate::scalar::{
    check_key, check_scalar, find_mapping_indicator, looks_like_block_header, looks_like_seq,
    parse_block_header,
};
use crate::tree::{Node, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape<'a> {
    /// `- rest`, where `rest` starts `offset` columns after the dash.
    SeqItem { rest: &'a str, offset: usize },
    Entry { key: &'a str, value: &'a str },
    Scalar(&'a str),
}

pub fn classify(content: &str) -> Shape<'_> {
    if looks_like_seq(content) {
        let after = &content[1..];
        let rest = after.trim_start();
        return Shape::SeqItem {
            rest,
            offset: 1 + after.len() - rest.len(),
        };
    }
    if let Some(pos) = find_mapping_indicator(content) {
        return Shape::Entry {
            key: content[..pos].trim_end(),
            value: content[pos + 1..].trim(),
        };
    }
    Shape::Scalar(content)
}

impl Validator {
    pub(crate) fn attach_line(&mut self, placement: Placement, line: &Line<'_>) {
        let line_no = line.line_no;
        let mut parent = placement.parent;
        let mut realign = placement.realign;
        let mut column = line.indent;
        let mut content = line.content;

        loop {
            match classify(content) {
                Shape::SeqItem { rest, offset } => {
                    let mut item = Node::new(NodeKind::Sequence, column, line_no).with_key("-");
                    if let Some(err) = self.sequence_context_error(parent, line_no) {
                        self.record(err);
                        item.rejected = true;
                    }
                    let id = self.attach(parent, item, realign);
                    self.push_frame(column, id);

                    if rest.is_empty() {
                        return;
                    }
                    if let Shape::Scalar(value) = classify(rest) {
                        self.set_value(id, value, column, line_no);
                        return;
                    }
                    parent = id;
                    column += offset;
                    content = rest;
                    realign = false;
                }
                Shape::Entry { key, value } => {
                    if let Err(err) = check_key(key, line_no) {
                        self.record(err);
                    }
                    let entry = Node::new(NodeKind::Mapping, column, line_no).with_key(key);
                    let id = self.attach(parent, entry, realign);
                    self.push_frame(column, id);
                    if !value.is_empty() {
                        self.set_value(id, value, column, line_no);
                    }
                    return;
                }
                Shape::Scalar(text) => {
                    self.attach_scalar(parent, column, text, line_no, realign);
                    return;
                }
            }
        }
    }

    fn attach(&mut self, parent: NodeId, mut node: Node, realign: bool) -> NodeId {
        if !node.rejected {
            if let Some(err) = self.placement_error(parent, &node, realign) {
                self.record(err);
                node.rejected = true;
            }
        }
        self.tree.add_child(parent, node)
    }

    /// Rules that depend on where the node lands rather than on its text.
    fn placement_error(&self, parent: NodeId, node: &Node, realign: bool) -> Option<ValidationError> {
        let owner = self.tree.node(parent);
        if owner.has_inline_value() || owner.kind == NodeKind::ScalarLeaf {
            return Some(ValidationError::indent(
                node.line_no,
                format!(
                    "unexpected indentation: the node on line {} already has a value",
                    owner.line_no
                ),
            ));
        }

        if owner.kind == NodeKind::Document {
            if let Some(leaf_line) = owner.stats.scalar_leaf_line {
                return Some(ValidationError::grammar(
                    node.line_no,
                    format!("document already consists of the scalar on line {leaf_line}"),
                ));
            }
        }

        let previous = owner.stats.last_closed.as_ref()?;
        if !realign && previous.indent != node.indent {
            return Some(ValidationError::indent(
                node.line_no,
                format!(
                    "misaligned sibling: expected indent {}, found {}",
                    previous.indent, node.indent
                ),
            ));
        }
        None
    }

    fn sequence_context_error(&self, parent: NodeId, line_no: usize) -> Option<ValidationError> {
        let owner = self.tree.node(parent);
        if let Some(prev) = &owner.stats.last_closed {
            if prev.kind == NodeKind::Mapping && prev.has_inline_value {
                return Some(ValidationError::structure(
                    line_no,
                    format!(
                        "list following key-value pair '{}' on line {}",
                        prev.key.as_deref().unwrap_or_default(),
                        prev.line_no
                    ),
                ));
            }
        }

        let owned_by_key = owner.kind != NodeKind::Document
            || self.options.allow_top_level_sequence
            || owner.stats.has_sequence;
        if owned_by_key {
            None
        } else {
            Some(ValidationError::structure(
                line_no,
                "sequence without an owning key",
            ))
        }
    }

    fn attach_scalar(
        &mut self,
        parent: NodeId,
        column: usize,
        text: &str,
        line_no: usize,
        realign: bool,
    ) {
        let well_formed = match check_scalar(text, line_no) {
            Ok(_) => true,
            Err(err) => {
                self.record(err);
                false
            }
        };

        let owner = self.tree.node(parent);
        let mut leaf = Node::new(NodeKind::ScalarLeaf, column, line_no).with_value(text);
        if owner.kind != NodeKind::Document || owner.child_count() > 0 {
            if well_formed {
                self.record(ValidationError::grammar(
                    line_no,
                    format!("standalone scalar without context: '{text}'"),
                ));
            }
            leaf.rejected = true;
        }
        let id = self.attach(parent, leaf, realign);
        self.push_frame(column, id);
    }

    /// Stores the inline value of an entry or item; a block header also opens
    /// body collection.
    fn set_value(&mut self, id: NodeId, value: &str, column: usize, line_no: usize) {
        let mut header = None;
        if looks_like_block_header(value) {
            match parse_block_header(value, line_no) {
                Ok(parsed) => header = Some(parsed),
                Err(err) => self.record(err),
            }
        } else if let Err(err) = check_scalar(value, line_no) {
            self.record(err);
        }

        let node = self.tree.node_mut(id);
        node.inline_value = Some(value.to_string());
        node.block = header;
        if header.is_some() {
            self.block = Some(BlockBody {
                owner: id,
                owner_indent: column,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("- a", Shape::SeqItem { rest: "a", offset: 2 })]
    #[case("-", Shape::SeqItem { rest: "", offset: 1 })]
    #[case("-   key: v", Shape::SeqItem { rest: "key: v", offset: 4 })]
    #[case("key: value", Shape::Entry { key: "key", value: "value" })]
    #[case("key:", Shape::Entry { key: "key", value: "" })]
    #[case("key :  spaced ", Shape::Entry { key: "key", value: "spaced" })]
    #[case("\"a: b\": c", Shape::Entry { key: "\"a: b\"", value: "c" })]
    #[case("key:value", Shape::Scalar("key:value"))]
    #[case("-5", Shape::Scalar("-5"))]
    #[case("\"quoted: text\"", Shape::Scalar("\"quoted: text\""))]
    fn classifies_content(#[case] content: &str, #[case] expected: Shape<'_>) {
        assert_eq!(classify(content), expected);
    }
}
