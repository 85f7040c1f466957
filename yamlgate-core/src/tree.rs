//! Index-addressed node arena.
//!
//! Nodes are allocated in document order and never move; a closed node may be
//! released from the tail of the arena. Parent links are indices kept for
//! diagnostics; ownership is expressed only through `children`.

use std::fmt::Write as _;

use crate::scalar::BlockHeader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum NodeKind {
    /// Root of one document, indent -1.
    Document,
    /// `key: value` or `key:` entry.
    Mapping,
    /// `- value` item.
    Sequence,
    /// A document consisting of a single bare scalar.
    ScalarLeaf,
    /// One body line of a `|` / `>` block scalar.
    BlockScalar,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub indent: isize,
    pub line_no: usize,
    pub key_or_marker: Option<String>,
    pub inline_value: Option<String>,
    pub block: Option<BlockHeader>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Already diagnosed when attached; left out of sibling checks.
    #[serde(skip)]
    pub(crate) rejected: bool,
    #[serde(skip)]
    pub(crate) stats: ChildStats,
}

pub const ROOT_INDENT: isize = -1;

/// Running facts about a node's children, updated as each child is added or
/// closed. Attach and close rules read these instead of rescanning siblings,
/// and they survive once released children leave the arena.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ChildStats {
    pub(crate) count: usize,
    pub(crate) has_sequence: bool,
    /// Line of the first accepted bare scalar.
    pub(crate) scalar_leaf_line: Option<usize>,
    /// Kind and line of the first accepted entry.
    pub(crate) first_entry: Option<(NodeKind, usize)>,
    /// First accepted entry whose kind differs from `first_entry`.
    pub(crate) stray_entry: Option<(NodeKind, usize)>,
    pub(crate) body_indent: Option<isize>,
    /// Block body lines indented less than `body_indent`.
    pub(crate) shallow_body_lines: Vec<(usize, isize)>,
    pub(crate) last_closed: Option<ClosedChild>,
}

/// What the next sibling needs to know about the one before it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClosedChild {
    pub(crate) kind: NodeKind,
    pub(crate) indent: isize,
    pub(crate) line_no: usize,
    pub(crate) key: Option<String>,
    pub(crate) has_inline_value: bool,
}

impl Node {
    pub fn new(kind: NodeKind, indent: usize, line_no: usize) -> Self {
        Self {
            kind,
            indent: indent as isize,
            line_no,
            key_or_marker: None,
            inline_value: None,
            block: None,
            children: Vec::new(),
            parent: None,
            rejected: false,
            stats: ChildStats::default(),
        }
    }

    fn document(line_no: usize) -> Self {
        Self {
            indent: ROOT_INDENT,
            ..Self::new(NodeKind::Document, 0, line_no)
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key_or_marker = Some(key.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        if !value.is_empty() {
            self.inline_value = Some(value.to_string());
        }
        self
    }

    /// Scalar or block header on the defining line.
    pub fn has_inline_value(&self) -> bool {
        self.inline_value.is_some()
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.kind, NodeKind::Mapping | NodeKind::Sequence)
    }

    /// A mapping entry that has neither an inline value nor a block header
    /// and is still waiting for its nested subtree.
    pub fn is_pending_slot(&self) -> bool {
        self.kind == NodeKind::Mapping && self.inline_value.is_none() && self.stats.count == 0
    }

    /// Children ever attached, including ones already released.
    pub fn child_count(&self) -> usize {
        self.stats.count
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Tree {
    nodes: Vec<Node>,
    documents: Vec<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn documents(&self) -> &[NodeId] {
        &self.documents
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> + '_ {
        self.nodes[id.0].children.iter().map(|c| &self.nodes[c.0])
    }

    pub(crate) fn open_document(&mut self, line_no: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::document(line_no));
        self.documents.push(id);
        id
    }

    pub(crate) fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        self.count_child(parent, &node);
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Folds `child` into the parent's statistics without storing it.
    pub(crate) fn count_child(&mut self, parent: NodeId, child: &Node) {
        let owner = &mut self.nodes[parent.0];
        let explicit_body_indent = owner
            .block
            .and_then(|header| header.indent_indicator)
            .map(|digit| owner.indent + digit as isize);
        let stats = &mut owner.stats;
        stats.count += 1;

        match child.kind {
            NodeKind::Sequence => stats.has_sequence = true,
            NodeKind::ScalarLeaf if !child.rejected => {
                stats.scalar_leaf_line.get_or_insert(child.line_no);
            }
            NodeKind::BlockScalar => {
                let body_indent = *stats
                    .body_indent
                    .get_or_insert(explicit_body_indent.unwrap_or(child.indent));
                if child.indent < body_indent {
                    stats.shallow_body_lines.push((child.line_no, child.indent));
                }
            }
            _ => {}
        }

        if child.is_entry() && !child.rejected {
            match stats.first_entry {
                None => stats.first_entry = Some((child.kind, child.line_no)),
                Some((kind, _)) if kind != child.kind && stats.stray_entry.is_none() => {
                    stats.stray_entry = Some((child.kind, child.line_no));
                }
                Some(_) => {}
            }
        }
    }

    /// Records `id` as its parent's most recently closed child.
    pub(crate) fn seal(&mut self, id: NodeId) {
        let node = &self.nodes[id.0];
        let Some(parent) = node.parent else {
            return;
        };
        let closed = ClosedChild {
            kind: node.kind,
            indent: node.indent,
            line_no: node.line_no,
            key: node.key_or_marker.clone(),
            has_inline_value: node.has_inline_value(),
        };
        self.nodes[parent.0].stats.last_closed = Some(closed);
    }

    /// Frees a closed node's subtree and, unless it is a document root, the
    /// node itself. Only sound once `id` is closed: every node allocated after
    /// it belongs to its subtree, and it is its parent's last child.
    pub(crate) fn release(&mut self, id: NodeId) {
        let parent = self.nodes[id.0].parent;
        match parent {
            None => {
                self.nodes.truncate(id.0 + 1);
                self.nodes[id.0].children.clear();
            }
            Some(parent) => {
                self.nodes.truncate(id.0);
                let popped = self.nodes[parent.0].children.pop();
                debug_assert_eq!(popped, Some(id));
            }
        }
    }

    /// Compact one-line shape of a node, e.g.
    /// `Mapping{name: Scalar(test), items: Sequence[Scalar(one)]}`.
    pub fn summary(&self, id: NodeId) -> String {
        let mut out = String::new();
        let node = self.node(id);
        if node.kind == NodeKind::Document {
            self.write_collection(&mut out, &node.children);
        } else {
            self.write_value(&mut out, node);
        }
        out
    }

    fn write_value(&self, out: &mut String, node: &Node) {
        match (&node.inline_value, node.block) {
            (Some(_), Some(header)) => {
                let marker = match header.style {
                    crate::scalar::BlockStyle::Literal => '|',
                    crate::scalar::BlockStyle::Folded => '>',
                };
                let _ = write!(out, "Block({marker}, {} lines)", node.child_count());
            }
            (Some(value), None) => {
                let _ = write!(out, "Scalar({value})");
            }
            (None, _) => self.write_collection(out, &node.children),
        }
    }

    fn write_collection(&self, out: &mut String, children: &[NodeId]) {
        let Some(first) = children.first() else {
            out.push_str("Empty");
            return;
        };
        let (open, close, name) = match self.node(*first).kind {
            NodeKind::Mapping => ('{', '}', "Mapping"),
            NodeKind::Sequence => ('[', ']', "Sequence"),
            NodeKind::ScalarLeaf => {
                let leaf = self.node(*first);
                let _ = write!(out, "Scalar({})", leaf.inline_value.as_deref().unwrap_or(""));
                return;
            }
            NodeKind::Document | NodeKind::BlockScalar => ('(', ')', "Opaque"),
        };
        out.push_str(name);
        out.push(open);
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let child = self.node(*child);
            if child.kind == NodeKind::Mapping {
                out.push_str(child.key_or_marker.as_deref().unwrap_or(""));
                out.push_str(": ");
            }
            self.write_value(out, child);
        }
        out.push(close);
    }

    /// Indented outline of every document, one node per line, prefixed with
    /// the source line number.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (n, doc) in self.documents.iter().enumerate() {
            if n > 0 {
                out.push_str("---\n");
            }
            for child in &self.node(*doc).children {
                self.write_node(&mut out, *child, 0);
            }
        }
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, depth: usize) {
        let node = self.node(id);
        let _ = write!(out, "{:>4} | ", node.line_no);
        for _ in 0..depth {
            out.push(' ');
        }
        match node.kind {
            NodeKind::Mapping => {
                out.push_str(node.key_or_marker.as_deref().unwrap_or(""));
                out.push(':');
            }
            NodeKind::Sequence => out.push('-'),
            NodeKind::Document | NodeKind::ScalarLeaf | NodeKind::BlockScalar => {}
        }
        if let Some(value) = &node.inline_value {
            if node.is_entry() {
                out.push(' ');
            }
            out.push_str(value);
        }
        out.push('\n');
        for child in &node.children {
            self.write_node(out, *child, depth + 2);
        }
    }
}
