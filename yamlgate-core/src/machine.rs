//! Indentation stack automaton.
//!
//! Lines are pushed one at a time. Each content line first settles the frame
//! stack (closing every node it dedents past) and is then handed to the tree
//! builder with the node that will own it. Nodes are validated the moment they
//! close, strictly bottom-up.

use log::{debug, trace};

use crate::checks;
use crate::error::{ValidationError, ValidationReport};
use crate::line::{leading_indent, lex_line, strip_terminator, Line, LineKind};
use crate::options::ValidatorOptions;
use crate::tree::{Node, NodeId, NodeKind, Tree};

/// Whether the caller should keep feeding lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Fail-fast mode recorded an error; further lines are ignored.
    Halt,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct IndentFrame {
    pub(crate) indent: isize,
    pub(crate) node: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocState {
    /// Nothing but an optional `---` seen so far.
    Start,
    Body,
    /// After `...`.
    Ended,
}

/// Body collection for a `|` / `>` scalar owned by `owner`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockBody {
    pub(crate) owner: NodeId,
    pub(crate) owner_indent: usize,
}

/// Where the builder should attach the current line.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement {
    pub(crate) parent: NodeId,
    /// The line dedented onto no open level; accept its indent as the new
    /// sibling baseline instead of reporting it twice.
    pub(crate) realign: bool,
}

/// Result of a completed run: the report plus the tree that was built.
#[derive(Debug)]
pub struct Validated {
    pub report: ValidationReport,
    pub tree: Tree,
}

/// One validation run. Not reusable: build a new one per document stream.
#[derive(Debug)]
pub struct Validator {
    pub(crate) options: ValidatorOptions,
    pub(crate) tree: Tree,
    pub(crate) stack: Vec<IndentFrame>,
    pub(crate) block: Option<BlockBody>,
    doc: DocState,
    line_no: usize,
    errors: Vec<ValidationError>,
    halted: bool,
}

impl Validator {
    pub fn new(options: ValidatorOptions) -> Self {
        let mut validator = Self {
            options,
            tree: Tree::new(),
            stack: Vec::new(),
            block: None,
            doc: DocState::Start,
            line_no: 0,
            errors: Vec::new(),
            halted: false,
        };
        validator.begin_document(1);
        validator
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Number of frames currently open, document root included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Feeds the next raw line (terminator optional).
    pub fn push_line(&mut self, raw: &str) -> Flow {
        self.line_no += 1;
        if self.halted {
            return Flow::Halt;
        }
        let line_no = self.line_no;

        if self.block.is_some() && self.consume_block_line(line_no, raw) {
            return self.flow();
        }

        match lex_line(line_no, raw) {
            Ok(line) => self.on_line(line),
            Err(err) => self.record(err),
        }
        self.flow()
    }

    /// Ends the run: closes every open node and returns the final report.
    pub fn finish(mut self) -> Validated {
        if !self.halted {
            self.finish_document(None);
        }
        self.stack.clear();
        debug!(
            "validation finished after {} lines with {} errors",
            self.line_no,
            self.errors.len()
        );
        Validated {
            report: ValidationReport::from_errors(self.errors),
            tree: self.tree,
        }
    }

    /// Stops early without end-of-input checks; the errors found so far form
    /// a valid partial result.
    pub fn abort(self) -> ValidationReport {
        ValidationReport::from_errors(self.errors)
    }

    fn flow(&self) -> Flow {
        if self.halted {
            Flow::Halt
        } else {
            Flow::Continue
        }
    }

    pub(crate) fn record(&mut self, err: ValidationError) {
        if self.halted {
            return;
        }
        debug!("{err}");
        self.errors.push(err);
        if self.options.is_fail_fast() {
            self.halted = true;
        }
    }

    fn on_line(&mut self, line: Line<'_>) {
        trace!(
            "line {} indent {} {:?}: {:?}",
            line.line_no,
            line.indent,
            line.kind,
            line.content
        );
        match line.kind {
            LineKind::Blank | LineKind::Comment => {}
            LineKind::Separator => self.on_separator(line),
            LineKind::Content => self.on_content(line),
        }
    }

    fn on_separator(&mut self, line: Line<'_>) {
        let starts_document = line.content == "---";
        match (starts_document, self.doc) {
            (true, DocState::Start) => {}
            (true, DocState::Body | DocState::Ended) => {
                if self.doc == DocState::Body {
                    self.finish_document(Some(line.line_no));
                }
                self.begin_document(line.line_no);
            }
            (false, DocState::Start | DocState::Body) => {
                self.finish_document(Some(line.line_no));
                self.doc = DocState::Ended;
            }
            (false, DocState::Ended) => {}
        }
    }

    fn on_content(&mut self, line: Line<'_>) {
        if self.doc == DocState::Ended {
            self.record(ValidationError::structure(
                line.line_no,
                "content after document end marker '...'",
            ));
            if self.halted {
                return;
            }
            self.begin_document(line.line_no);
        }

        if self.doc == DocState::Start {
            self.doc = DocState::Body;
            if line.indent != 0 {
                self.record(ValidationError::indent(
                    line.line_no,
                    format!(
                        "document root must start at indent 0, found indent {}",
                        line.indent
                    ),
                ));
                if self.halted {
                    return;
                }
            }
        }

        if let Some(placement) = self.align(&line) {
            self.attach_line(placement, &line);
        }
    }

    /// Settles the stack for a content line at `line.indent` and returns the
    /// node that will own it.
    fn align(&mut self, line: &Line<'_>) -> Option<Placement> {
        let indent = line.indent as isize;
        let mut popped = false;

        while let Some(top) = self.stack.last().copied() {
            if top.indent <= indent {
                break;
            }
            self.stack.pop();
            self.close(top.node, Some(line.line_no));
            popped = true;
        }

        let top = self.stack.last().copied()?;
        if top.indent == indent {
            self.stack.pop();
            self.close(top.node, Some(line.line_no));
            let parent = self.stack.last()?.node;
            return Some(Placement {
                parent,
                realign: false,
            });
        }

        let mut realign = false;
        if popped {
            self.record(ValidationError::indent(
                line.line_no,
                format!(
                    "dedent to unknown level: indent {} matches no open block",
                    line.indent
                ),
            ));
            if self.halted {
                return None;
            }
            realign = true;
        }
        Some(Placement {
            parent: top.node,
            realign,
        })
    }

    pub(crate) fn push_frame(&mut self, indent: usize, node: NodeId) {
        debug_assert!(self
            .stack
            .last()
            .map_or(true, |top| top.indent < indent as isize));
        trace!("push frame at indent {indent}");
        self.stack.push(IndentFrame {
            indent: indent as isize,
            node,
        });
    }

    fn close(&mut self, id: NodeId, closing_line: Option<usize>) {
        if self.block.is_some_and(|block| block.owner == id) {
            self.block = None;
        }
        if !self.halted {
            for err in checks::closing_errors(&self.tree, id, closing_line, &self.options) {
                self.record(err);
            }
        }
        self.tree.seal(id);
        if !self.options.retain_tree {
            self.tree.release(id);
        }
    }

    fn begin_document(&mut self, line_no: usize) {
        let root = self.tree.open_document(line_no);
        debug!("document {} opened at line {line_no}", self.tree.documents().len());
        self.stack.push(IndentFrame {
            indent: crate::tree::ROOT_INDENT,
            node: root,
        });
        self.doc = DocState::Start;
    }

    fn finish_document(&mut self, closing_line: Option<usize>) {
        self.block = None;
        while let Some(frame) = self.stack.pop() {
            self.close(frame.node, closing_line);
        }
        debug!("document closed");
    }

    /// Takes the line as block-scalar body if it belongs to the open block.
    /// Returns false once the block has ended; the line is then processed
    /// normally.
    fn consume_block_line(&mut self, line_no: usize, raw: &str) -> bool {
        let Some(block) = self.block else {
            return false;
        };

        let text = strip_terminator(raw);
        if text.trim().is_empty() {
            return true;
        }

        let indent = match leading_indent(line_no, text) {
            Ok(indent) => indent,
            Err(err) => {
                self.record(err);
                return true;
            }
        };
        if indent <= block.owner_indent {
            self.block = None;
            return false;
        }

        let body = Node::new(NodeKind::BlockScalar, indent, line_no);
        if self.options.retain_tree {
            self.tree
                .add_child(block.owner, body.with_value(text[indent..].trim_end()));
        } else {
            self.tree.count_child(block.owner, &body);
        }
        true
    }
}
