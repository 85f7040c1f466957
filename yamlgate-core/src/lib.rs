//! Structural validation for an indentation-based YAML subset.
//!
//! The validator consumes lines one at a time, builds an explicit nesting tree
//! and checks every node as it closes. It never resolves values and never
//! performs I/O beyond the optional [`validate_reader`] convenience.

use std::io::BufRead;

use tailcall::trampoline::{self, Next};

mod builder;
mod checks;
mod error;
mod line;
mod machine;
mod options;
mod scalar;
mod tree;

pub use builder::{classify, Shape};
pub use error::{ErrorKind, SourceError, ValidationError, ValidationReport};
pub use line::{lex_line, Line, LineKind};
pub use machine::{Flow, Validated, Validator};
pub use options::{RunMode, ValidatorOptions};
pub use scalar::{BlockHeader, BlockStyle, Chomping, ScalarStyle};
pub use tree::{Node, NodeId, NodeKind, Tree, ROOT_INDENT};

/// Validates a whole in-memory document.
pub fn validate_str(input: &str, options: &ValidatorOptions) -> ValidationReport {
    validate_lines(input.lines(), options)
}

/// Validates an ordered sequence of lines.
pub fn validate_lines<I, S>(lines: I, options: &ValidatorOptions) -> ValidationReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    run_lines(lines, options).report
}

/// Like [`validate_lines`] but also hands back the tree that was built.
pub fn run_lines<I, S>(lines: I, options: &ValidatorOptions) -> Validated
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let run = LineRun {
        validator: Validator::new(options.clone()),
        lines: lines.into_iter(),
    };
    trampoline::run(LineRun::step, run)
}

/// Pulls lines from `reader` until it is exhausted or fail-fast mode halts.
/// Read failures are reported as [`SourceError`], never as validation errors.
pub fn validate_reader<R: BufRead>(
    mut reader: R,
    options: &ValidatorOptions,
) -> Result<ValidationReport, SourceError> {
    let mut validator = Validator::new(options.clone());
    let mut buf = String::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        line_no += 1;
        let read = reader
            .read_line(&mut buf)
            .map_err(|source| SourceError::Io { line_no, source })?;
        if read == 0 || validator.push_line(&buf) == Flow::Halt {
            break;
        }
    }
    Ok(validator.finish().report)
}

struct LineRun<I> {
    validator: Validator,
    lines: I,
}

impl<I, S> LineRun<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    fn step(mut self) -> Next<Self, Validated> {
        match self.lines.next() {
            Some(line) => match self.validator.push_line(line.as_ref()) {
                Flow::Continue => Next::Recurse(self),
                Flow::Halt => Next::Finish(self.validator.finish()),
            },
            None => Next::Finish(self.validator.finish()),
        }
    }
}
