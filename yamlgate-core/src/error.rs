use std::fmt;

/// Category of a structural defect found while validating a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    /// Tab indentation, unterminated quote.
    Lex,
    /// Dedent to an unknown level, misaligned siblings, bad root indentation.
    Indent,
    /// Mixed sibling kinds, sequence without an owning key, sequence after a
    /// scalar-valued key, content after a document end marker.
    Structure,
    /// Empty or invalid key, invalid escape, key without value, stray scalar.
    Grammar,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Lex => "LexError",
            ErrorKind::Indent => "IndentError",
            ErrorKind::Structure => "StructureError",
            ErrorKind::Grammar => "GrammarError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, thiserror::Error)]
#[error("line {line_no}: {kind}: {message}")]
pub struct ValidationError {
    pub line_no: usize,
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(line_no: usize, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            line_no,
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn lex(line_no: usize, message: impl Into<String>) -> Self {
        Self::new(line_no, ErrorKind::Lex, message)
    }

    pub(crate) fn indent(line_no: usize, message: impl Into<String>) -> Self {
        Self::new(line_no, ErrorKind::Indent, message)
    }

    pub(crate) fn structure(line_no: usize, message: impl Into<String>) -> Self {
        Self::new(line_no, ErrorKind::Structure, message)
    }

    pub(crate) fn grammar(line_no: usize, message: impl Into<String>) -> Self {
        Self::new(line_no, ErrorKind::Grammar, message)
    }
}

/// Outcome of one validation run. `valid` is true iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Failure of the collaborator that supplies lines. Never a judgment about the
/// document itself.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read line {line_no}: {source}")]
    Io {
        line_no: usize,
        #[source]
        source: std::io::Error,
    },
}
