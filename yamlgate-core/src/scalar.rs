//! Scalar grammar: plain, quoted and block-scalar headers.

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ScalarStyle {
    Plain,
    DoubleQuoted,
    SingleQuoted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum BlockStyle {
    /// `|`
    Literal,
    /// `>`
    Folded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum Chomping {
    #[default]
    Clip,
    /// `-`
    Strip,
    /// `+`
    Keep,
}

/// A parsed `|` / `>` header. Chomping is remembered but never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BlockHeader {
    pub style: BlockStyle,
    pub chomping: Chomping,
    pub indent_indicator: Option<usize>,
}

pub fn looks_like_block_header(text: &str) -> bool {
    text.starts_with('|') || text.starts_with('>')
}

/// `-` followed by whitespace or nothing.
pub fn looks_like_seq(content: &str) -> bool {
    match content.strip_prefix('-') {
        Some(rest) => rest.chars().next().map_or(true, char::is_whitespace),
        None => false,
    }
}

pub fn parse_block_header(text: &str, line_no: usize) -> Result<BlockHeader, ValidationError> {
    let mut chars = text.chars();
    let style = match chars.next() {
        Some('|') => BlockStyle::Literal,
        Some('>') => BlockStyle::Folded,
        _ => {
            return Err(ValidationError::grammar(
                line_no,
                format!("invalid block scalar header '{text}'"),
            ))
        }
    };

    let mut chomping = None;
    let mut indent_indicator = None;
    for ch in chars {
        match ch {
            '-' | '+' if chomping.is_none() => {
                chomping = Some(if ch == '-' {
                    Chomping::Strip
                } else {
                    Chomping::Keep
                });
            }
            '1'..='9' if indent_indicator.is_none() => {
                indent_indicator = ch.to_digit(10).map(|d| d as usize);
            }
            _ => {
                return Err(ValidationError::grammar(
                    line_no,
                    format!("invalid block scalar header '{text}'"),
                ))
            }
        }
    }

    Ok(BlockHeader {
        style,
        chomping: chomping.unwrap_or_default(),
        indent_indicator,
    })
}

/// Validates a complete scalar token (already trimmed, comment removed).
pub fn check_scalar(text: &str, line_no: usize) -> Result<ScalarStyle, ValidationError> {
    if text.starts_with('"') {
        check_double_quoted(text, line_no)
    } else if text.starts_with('\'') {
        check_single_quoted(text, line_no)
    } else {
        check_plain(text, line_no)
    }
}

pub fn check_key(raw: &str, line_no: usize) -> Result<ScalarStyle, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::grammar(line_no, "empty key"));
    }
    check_scalar(raw, line_no).map_err(|mut err| {
        err.message = format!("invalid key: {}", err.message);
        err
    })
}

/// Byte offset of the first `:` acting as a mapping indicator: outside a
/// leading quoted key and followed by whitespace or end of text.
pub fn find_mapping_indicator(content: &str) -> Option<usize> {
    let start = if content.starts_with('"') || content.starts_with('\'') {
        quoted_end(content)?
    } else {
        0
    };

    let tail = &content[start..];
    for (idx, ch) in tail.char_indices() {
        if ch != ':' {
            continue;
        }
        let after = &tail[idx + 1..];
        if after.chars().next().map_or(true, char::is_whitespace) {
            return Some(start + idx);
        }
    }
    None
}

/// Byte offset just past the closing quote of a quoted token at the start of
/// `text`.
fn quoted_end(text: &str) -> Option<usize> {
    let quote = text.chars().next()?;
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((idx, ch)) = chars.next() {
        if quote == '"' && ch == '\\' {
            chars.next();
        } else if ch == quote {
            if quote == '\'' && matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                continue;
            }
            return Some(idx + 1);
        }
    }
    None
}

fn check_double_quoted(text: &str, line_no: usize) -> Result<ScalarStyle, ValidationError> {
    let mut chars = text.char_indices().skip(1);
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some((_, 'n' | 't' | '\\' | '"')) => {}
                Some((_, other)) => {
                    return Err(ValidationError::grammar(
                        line_no,
                        format!("invalid escape sequence '\\{other}' in double-quoted scalar"),
                    ))
                }
                None => break,
            },
            '"' => return closed_at(text, idx + 1, line_no, ScalarStyle::DoubleQuoted),
            c if is_non_printable(c) => return Err(non_printable(line_no, c)),
            _ => {}
        }
    }
    Err(ValidationError::lex(
        line_no,
        "unterminated double-quoted scalar",
    ))
}

fn check_single_quoted(text: &str, line_no: usize) -> Result<ScalarStyle, ValidationError> {
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\'' if matches!(chars.peek(), Some((_, '\''))) => {
                chars.next();
            }
            '\'' => return closed_at(text, idx + 1, line_no, ScalarStyle::SingleQuoted),
            c if is_non_printable(c) => return Err(non_printable(line_no, c)),
            _ => {}
        }
    }
    Err(ValidationError::lex(
        line_no,
        "unterminated single-quoted scalar",
    ))
}

fn closed_at(
    text: &str,
    end: usize,
    line_no: usize,
    style: ScalarStyle,
) -> Result<ScalarStyle, ValidationError> {
    let rest = text[end..].trim();
    if rest.is_empty() {
        Ok(style)
    } else {
        Err(ValidationError::grammar(
            line_no,
            format!("unexpected text after quoted scalar: '{rest}'"),
        ))
    }
}

fn check_plain(text: &str, line_no: usize) -> Result<ScalarStyle, ValidationError> {
    let Some(first) = text.chars().next() else {
        return Ok(ScalarStyle::Plain);
    };

    let refusal = match first {
        '-' if looks_like_seq(text) => Some("a sequence item cannot appear inline here"),
        '|' | '>' => Some("block scalar header is not allowed here"),
        '[' | ']' | '{' | '}' | ',' => Some("flow collections are not supported"),
        '&' | '*' => Some("anchors and aliases are not supported"),
        '!' => Some("tags are not supported"),
        '%' | '@' | '`' => Some("reserved indicator cannot start a plain scalar"),
        '?' if text[1..].chars().next().map_or(true, char::is_whitespace) => {
            Some("complex mapping keys are not supported")
        }
        _ => None,
    };
    if let Some(message) = refusal {
        return Err(ValidationError::grammar(
            line_no,
            format!("{message}: '{text}'"),
        ));
    }

    if find_mapping_indicator(text).is_some() {
        return Err(ValidationError::grammar(
            line_no,
            format!("unexpected mapping indicator in plain scalar '{text}'"),
        ));
    }

    if let Some(c) = text.chars().find(|c| is_non_printable(*c)) {
        return Err(non_printable(line_no, c));
    }
    Ok(ScalarStyle::Plain)
}

fn is_non_printable(c: char) -> bool {
    c.is_control() && c != '\t'
}

fn non_printable(line_no: usize, c: char) -> ValidationError {
    ValidationError::grammar(
        line_no,
        format!("non-printable character U+{:04X} in scalar", c as u32),
    )
}
