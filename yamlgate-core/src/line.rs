//! Line classification.
//!
//! Every raw line is reduced to its indentation, its comment-free content and
//! a [`LineKind`]. Nothing here knows about nesting; structural judgment is the
//! automaton's job.

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    /// `---` or `...`
    Separator,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub line_no: usize,
    pub indent: usize,
    pub content: &'a str,
    pub kind: LineKind,
}

pub fn strip_terminator(raw: &str) -> &str {
    let raw = raw.strip_suffix('\n').unwrap_or(raw);
    raw.strip_suffix('\r').unwrap_or(raw)
}

/// Classifies one raw line. Fails only on lexical defects: tabs in the
/// indentation or a quote left open at end of line.
pub fn lex_line(line_no: usize, raw: &str) -> Result<Line<'_>, ValidationError> {
    let text = strip_terminator(raw);
    if text.trim().is_empty() {
        return Ok(Line {
            line_no,
            indent: 0,
            content: "",
            kind: LineKind::Blank,
        });
    }

    let indent = leading_indent(line_no, text)?;
    let body = &text[indent..];
    let (content, _comment) = split_inline_comment(body).map_err(|quote| {
        let name = if quote == '"' { "double" } else { "single" };
        ValidationError::lex(line_no, format!("unterminated {name}-quoted scalar"))
    })?;
    let content = content.trim();

    let kind = if content.is_empty() {
        LineKind::Comment
    } else if content == "---" || content == "..." {
        LineKind::Separator
    } else {
        LineKind::Content
    };

    Ok(Line {
        line_no,
        indent,
        content,
        kind,
    })
}

/// Counts leading spaces. A tab anywhere before the first visible character is
/// rejected rather than counted.
pub fn leading_indent(line_no: usize, text: &str) -> Result<usize, ValidationError> {
    let mut indent = 0;
    for ch in text.chars() {
        match ch {
            ' ' => indent += 1,
            '\t' => {
                return Err(ValidationError::lex(
                    line_no,
                    "tabs are not allowed; use spaces for indentation",
                ))
            }
            _ => break,
        }
    }
    Ok(indent)
}

/// Splits `line` at the first `#` that starts a comment. A `#` starts a comment
/// when it is outside quotes and begins the text or follows whitespace.
///
/// A quote only opens where a scalar can begin: at the start of the text,
/// after a `- ` sequence marker or after a `: ` mapping indicator. Elsewhere
/// quote characters are plain text, so `rock 'n roll` stays one plain scalar.
///
/// Returns the quote character that was left open on failure.
pub fn split_inline_comment(line: &str) -> Result<(&str, Option<&str>), char> {
    let mut quote: Option<char> = None;
    let mut prev_is_space = true;
    let mut scalar_start = true;
    let mut chars = line.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let next_is_space = chars.peek().map_or(true, |(_, c)| c.is_whitespace());
        match quote {
            Some('"') => match ch {
                '\\' => {
                    chars.next();
                }
                '"' => quote = None,
                _ => {}
            },
            Some(_) => {
                if ch == '\'' {
                    if matches!(chars.peek(), Some((_, '\''))) {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            None => match ch {
                '#' if prev_is_space => {
                    let (before, comment) = line.split_at(idx);
                    return Ok((before.trim_end(), Some(comment)));
                }
                '"' | '\'' if scalar_start => {
                    quote = Some(ch);
                    scalar_start = false;
                }
                c if c.is_whitespace() => {}
                '-' if scalar_start && next_is_space => {}
                ':' if next_is_space => scalar_start = true,
                _ => scalar_start = false,
            },
        }
        prev_is_space = ch.is_whitespace();
    }

    match quote {
        Some(open) => Err(open),
        None => Ok((line.trim_end(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", LineKind::Blank)]
    #[case("    ", LineKind::Blank)]
    #[case("# only a comment", LineKind::Comment)]
    #[case("   # indented comment", LineKind::Comment)]
    #[case("---", LineKind::Separator)]
    #[case("...", LineKind::Separator)]
    #[case("  --- # trailing", LineKind::Separator)]
    #[case("key: value", LineKind::Content)]
    #[case("- item", LineKind::Content)]
    fn classifies_line_kinds(#[case] raw: &str, #[case] expected: LineKind) {
        let line = lex_line(1, raw).expect("line should lex");
        assert_eq!(line.kind, expected);
    }

    #[test]
    fn measures_indent_and_strips_terminator() {
        let line = lex_line(7, "    name: test\r\n").unwrap();
        assert_eq!(line.line_no, 7);
        assert_eq!(line.indent, 4);
        assert_eq!(line.content, "name: test");
    }

    #[test]
    fn strips_trailing_comment_outside_quotes() {
        let line = lex_line(1, "key: \"a # not a comment\" # real").unwrap();
        assert_eq!(line.content, "key: \"a # not a comment\"");

        let line = lex_line(1, "url: http://x#frag").unwrap();
        assert_eq!(line.content, "url: http://x#frag");
    }

    #[test]
    fn apostrophe_inside_word_does_not_open_quote() {
        let line = lex_line(1, "note: don't panic # ok").unwrap();
        assert_eq!(line.content, "note: don't panic");
    }

    #[rstest]
    #[case("msg: rock 'n roll", "msg: rock 'n roll")]
    #[case("msg: say \"hi", "msg: say \"hi")]
    #[case("msg: rock 'n roll # note", "msg: rock 'n roll")]
    #[case("- 'a # b' # note", "- 'a # b'")]
    #[case("- - \"x # y\"", "- - \"x # y\"")]
    #[case("\"k: #\": 'v # w'", "\"k: #\": 'v # w'")]
    fn quotes_open_only_where_a_scalar_begins(#[case] raw: &str, #[case] content: &str) {
        let line = lex_line(1, raw).unwrap();
        assert_eq!(line.content, content);
    }

    #[test]
    fn doubled_single_quote_stays_inside_scalar() {
        let line = lex_line(1, "k: 'it''s # here'").unwrap();
        assert_eq!(line.content, "k: 'it''s # here'");
    }

    #[test]
    fn leading_tab_is_a_lex_error() {
        let err = lex_line(3, "\tkey: value").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!(err.line_no, 3);

        let err = lex_line(4, "  \tkey: value").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
    }

    #[test]
    fn tab_after_content_start_is_not_indentation() {
        let line = lex_line(1, "key:\tvalue").unwrap();
        assert_eq!(line.indent, 0);
        assert_eq!(line.kind, LineKind::Content);
    }

    #[test]
    fn unterminated_quote_is_a_lex_error() {
        let err = lex_line(2, "key: \"open").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert!(err.message.contains("double"));

        let err = lex_line(2, "key: 'open").unwrap_err();
        assert!(err.message.contains("single"));
    }
}
