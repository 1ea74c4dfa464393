//! Rendering parse failures against their source text.
//!
//! The engine reports byte offsets; humans want 1-based line/column
//! positions and a caret under the offending column. [`LineIndex`] does
//! the offset conversion, [`render`] produces the full report, and
//! [`format_error_with_location`] gives a compact one-line form. None of
//! this carries control-flow significance; it is reporting only.

use std::fmt::Write;

use crate::error::ParseError;

/// A 1-based line and column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number, counted in characters.
    pub column: usize,
}

/// Index of line start offsets for offset-to-line/column conversion.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets of line starts; always contains 0.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build an index by scanning the text once.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_starts.push(i + 1);
                    i += 1;
                }
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        line_starts.push(i + 2);
                        i += 2;
                    } else {
                        line_starts.push(i + 1);
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 1-based line/column position.
    ///
    /// Offsets past the end of `text` clamp to the last line. The column
    /// counts characters, so a caret rendered at `column - 1` lines up
    /// under the offending character.
    #[must_use]
    pub fn line_col(&self, text: &str, offset: usize) -> LineCol {
        let offset = offset.min(text.len());
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        let column = text[line_start..offset].chars().count();
        LineCol {
            line: line + 1,
            column: column + 1,
        }
    }

    /// The text of the line containing `offset`, without its terminator.
    #[must_use]
    pub fn line_text<'t>(&self, text: &'t str, offset: usize) -> &'t str {
        let offset = offset.min(text.len());
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1);
        let start = self.line_starts[line];
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(text.len(), |next| *next);
        text[start..end].trim_end_matches(['\n', '\r'])
    }
}

/// Render a parse failure as a multi-line report with a source excerpt.
///
/// ```text
/// error: no rule matched at offset 6
///  --> 1:7
///   |
/// 1 | (1+2*3
///   |       ^ expected ')'
///   = while parsing prim (1:1)
/// ```
#[must_use]
pub fn render(error: &ParseError, source: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "error: {error}");

    if let Some(offset) = error.offset() {
        let index = LineIndex::new(source);
        let pos = index.line_col(source, offset);
        let line_text = index.line_text(source, offset);
        let gutter = pos.line.to_string().len();

        let _ = writeln!(out, "{:gutter$} --> {}:{}", "", pos.line, pos.column);
        let _ = writeln!(out, "{:gutter$} |", "");
        let _ = writeln!(out, "{} | {line_text}", pos.line);
        let _ = write!(out, "{:gutter$} | {:>width$}", "", "^", width = pos.column);

        let expected = error.expected();
        if expected.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, " expected {}", expected.join(" or "));
        }

        for frame in error.trace() {
            let at = index.line_col(source, frame.offset);
            let _ = writeln!(
                out,
                "{:gutter$} = while parsing {} ({}:{})",
                "", frame.rule, at.line, at.column
            );
        }
    }

    out
}

/// Compact `line:col: message` form, optionally prefixed with a filename.
#[must_use]
pub fn format_error_with_location(
    error: &ParseError,
    source: &str,
    filename: Option<&str>,
) -> String {
    let mut out = String::new();
    if let Some(offset) = error.offset() {
        let pos = LineIndex::new(source).line_col(source, offset);
        if let Some(filename) = filename {
            let _ = write!(out, "{filename}:");
        }
        let _ = write!(out, "{}:{}: ", pos.line, pos.column);
    }
    let _ = write!(out, "{error}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_is_one_based() {
        let text = "ab\ncd\nef";
        let index = LineIndex::new(text);
        assert_eq!(index.line_col(text, 0), LineCol { line: 1, column: 1 });
        assert_eq!(index.line_col(text, 4), LineCol { line: 2, column: 2 });
        assert_eq!(index.line_col(text, 6), LineCol { line: 3, column: 1 });
    }

    #[test]
    fn line_col_clamps_past_end() {
        let text = "ab";
        let index = LineIndex::new(text);
        assert_eq!(index.line_col(text, 99), LineCol { line: 1, column: 3 });
    }

    #[test]
    fn windows_line_endings() {
        let text = "ab\r\ncd";
        let index = LineIndex::new(text);
        assert_eq!(index.line_col(text, 4), LineCol { line: 2, column: 1 });
        assert_eq!(index.line_text(text, 0), "ab");
        assert_eq!(index.line_text(text, 4), "cd");
    }

    #[test]
    fn column_counts_chars_not_bytes() {
        let text = "é+";
        let index = LineIndex::new(text);
        // '+' starts at byte 2 but is the second character.
        assert_eq!(index.line_col(text, 2), LineCol { line: 1, column: 2 });
    }

    #[test]
    fn line_text_strips_terminator() {
        let text = "one\ntwo\n";
        let index = LineIndex::new(text);
        assert_eq!(index.line_text(text, 5), "two");
    }
}
