//! Terminal matchers.
//!
//! A [`Pattern`] is a small, regex-like matcher that either consumes input
//! at a given offset or fails without consuming. Patterns are pure
//! functions of `(input, offset)`: memoization and backtracking are handled
//! uniformly by the engine, never inside the matcher.

use compact_str::CompactString;

/// A set of character ranges, e.g. `[a-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    /// Inclusive ranges; a single character is a `(c, c)` range.
    ranges: Vec<(char, char)>,
}

impl CharSet {
    /// Create a character set from inclusive ranges.
    #[must_use]
    pub const fn new(ranges: Vec<(char, char)>) -> Self {
        Self { ranges }
    }

    /// Digits `[0-9]`.
    #[must_use]
    pub fn digits() -> Self {
        Self::new(vec![('0', '9')])
    }

    /// ASCII letters `[a-zA-Z]`.
    #[must_use]
    pub fn letters() -> Self {
        Self::new(vec![('a', 'z'), ('A', 'Z')])
    }

    /// Word characters `[a-zA-Z0-9_]`.
    #[must_use]
    pub fn word() -> Self {
        Self::new(vec![('a', 'z'), ('A', 'Z'), ('0', '9'), ('_', '_')])
    }

    /// Whitespace including newlines.
    #[must_use]
    pub fn whitespace() -> Self {
        Self::new(vec![(' ', ' '), ('\t', '\t'), ('\r', '\r'), ('\n', '\n')])
    }

    /// Whitespace excluding newlines.
    #[must_use]
    pub fn inline_whitespace() -> Self {
        Self::new(vec![(' ', ' '), ('\t', '\t')])
    }

    /// Check whether a character belongs to this set.
    #[must_use]
    pub fn matches(&self, c: char) -> bool {
        self.ranges.iter().any(|(lo, hi)| c >= *lo && c <= *hi)
    }

    fn describe(&self) -> String {
        let mut out = String::from("[");
        for (lo, hi) in &self.ranges {
            if lo == hi {
                out.push(*lo);
            } else {
                out.push(*lo);
                out.push('-');
                out.push(*hi);
            }
        }
        out.push(']');
        out
    }
}

/// A terminal matching pattern.
///
/// Matching is greedy and does not backtrack internally: `Repeat` consumes
/// as many occurrences as it can (up to `max`) and never gives any back.
/// That is the behavior of a longest-match lexer, which is what terminals
/// are; backtracking between grammar alternatives happens at the
/// combinator level.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Match an exact string.
    Literal(CompactString),
    /// Match one character from a set.
    CharClass(CharSet),
    /// Match a sub-pattern repeatedly.
    Repeat {
        pattern: Box<Pattern>,
        min: usize,
        max: Option<usize>,
    },
    /// Match sub-patterns in order.
    Seq(Vec<Pattern>),
    /// Match any single character.
    Any,
}

impl Pattern {
    /// Match an exact string.
    #[must_use]
    pub fn literal(text: &str) -> Self {
        Self::Literal(CompactString::new(text))
    }

    /// Match one character from a set.
    #[must_use]
    pub const fn char_class(set: CharSet) -> Self {
        Self::CharClass(set)
    }

    /// Match `pattern` between `min` and `max` times (`None` = unbounded).
    #[must_use]
    pub fn repeat(pattern: Self, min: usize, max: Option<usize>) -> Self {
        Self::Repeat {
            pattern: Box::new(pattern),
            min,
            max,
        }
    }

    /// One or more characters from a set.
    #[must_use]
    pub fn plus(set: CharSet) -> Self {
        Self::repeat(Self::CharClass(set), 1, None)
    }

    /// Zero or more characters from a set.
    #[must_use]
    pub fn star(set: CharSet) -> Self {
        Self::repeat(Self::CharClass(set), 0, None)
    }

    /// Match sub-patterns in order.
    #[must_use]
    pub fn seq<I>(patterns: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::Seq(patterns.into_iter().collect())
    }

    /// Attempt a match at `offset`; returns the end offset on success.
    ///
    /// A zero-length match is a success. Offsets are byte offsets and must
    /// lie on a character boundary.
    #[must_use]
    pub fn match_at(&self, input: &str, offset: usize) -> Option<usize> {
        match self {
            Self::Literal(text) => {
                if input[offset..].starts_with(text.as_str()) {
                    Some(offset + text.len())
                } else {
                    None
                }
            }
            Self::CharClass(set) => {
                let c = input[offset..].chars().next()?;
                if set.matches(c) {
                    Some(offset + c.len_utf8())
                } else {
                    None
                }
            }
            Self::Repeat { pattern, min, max } => {
                let mut pos = offset;
                let mut count = 0usize;
                loop {
                    if let Some(limit) = max {
                        if count >= *limit {
                            break;
                        }
                    }
                    match pattern.match_at(input, pos) {
                        // A zero-length inner match would loop forever.
                        Some(end) if end > pos => {
                            pos = end;
                            count += 1;
                        }
                        _ => break,
                    }
                }
                if count < *min {
                    None
                } else {
                    Some(pos)
                }
            }
            Self::Seq(patterns) => {
                let mut pos = offset;
                for pattern in patterns {
                    pos = pattern.match_at(input, pos)?;
                }
                Some(pos)
            }
            Self::Any => input[offset..].chars().next().map(|c| offset + c.len_utf8()),
        }
    }

    /// Human-readable expectation for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Literal(text) => format!("'{text}'"),
            Self::CharClass(set) => set.describe(),
            Self::Repeat { pattern, min, max } => {
                let inner = pattern.describe();
                match (min, max) {
                    (0, None) => format!("{inner}*"),
                    (1, None) => format!("{inner}+"),
                    (m, None) => format!("{inner}{{{m},}}"),
                    (m, Some(n)) if m == n => format!("{inner}{{{m}}}"),
                    (m, Some(n)) => format!("{inner}{{{m},{n}}}"),
                }
            }
            Self::Seq(patterns) => patterns.iter().map(Self::describe).collect(),
            Self::Any => String::from("any character"),
        }
    }
}
