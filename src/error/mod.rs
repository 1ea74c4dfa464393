//! Error types and parse diagnostics.
//!
//! Failures come in two tiers (see [`ParseError::is_grammar_error`]):
//!
//! - a top-level *recoverable* failure — [`ParseError::NoMatch`] — means
//!   the input did not parse; every internal backtrack that could have
//!   recovered has already been tried;
//! - a *fatal* failure means the grammar itself is defective or has
//!   committed: left recursion, a failed [`cut`](crate::Expr::cut), an
//!   undefined rule, or an engine invariant violation. Fatal failures are
//!   never caught by choice backtracking.
//!
//! When the `diagnostics` feature is enabled, errors also derive
//! [`miette::Diagnostic`] for integration with miette-based reporters.

pub mod diagnostics;

use std::time::Duration;

use compact_str::CompactString;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// One active rule at the moment a failure was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    /// Name of the rule (or labeled node) being evaluated.
    pub rule: CompactString,
    /// Byte offset at which the rule began.
    pub offset: usize,
}

/// A failed parse.
#[derive(Debug, Clone, Error, PartialEq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    /// The input did not match the grammar. This is an input error, not a
    /// grammar defect; `offset` and `expected` describe the furthest point
    /// any alternative reached.
    #[error("no rule matched at offset {offset}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(packrat::no_match)))]
    NoMatch {
        offset: usize,
        /// Terminal expectations recorded at `offset`, in attempt order.
        expected: Vec<String>,
        /// Labeled call-stack frames active when the failure was recorded,
        /// outermost first.
        trace: Vec<TraceFrame>,
    },

    /// A rule invoked itself at the same position with no progress.
    #[error("left recursion detected in rule '{rule}' at offset {offset}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(packrat::left_recursion)))]
    LeftRecursion {
        rule: String,
        offset: usize,
        trace: Vec<TraceFrame>,
    },

    /// A committed alternative failed past its cut point.
    #[error("committed parse failed at offset {offset}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(packrat::committed)))]
    Committed {
        offset: usize,
        expected: Vec<String>,
        trace: Vec<TraceFrame>,
    },

    /// A rule cell was evaluated before [`Rule::define`](crate::Rule::define).
    #[error("rule '{name}' was used before being defined")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(packrat::undefined_rule)))]
    UndefinedRule { name: String, offset: usize },

    /// An engine invariant was violated; indicates a combinator bug.
    #[error("parser invariant violated: {message}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(packrat::internal)))]
    Internal { message: String },
}

impl ParseError {
    /// Byte offset the error refers to, when it has one.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::NoMatch { offset, .. }
            | Self::LeftRecursion { offset, .. }
            | Self::Committed { offset, .. }
            | Self::UndefinedRule { offset, .. } => Some(*offset),
            Self::Internal { .. } => None,
        }
    }

    /// Terminal expectations at the failure point, when recorded.
    #[must_use]
    pub fn expected(&self) -> &[String] {
        match self {
            Self::NoMatch { expected, .. } | Self::Committed { expected, .. } => expected,
            _ => &[],
        }
    }

    /// Labeled call-stack frames active when the failure was recorded.
    #[must_use]
    pub fn trace(&self) -> &[TraceFrame] {
        match self {
            Self::NoMatch { trace, .. }
            | Self::LeftRecursion { trace, .. }
            | Self::Committed { trace, .. } => trace,
            _ => &[],
        }
    }

    /// Whether this failure indicates a grammar-construction defect rather
    /// than malformed input. [`ParseError::NoMatch`] is the only input
    /// error; everything else is worth surfacing to the grammar author.
    #[must_use]
    pub const fn is_grammar_error(&self) -> bool {
        !matches!(self, Self::NoMatch { .. })
    }
}

/// An error constructing a grammar, before any parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    /// [`Rule::define`](crate::Rule::define) was called twice.
    #[error("rule '{name}' is already defined")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(packrat::already_defined)))]
    AlreadyDefined { name: String },
}

/// Counters collected over one parse run.
///
/// `terminal_matches` counts terminal evaluations (attempted matches), not
/// successes; a memoization cache hit performs no terminal evaluation, so
/// this counter is the observable witness that packrat caching is working.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseMetrics {
    /// Wall-clock time for the run.
    pub parse_time: Duration,
    /// Terminal pattern evaluations performed.
    pub terminal_matches: usize,
    /// Memo table hits (success or cached failure).
    pub memo_hits: usize,
    /// Node evaluations routed through the engine wrapper.
    pub nodes_evaluated: usize,
}
