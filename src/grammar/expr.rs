//! The combinator node graph.
//!
//! An [`Expr`] is a cheap-clone handle to an immutable node. Grammar
//! construction is pure data construction: nodes are built once, wired into
//! a (possibly cyclic, via [`Rule`](super::Rule)) graph, and only borrowed
//! by the engine during a parse. Node identity — the `Arc` pointer — is the
//! memoization key, so sharing a sub-expression between rules also shares
//! its cache entries.

use std::sync::{Arc, OnceLock};

use compact_str::CompactString;

use super::Rule;
use crate::grammar::Pattern;
use crate::value::{ActionFail, Value};

/// A transform applied to a node's successful result.
///
/// Actions must be pure or idempotent: results are memoized, and a cache
/// hit returns the recorded value without re-running the action.
pub type Action<V> = Arc<dyn Fn(Value<V>) -> Result<Value<V>, ActionFail> + Send + Sync>;

/// A left-fold step for [`Expr::reduce`]: `combine(accumulator, suffix)`.
pub type Combine<V> = Arc<dyn Fn(Value<V>, Value<V>) -> Result<Value<V>, ActionFail> + Send + Sync>;

pub(crate) struct ExprNode<V> {
    pub(crate) kind: ExprKind<V>,
    /// Diagnostic name; set at most once, usually by `Rule::define`.
    label: OnceLock<CompactString>,
}

impl<V> ExprNode<V> {
    pub(crate) fn with_parts(kind: ExprKind<V>, label: OnceLock<CompactString>) -> Self {
        Self { kind, label }
    }
}

pub(crate) enum ExprKind<V> {
    /// Terminal matcher.
    Pattern(Pattern),
    /// All children in order; yields `Value::List`.
    Seq(Vec<Expr<V>>),
    /// First matching child wins.
    Choice(Vec<Expr<V>>),
    /// Match both, discard the first.
    Prefix { drop: Expr<V>, keep: Expr<V> },
    /// Match both, discard the second.
    Suffix { keep: Expr<V>, drop: Expr<V> },
    /// Apply an action to the child's result.
    Map { expr: Expr<V>, action: Action<V> },
    /// Zero or one; yields a list of length 0 or 1.
    Opt(Expr<V>),
    /// Bounded or unbounded repetition; yields `Value::List`.
    Repeat {
        expr: Expr<V>,
        min: usize,
        max: Option<usize>,
    },
    /// Left-associative operator chaining without left recursion.
    Reduce {
        base: Expr<V>,
        arms: Vec<(Expr<V>, Combine<V>)>,
    },
    /// Commit: once the child succeeds, the enclosing alternative may not
    /// be backtracked out of; if the child fails, the parse aborts.
    Cut(Expr<V>),
    /// Forward reference resolved through a rule cell.
    Rule(Rule<V>),
    /// End of input.
    Eof,
    /// Always matches without consuming.
    Empty,
}

/// Handle to a combinator node.
pub struct Expr<V>(pub(crate) Arc<ExprNode<V>>);

impl<V> Clone for Expr<V> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<V> std::fmt::Debug for Expr<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expr")
            .field("name", &self.display_name())
            .finish_non_exhaustive()
    }
}

impl<V> Expr<V> {
    fn node(kind: ExprKind<V>) -> Self {
        Self(Arc::new(ExprNode {
            kind,
            label: OnceLock::new(),
        }))
    }

    /// Terminal matching a [`Pattern`].
    #[must_use]
    pub fn pattern(pattern: Pattern) -> Self {
        Self::node(ExprKind::Pattern(pattern))
    }

    /// Terminal matching an exact string.
    #[must_use]
    pub fn literal(text: &str) -> Self {
        Self::pattern(Pattern::literal(text))
    }

    /// Succeeds only at end of input, consuming nothing.
    #[must_use]
    pub fn eof() -> Self {
        Self::node(ExprKind::Eof)
    }

    /// Always succeeds without consuming.
    #[must_use]
    pub fn empty() -> Self {
        Self::node(ExprKind::Empty)
    }

    /// Match all children in order; the result is the list of their values.
    #[must_use]
    pub fn seq<I>(children: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::node(ExprKind::Seq(children.into_iter().collect()))
    }

    /// Ordered choice: try children in order, first success wins.
    #[must_use]
    pub fn choice<I>(children: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::node(ExprKind::Choice(children.into_iter().collect()))
    }

    /// Match `drop` then `keep`, yielding only `keep`'s value.
    #[must_use]
    pub fn prefix(drop: Self, keep: Self) -> Self {
        Self::node(ExprKind::Prefix { drop, keep })
    }

    /// Match `keep` then `drop`, yielding only `keep`'s value.
    #[must_use]
    pub fn suffix(keep: Self, drop: Self) -> Self {
        Self::node(ExprKind::Suffix { keep, drop })
    }

    /// Zero or one occurrence; yields a list of length 0 or 1.
    #[must_use]
    pub fn opt(expr: Self) -> Self {
        Self::node(ExprKind::Opt(expr))
    }

    /// Between `min` and `max` occurrences (`None` = unbounded).
    ///
    /// Fails (restoring the entry position) when fewer than `min` matches
    /// are collected; with `min == 0` it never fails.
    #[must_use]
    pub fn repeat(expr: Self, min: usize, max: Option<usize>) -> Self {
        Self::node(ExprKind::Repeat { expr, min, max })
    }

    /// Zero or more occurrences.
    #[must_use]
    pub fn star(expr: Self) -> Self {
        Self::repeat(expr, 0, None)
    }

    /// One or more occurrences.
    #[must_use]
    pub fn plus(expr: Self) -> Self {
        Self::repeat(expr, 1, None)
    }

    /// Apply an action to this node's successful result.
    ///
    /// The action runs at most once per `(node, position)` pair within a
    /// parse; memoization cache hits return the recorded value without
    /// re-running it, so side effects must not be relied on.
    #[must_use]
    pub fn map<F>(self, action: F) -> Self
    where
        F: Fn(Value<V>) -> Result<Value<V>, ActionFail> + Send + Sync + 'static,
    {
        Self::node(ExprKind::Map {
            expr: self,
            action: Arc::new(action),
        })
    }

    /// Commit past this point: see [`ExprKind::Cut`] semantics in the
    /// engine. Once the wrapped node succeeds, a later failure in the same
    /// alternative is fatal instead of backtrackable.
    #[must_use]
    pub fn cut(self) -> Self {
        Self::node(ExprKind::Cut(self))
    }

    /// Left-associative operator chaining: evaluate `base` once, then fold
    /// matching `(suffix, combine)` arms in order for as long as one
    /// matches. This is the encoding for `expr := expr op term | term`
    /// that a top-down engine cannot express as literal left recursion.
    #[must_use]
    pub fn reduce(base: Self) -> ReduceBuilder<V> {
        ReduceBuilder { base, arms: Vec::new() }
    }

    /// Attach a diagnostic name, used in error traces and expectations.
    ///
    /// The name sticks to this node; a node can only be named once (later
    /// calls are ignored).
    #[must_use]
    pub fn with_label(self, name: &str) -> Self {
        let _ = self.0.label.set(CompactString::new(name));
        self
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub(crate) fn label(&self) -> Option<&CompactString> {
        self.0.label.get()
    }

    pub(crate) fn set_label_if_unset(&self, name: &str) {
        let _ = self.0.label.set(CompactString::new(name));
    }

    /// Diagnostic name: the label when present, otherwise the node kind.
    #[must_use]
    pub(crate) fn display_name(&self) -> String {
        if let Some(label) = self.label() {
            return label.to_string();
        }
        match &self.0.kind {
            ExprKind::Pattern(pattern) => pattern.describe(),
            ExprKind::Seq(_) => String::from("sequence"),
            ExprKind::Choice(_) => String::from("choice"),
            ExprKind::Prefix { .. } | ExprKind::Suffix { .. } => String::from("sequence"),
            ExprKind::Map { .. } => String::from("action"),
            ExprKind::Opt(_) => String::from("optional"),
            ExprKind::Repeat { .. } => String::from("repetition"),
            ExprKind::Reduce { .. } => String::from("reduction"),
            ExprKind::Cut(_) => String::from("committed"),
            ExprKind::Rule(rule) => rule.name().to_string(),
            ExprKind::Eof => String::from("end of input"),
            ExprKind::Empty => String::from("empty"),
        }
    }
}

/// Builder for [`Expr::reduce`], collecting `(suffix, combine)` arms.
pub struct ReduceBuilder<V> {
    base: Expr<V>,
    arms: Vec<(Expr<V>, Combine<V>)>,
}

impl<V> ReduceBuilder<V> {
    /// Add an arm tried in order on each fold step.
    #[must_use]
    pub fn arm<F>(mut self, suffix: Expr<V>, combine: F) -> Self
    where
        F: Fn(Value<V>, Value<V>) -> Result<Value<V>, ActionFail> + Send + Sync + 'static,
    {
        self.arms.push((suffix, Arc::new(combine)));
        self
    }

    /// Finish the reduction node.
    #[must_use]
    pub fn build(self) -> Expr<V> {
        Expr::node(ExprKind::Reduce {
            base: self.base,
            arms: self.arms,
        })
    }
}
