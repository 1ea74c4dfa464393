//! Grammar definition: terminal patterns, combinator nodes, and rule cells.
//!
//! A grammar is an immutable graph of [`Expr`] nodes. Recursive and
//! mutually recursive rules need cycles in that graph, which are built in
//! two phases: declare [`Rule`] placeholders first, wire everything with
//! [`Rule::expr`], then assign each rule's body once with [`Rule::define`].
//! After construction the graph is read-only and may be shared by any
//! number of concurrent parses.

mod expr;
mod pattern;

pub use expr::{Action, Combine, Expr, ReduceBuilder};
pub use pattern::{CharSet, Pattern};

pub(crate) use expr::ExprKind;

use std::sync::{Arc, OnceLock};

use compact_str::CompactString;

use crate::error::GrammarError;

struct RuleInner<V> {
    name: CompactString,
    target: OnceLock<Expr<V>>,
}

/// A named forward-reference cell for recursive rules.
///
/// # Example
///
/// ```rust
/// use packrat::{Expr, Rule};
///
/// // list := '[' list? ']'
/// let list: Rule<()> = Rule::new("list");
/// let body = Expr::seq([
///     Expr::literal("["),
///     Expr::opt(list.expr()),
///     Expr::literal("]"),
/// ]);
/// list.define(body).unwrap();
///
/// assert!(packrat::parse_complete(&list.expr(), "[[]]").is_ok());
/// ```
pub struct Rule<V> {
    inner: Arc<RuleInner<V>>,
}

impl<V> Clone for Rule<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> std::fmt::Debug for Rule<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name())
            .field("defined", &self.target().is_some())
            .finish()
    }
}

impl<V> Rule<V> {
    /// Declare an as-yet-undefined rule.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            inner: Arc::new(RuleInner {
                name: CompactString::new(name),
                target: OnceLock::new(),
            }),
        }
    }

    /// The rule's name, as used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Assign the rule's body. Write-once: a second call is an error.
    ///
    /// The body inherits the rule's name as its diagnostic label unless it
    /// already carries one, so left-recursion reports and failure traces
    /// name the rule the grammar author wrote.
    ///
    /// # Errors
    ///
    /// [`GrammarError::AlreadyDefined`] if the rule has a body.
    pub fn define(&self, body: Expr<V>) -> Result<(), GrammarError> {
        body.set_label_if_unset(self.name());
        self.inner
            .target
            .set(body)
            .map_err(|_| GrammarError::AlreadyDefined {
                name: self.name().to_string(),
            })
    }

    /// A node referencing this rule, usable before [`Rule::define`].
    #[must_use]
    pub fn expr(&self) -> Expr<V> {
        Expr(Arc::new(expr_node_for_rule(self.clone())))
    }

    pub(crate) fn target(&self) -> Option<&Expr<V>> {
        self.inner.target.get()
    }
}

fn expr_node_for_rule<V>(rule: Rule<V>) -> expr::ExprNode<V> {
    let label = OnceLock::new();
    let _ = label.set(CompactString::new(rule.name()));
    expr::ExprNode::with_parts(expr::ExprKind::Rule(rule), label)
}
