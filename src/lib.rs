//! # packrat
//!
//! A memoizing ("packrat") recursive-descent parser-combinator engine: a
//! small library of composable parsing primitives over a shared input
//! cursor, with automatic backtracking, left-recursion detection, and
//! diagnostic call-stack tracking.
//!
//! ## Overview
//!
//! - **Grammar construction is pure data construction.** Terminals
//!   ([`Pattern`]) and combinators ([`Expr`]) build an immutable node
//!   graph; recursive rules are wired through [`Rule`] cells in two phases
//!   (declare, then [`Rule::define`]).
//! - **Each `(node, position)` pair is evaluated at most once per run.**
//!   Outcomes — success or failure — are memoized in a per-parse table, so
//!   backtracking over ambiguous alternatives never re-derives work.
//! - **Left recursion is rejected, not looped.** A node re-entered at the
//!   same position fails fatally with [`ParseError::LeftRecursion`];
//!   left-associative operators are written with [`Expr::reduce`] instead.
//! - **Failures come in two tiers.** Recoverable misses drive ordered
//!   choice backtracking; fatal errors (failed [`Expr::cut`], left
//!   recursion, undefined rules) abort the parse and flag a grammar
//!   defect. See [`ParseError::is_grammar_error`].
//!
//! ## Quick start
//!
//! A left-associative sum over integers:
//!
//! ```rust
//! use packrat::{ActionFail, CharSet, Expr, Pattern, Value, parse_complete};
//!
//! // number := [0-9]+
//! let number: Expr<i64> = Expr::pattern(Pattern::plus(CharSet::digits()))
//!     .map(|v| match v.text().and_then(|t| t.parse().ok()) {
//!         Some(n) => Ok(Value::out(n)),
//!         None => Err(ActionFail),
//!     });
//!
//! // sum := number ('+' number)*   folded left-to-right
//! let sum = Expr::reduce(number.clone())
//!     .arm(Expr::prefix(Expr::literal("+"), number), |a, b| {
//!         match (a.into_out(), b.into_out()) {
//!             (Some(a), Some(b)) => Ok(Value::out(a + b)),
//!             _ => Err(ActionFail),
//!         }
//!     })
//!     .build();
//!
//! let parsed = parse_complete(&sum, "1+2+3").unwrap();
//! assert_eq!(parsed.value, Value::Out(6));
//! ```
//!
//! ## Modules
//!
//! - [`grammar`] — terminal patterns, combinator nodes, rule cells
//! - [`parser`] — the parse driver and run metrics
//! - [`error`] — failure types and line/column rendering
//! - [`value`] — the uniform value type threaded through the engine

pub mod error;
pub mod grammar;
pub mod parser;
pub mod value;

pub use error::diagnostics::{format_error_with_location, render, LineCol, LineIndex};
pub use error::{GrammarError, ParseError, ParseMetrics, TraceFrame};
pub use grammar::{Action, CharSet, Combine, Expr, Pattern, ReduceBuilder, Rule};
pub use parser::{parse, parse_complete, Parse};
pub use value::{ActionFail, Value};
