//! The parse driver.
//!
//! [`parse`] wraps an input string in a fresh [`state::RunState`] — cursor,
//! memo table, recursion guard, call stack — invokes the root combinator,
//! and converts the engine's two-tier failure signal into a public
//! [`ParseError`]. The run state lives exactly as long as one call; the
//! combinator graph is only borrowed and can serve any number of
//! invocations, concurrently or not.

pub(crate) mod engine;
pub(crate) mod state;

use std::time::Instant;

use crate::error::{ParseError, ParseMetrics};
use crate::grammar::Expr;
use crate::value::Value;

/// A successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Parse<V> {
    /// The root combinator's value.
    pub value: Value<V>,
    /// Byte offset reached; input beyond it was not consumed.
    pub end: usize,
    /// Counters for this run.
    pub metrics: ParseMetrics,
}

/// Parse a prefix of `input` with the given combinator.
///
/// Succeeds as soon as the root combinator matches, even if input remains;
/// use [`parse_complete`] to reject partial parses.
///
/// # Errors
///
/// [`ParseError::NoMatch`] when the input does not match, or a fatal
/// variant when the grammar is defective (left recursion, failed cut,
/// undefined rule).
pub fn parse<V: Clone>(expr: &Expr<V>, input: &str) -> Result<Parse<V>, ParseError> {
    let started = Instant::now();
    let mut st = state::RunState::new(input);
    let result = engine::eval(expr, &mut st);
    st.metrics.parse_time = started.elapsed();

    match result {
        Ok(value) => Ok(Parse {
            value,
            end: st.pos,
            metrics: st.metrics,
        }),
        Err(engine::Fail::Miss) => {
            if st.committed {
                Err(st.committed_error())
            } else {
                Err(st.no_match_error())
            }
        }
        Err(engine::Fail::Fatal(error)) => Err(error),
    }
}

/// Parse all of `input`: like [`parse`] but anchored with an explicit
/// end-of-input terminal, so trailing unconsumed input is a failure.
///
/// # Errors
///
/// As for [`parse`].
pub fn parse_complete<V: Clone>(expr: &Expr<V>, input: &str) -> Result<Parse<V>, ParseError> {
    let anchored = Expr::suffix(expr.clone(), Expr::eof());
    parse(&anchored, input)
}
