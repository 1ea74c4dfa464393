//! The uniform value type threaded through the engine.
//!
//! Every combinator produces a [`Value`]: terminals yield the matched text,
//! sequences and repetitions yield lists, and actions yield semantic values
//! of the grammar author's type `V`. Keeping the engine's result type
//! uniform is what lets a single node graph mix raw text, collected lists,
//! and finished semantic values.

use compact_str::CompactString;

/// Result of evaluating a combinator node.
///
/// `V` is the grammar author's semantic value type (an AST node, a number,
/// whatever actions produce). Values are cloned on memoization cache hits,
/// so `V` should be cheap to clone or internally reference-counted.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<V> {
    /// Raw text matched by a terminal (also the empty text of `Eof`/`Empty`).
    Text(CompactString),
    /// Ordered results of a sequence, repetition, or optional.
    List(Vec<Value<V>>),
    /// Semantic value produced by an action.
    Out(V),
}

impl<V> Value<V> {
    /// Wrap a semantic value.
    #[must_use]
    pub const fn out(value: V) -> Self {
        Self::Out(value)
    }

    /// The matched text, if this is a terminal result.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The semantic value, if this is an action result.
    #[must_use]
    pub fn out_ref(&self) -> Option<&V> {
        match self {
            Self::Out(value) => Some(value),
            _ => None,
        }
    }

    /// Consume a list result.
    #[must_use]
    pub fn into_list(self) -> Option<Vec<Value<V>>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Consume a semantic value.
    #[must_use]
    pub fn into_out(self) -> Option<V> {
        match self {
            Self::Out(value) => Some(value),
            _ => None,
        }
    }
}

/// Recoverable rejection raised by an action or reduce combiner.
///
/// An action may decide that a syntactically valid match is semantically
/// unacceptable (a keyword where an identifier is required, an out-of-range
/// numeric literal). Returning `ActionFail` makes the enclosing node fail
/// exactly as if its child had not matched, so an ordered choice can move
/// on to its next alternative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionFail;
