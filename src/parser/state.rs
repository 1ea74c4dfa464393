//! Per-parse mutable state.
//!
//! A [`RunState`] is created by the driver for exactly one parse
//! invocation and dropped when it returns. It owns the cursor, the memo
//! table, the active-evaluation guard set, and the diagnostic call stack;
//! nothing else in the engine holds mutable state. The combinator graph is
//! never touched — independent parses over the same graph need only
//! independent run states.

use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::error::{ParseError, ParseMetrics, TraceFrame};
use crate::value::Value;

/// Memoization key: node identity plus entry position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MemoKey {
    pub(crate) node: usize,
    pub(crate) offset: usize,
}

/// Cached outcome of one `(node, position)` evaluation.
///
/// Entries are write-once: the buffer and node graph are immutable for the
/// run's lifetime, so a recorded outcome can never be invalidated.
#[derive(Debug, Clone)]
pub(crate) enum MemoEntry<V> {
    Success { value: Value<V>, end: usize },
    Failure,
}

/// One call-stack frame: a node under evaluation and where it started.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) node: usize,
    pub(crate) label: Option<CompactString>,
    pub(crate) offset: usize,
}

/// The furthest-position failure seen so far, kept for diagnostics.
///
/// Ordered choice reports the furthest failure rather than the first one;
/// expectations recorded at the same offset are merged.
#[derive(Debug, Clone)]
pub(crate) struct FurthestFailure {
    pub(crate) offset: usize,
    pub(crate) expected: Vec<String>,
    pub(crate) trace: Vec<TraceFrame>,
}

pub(crate) struct RunState<'i, V> {
    pub(crate) input: &'i str,
    pub(crate) pos: usize,
    pub(crate) memo: HashMap<MemoKey, MemoEntry<V>, ahash::RandomState>,
    active: HashSet<MemoKey, ahash::RandomState>,
    stack: SmallVec<[Frame; 32]>,
    pub(crate) furthest: Option<FurthestFailure>,
    /// Set when a cut succeeds; checked at every backtrack point.
    pub(crate) committed: bool,
    pub(crate) metrics: ParseMetrics,
}

impl<'i, V> RunState<'i, V> {
    pub(crate) fn new(input: &'i str) -> Self {
        Self {
            input,
            pos: 0,
            memo: HashMap::with_hasher(ahash::RandomState::new()),
            active: HashSet::with_hasher(ahash::RandomState::new()),
            stack: SmallVec::new(),
            furthest: None,
            committed: false,
            metrics: ParseMetrics::default(),
        }
    }

    /// Left-recursion guard: is this exact node already being evaluated at
    /// this exact position further up the call stack?
    pub(crate) fn is_active(&self, key: MemoKey) -> bool {
        self.active.contains(&key)
    }

    pub(crate) fn push_frame(&mut self, key: MemoKey, label: Option<&CompactString>) {
        self.active.insert(key);
        self.stack.push(Frame {
            node: key.node,
            label: label.cloned(),
            offset: key.offset,
        });
    }

    /// Pop the frame pushed for `key`; runs on every exit path.
    ///
    /// # Errors
    ///
    /// A mismatched frame means a combinator broke the push/pop pairing;
    /// that is a fatal engine defect, not an input error.
    pub(crate) fn pop_frame(&mut self, key: MemoKey) -> Result<(), ParseError> {
        self.active.remove(&key);
        match self.stack.pop() {
            Some(frame) if frame.node == key.node && frame.offset == key.offset => Ok(()),
            _ => Err(ParseError::Internal {
                message: format!("call stack frame mismatch at offset {}", key.offset),
            }),
        }
    }

    /// Snapshot of the labeled frames currently active, outermost first.
    ///
    /// A rule reference and its target carry the same name at the same
    /// offset; consecutive duplicates are collapsed.
    pub(crate) fn trace(&self) -> Vec<TraceFrame> {
        let mut frames: Vec<TraceFrame> = Vec::new();
        for frame in &self.stack {
            if let Some(label) = &frame.label {
                let duplicate = frames
                    .last()
                    .is_some_and(|last| last.rule == *label && last.offset == frame.offset);
                if !duplicate {
                    frames.push(TraceFrame {
                        rule: label.clone(),
                        offset: frame.offset,
                    });
                }
            }
        }
        frames
    }

    /// Record a recoverable miss at the current position for diagnostics.
    ///
    /// Keeps the furthest-position record; at equal offsets the expectation
    /// is merged and the original trace kept.
    pub(crate) fn record_miss(&mut self, expected: Option<String>) {
        let offset = self.pos;
        if let Some(failure) = &mut self.furthest {
            if offset < failure.offset {
                return;
            }
            if offset == failure.offset {
                if let Some(expected) = expected {
                    if !failure.expected.contains(&expected) {
                        failure.expected.push(expected);
                    }
                }
                return;
            }
        }
        let trace = self.trace();
        self.furthest = Some(FurthestFailure {
            offset,
            expected: expected.into_iter().collect(),
            trace,
        });
    }

    /// Build the fatal error for a failure past a cut point.
    pub(crate) fn committed_error(&self) -> ParseError {
        match &self.furthest {
            Some(failure) => ParseError::Committed {
                offset: failure.offset,
                expected: failure.expected.clone(),
                trace: failure.trace.clone(),
            },
            None => ParseError::Committed {
                offset: self.pos,
                expected: Vec::new(),
                trace: self.trace(),
            },
        }
    }

    /// Build the top-level error for a recoverable failure.
    pub(crate) fn no_match_error(&self) -> ParseError {
        match &self.furthest {
            Some(failure) => ParseError::NoMatch {
                offset: failure.offset,
                expected: failure.expected.clone(),
                trace: failure.trace.clone(),
            },
            None => ParseError::NoMatch {
                offset: self.pos,
                expected: Vec::new(),
                trace: Vec::new(),
            },
        }
    }
}
