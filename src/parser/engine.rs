//! Node evaluation: the memoizing wrapper and per-variant logic.
//!
//! Every node evaluation routes through [`eval`], which owns the four
//! engine-wide invariants:
//!
//! 1. a `(node, position)` pair already on the call stack fails fatally
//!    with left recursion instead of descending forever;
//! 2. a `(node, position)` pair is evaluated at most once per run — later
//!    lookups replay the memoized outcome (without re-running actions);
//! 3. a recoverable failure restores the entry position, so no combinator
//!    performs ad hoc rollback;
//! 4. the call-stack frame pushed on entry is popped on every exit path.
//!
//! Backtrack points (choice alternatives, optional, repeat iterations,
//! reduce arms) evaluate their attempt through [`attempt`], which scopes
//! the cut/commit flag: a recoverable failure from an attempt that
//! committed escalates to a fatal error instead of being backtracked.

use compact_str::CompactString;

use crate::error::ParseError;
use crate::grammar::{Expr, ExprKind};
use crate::parser::state::{MemoEntry, MemoKey, RunState};
use crate::value::Value;

/// Internal failure signal; recoverable misses carry no payload because
/// the run state tracks the furthest-failure diagnostic separately.
pub(crate) enum Fail {
    Miss,
    Fatal(ParseError),
}

/// Evaluate a node through the memoization and recursion-guard wrapper.
pub(crate) fn eval<V: Clone>(expr: &Expr<V>, st: &mut RunState<'_, V>) -> Result<Value<V>, Fail> {
    let key = MemoKey {
        node: expr.id(),
        offset: st.pos,
    };

    if st.is_active(key) {
        return Err(Fail::Fatal(ParseError::LeftRecursion {
            rule: expr.display_name(),
            offset: st.pos,
            trace: st.trace(),
        }));
    }

    // Cut nodes are not memoized: the commit flag lives in run state and
    // cannot be replayed from a cache entry.
    let memoizable = !matches!(expr.0.kind, ExprKind::Cut(_));

    if memoizable {
        if let Some(entry) = st.memo.get(&key) {
            st.metrics.memo_hits += 1;
            return match entry.clone() {
                MemoEntry::Success { value, end } => {
                    st.pos = end;
                    Ok(value)
                }
                MemoEntry::Failure => Err(Fail::Miss),
            };
        }
    }

    st.metrics.nodes_evaluated += 1;
    st.push_frame(key, expr.label());
    let result = eval_kind(expr, st);
    if let Err(error) = st.pop_frame(key) {
        return Err(Fail::Fatal(error));
    }

    match result {
        Ok(value) => {
            if memoizable {
                st.memo.insert(
                    key,
                    MemoEntry::Success {
                        value: value.clone(),
                        end: st.pos,
                    },
                );
            }
            Ok(value)
        }
        Err(Fail::Miss) => {
            st.pos = key.offset;
            if memoizable {
                st.memo.insert(key, MemoEntry::Failure);
            }
            Err(Fail::Miss)
        }
        Err(fatal) => Err(fatal),
    }
}

/// Evaluate a backtrackable attempt in a fresh commit scope.
///
/// A miss from an attempt that set the commit flag is not backtrackable:
/// it escalates to [`ParseError::Committed`]. A successful attempt drops
/// its commit flag — the cut's scope ends at the nearest backtrack point.
pub(crate) fn attempt<V: Clone>(
    expr: &Expr<V>,
    st: &mut RunState<'_, V>,
) -> Result<Value<V>, Fail> {
    let saved = std::mem::replace(&mut st.committed, false);
    let result = eval(expr, st);
    let committed = st.committed;
    st.committed = saved;
    match result {
        Err(Fail::Miss) if committed => Err(Fail::Fatal(st.committed_error())),
        other => other,
    }
}

fn eval_kind<V: Clone>(expr: &Expr<V>, st: &mut RunState<'_, V>) -> Result<Value<V>, Fail> {
    match &expr.0.kind {
        ExprKind::Pattern(pattern) => {
            st.metrics.terminal_matches += 1;
            match pattern.match_at(st.input, st.pos) {
                Some(end) => {
                    let text = CompactString::new(&st.input[st.pos..end]);
                    st.pos = end;
                    Ok(Value::Text(text))
                }
                None => {
                    let expected = expr
                        .label()
                        .map_or_else(|| pattern.describe(), ToString::to_string);
                    st.record_miss(Some(expected));
                    Err(Fail::Miss)
                }
            }
        }

        ExprKind::Eof => {
            if st.pos == st.input.len() {
                Ok(Value::Text(CompactString::default()))
            } else {
                st.record_miss(Some(String::from("end of input")));
                Err(Fail::Miss)
            }
        }

        ExprKind::Empty => Ok(Value::Text(CompactString::default())),

        ExprKind::Seq(children) => {
            let mut items = Vec::with_capacity(children.len());
            for child in children {
                items.push(eval(child, st)?);
            }
            Ok(Value::List(items))
        }

        ExprKind::Choice(children) => {
            for child in children {
                match attempt(child, st) {
                    Ok(value) => return Ok(value),
                    // Entry position was restored by the child's wrapper.
                    Err(Fail::Miss) => {}
                    Err(fatal) => return Err(fatal),
                }
            }
            Err(Fail::Miss)
        }

        ExprKind::Prefix { drop, keep } => {
            eval(drop, st)?;
            eval(keep, st)
        }

        ExprKind::Suffix { keep, drop } => {
            let value = eval(keep, st)?;
            eval(drop, st)?;
            Ok(value)
        }

        ExprKind::Map { expr: child, action } => {
            let value = eval(child, st)?;
            match (action)(value) {
                Ok(value) => Ok(value),
                Err(_) => {
                    st.record_miss(expr.label().map(ToString::to_string));
                    Err(Fail::Miss)
                }
            }
        }

        ExprKind::Opt(child) => match attempt(child, st) {
            Ok(value) => Ok(Value::List(vec![value])),
            Err(Fail::Miss) => Ok(Value::List(Vec::new())),
            Err(fatal) => Err(fatal),
        },

        ExprKind::Repeat {
            expr: child,
            min,
            max,
        } => {
            let mut items = Vec::new();
            loop {
                if let Some(limit) = max {
                    if items.len() >= *limit {
                        break;
                    }
                }
                let before = st.pos;
                match attempt(child, st) {
                    Ok(value) => {
                        items.push(value);
                        // A zero-width match would repeat forever.
                        if st.pos == before {
                            break;
                        }
                    }
                    Err(Fail::Miss) => break,
                    Err(fatal) => return Err(fatal),
                }
            }
            if items.len() < *min {
                Err(Fail::Miss)
            } else {
                Ok(Value::List(items))
            }
        }

        ExprKind::Reduce { base, arms } => {
            let mut acc = eval(base, st)?;
            'fold: loop {
                for (suffix, combine) in arms {
                    let before = st.pos;
                    match attempt(suffix, st) {
                        Ok(value) => {
                            // A zero-width suffix would fold forever.
                            if st.pos == before {
                                break 'fold;
                            }
                            match (combine)(acc, value) {
                                Ok(next) => acc = next,
                                Err(_) => {
                                    st.record_miss(None);
                                    return Err(Fail::Miss);
                                }
                            }
                            continue 'fold;
                        }
                        Err(Fail::Miss) => {}
                        Err(fatal) => return Err(fatal),
                    }
                }
                break;
            }
            Ok(acc)
        }

        ExprKind::Cut(child) => match eval(child, st) {
            Ok(value) => {
                st.committed = true;
                Ok(value)
            }
            Err(Fail::Miss) => Err(Fail::Fatal(st.committed_error())),
            Err(fatal) => Err(fatal),
        },

        ExprKind::Rule(rule) => match rule.target() {
            Some(target) => eval(target, st),
            None => Err(Fail::Fatal(ParseError::UndefinedRule {
                name: rule.name().to_string(),
                offset: st.pos,
            })),
        },
    }
}
