//! Rendering failures against source text: line/column conversion, the
//! caret excerpt, and the rule trace.

use packrat::{
    format_error_with_location, parse_complete, render, CharSet, Expr, ParseError, Pattern, Rule,
};

/// expr := term (('+' | '*') term)*    term := number | '(' expr ')'
fn nested_arithmetic() -> Expr<()> {
    let expr: Rule<()> = Rule::new("expr");
    let term: Rule<()> = Rule::new("term");

    term.define(Expr::choice([
        Expr::pattern(Pattern::plus(CharSet::digits())),
        Expr::seq([Expr::literal("("), expr.expr(), Expr::literal(")")]),
    ]))
    .unwrap();

    let op = Expr::choice([Expr::literal("+"), Expr::literal("*")]);
    expr.define(Expr::seq([
        term.expr(),
        Expr::star(Expr::seq([op, term.expr()])),
    ]))
    .unwrap();

    expr.expr()
}

#[test]
fn render_points_at_the_failure_column() {
    let source = "(1+2*3";
    let error = parse_complete(&nested_arithmetic(), source).unwrap_err();

    let report = render(&error, source);
    assert!(report.starts_with("error: no rule matched at offset 6"), "{report}");
    assert!(report.contains(" --> 1:7"), "{report}");
    assert!(report.contains("1 | (1+2*3"), "{report}");
    assert!(report.contains("expected"), "{report}");
    assert!(report.contains("')'"), "{report}");
}

#[test]
fn render_caret_aligns_under_the_offending_column() {
    let source = "(1+2*3";
    let error = parse_complete(&nested_arithmetic(), source).unwrap_err();
    let report = render(&error, source);

    let excerpt = report
        .lines()
        .find(|line| line.contains("(1+2*3"))
        .unwrap();
    let caret = report.lines().find(|line| line.contains('^')).unwrap();
    // Both lines share the "N | " gutter, so the caret's index is the
    // failing column's index.
    assert_eq!(caret.find('^'), Some(excerpt.find('(').unwrap() + 6));
}

#[test]
fn render_includes_the_rule_trace() {
    let source = "(1+2*3";
    let error = parse_complete(&nested_arithmetic(), source).unwrap_err();
    assert!(!error.trace().is_empty());

    let report = render(&error, source);
    assert!(report.contains("= while parsing expr (1:1)"), "{report}");
}

#[test]
fn failures_on_later_lines_report_the_right_line() {
    let source = "1+\n@";
    let error = parse_complete(&nested_arithmetic(), source).unwrap_err();
    match &error {
        ParseError::NoMatch { offset, .. } => assert_eq!(*offset, 2),
        other => panic!("expected NoMatch, got {other:?}"),
    }

    // A grammar with token-level whitespace skipping reaches line 2; this
    // one fails at the '+'-operand boundary on line 1.
    let compact = format_error_with_location(&error, source, None);
    assert!(compact.starts_with("1:3: "), "{compact}");
}

#[test]
fn whitespace_skipping_grammars_fail_past_newlines() {
    // sum := num ('+' num)* with each token eating leading whitespace.
    let ws = || Expr::<()>::pattern(Pattern::star(CharSet::whitespace()));
    let num = || Expr::prefix(ws(), Expr::pattern(Pattern::plus(CharSet::digits())));
    let sum = Expr::seq([
        num(),
        Expr::star(Expr::seq([Expr::prefix(ws(), Expr::literal("+")), num()])),
    ]);
    let sum = Expr::suffix(sum, ws()).with_label("sum");

    let source = "1+\n@";
    let error = parse_complete(&sum, source).unwrap_err();
    assert_eq!(error.offset(), Some(3));

    let compact = format_error_with_location(&error, source, Some("input.calc"));
    assert!(compact.starts_with("input.calc:2:1: "), "{compact}");
    assert!(compact.contains("no rule matched"), "{compact}");
}

#[test]
fn errors_without_offsets_render_the_message_only() {
    let error = ParseError::Internal {
        message: "frame mismatch".to_string(),
    };
    let report = render(&error, "anything");
    assert_eq!(report, "error: parser invariant violated: frame mismatch\n");
    assert_eq!(
        format_error_with_location(&error, "anything", Some("f")),
        "parser invariant violated: frame mismatch"
    );
}
