//! End-to-end arithmetic grammar: precedence climbing with nested
//! reduce/choice layers, right-associative exponentiation by plain
//! recursion, and diagnostics for malformed input.

use packrat::{
    parse, parse_complete, ActionFail, CharSet, Expr, ParseError, Pattern, Rule, Value,
};

fn ws() -> Expr<f64> {
    Expr::pattern(Pattern::star(CharSet::whitespace()))
}

/// A whitespace-prefixed literal token.
fn tok(text: &str) -> Expr<f64> {
    Expr::prefix(ws(), Expr::literal(text))
}

fn number() -> Expr<f64> {
    let digits = Pattern::plus(CharSet::digits());
    let pattern = Pattern::seq([
        digits.clone(),
        Pattern::repeat(
            Pattern::seq([Pattern::literal("."), digits]),
            0,
            Some(1),
        ),
    ]);
    Expr::prefix(ws(), Expr::pattern(pattern))
        .map(|v| {
            v.text()
                .and_then(|t| t.parse().ok())
                .map(Value::out)
                .ok_or(ActionFail)
        })
        .with_label("number")
}

fn binop(
    a: Value<f64>,
    b: Value<f64>,
    f: impl Fn(f64, f64) -> f64,
) -> Result<Value<f64>, ActionFail> {
    match (a.into_out(), b.into_out()) {
        (Some(a), Some(b)) => Ok(Value::out(f(a, b))),
        _ => Err(ActionFail),
    }
}

/// expr  := sum
/// sum   := product (('+' | '-') product)*      left-assoc via reduce
/// prod  := unary (('*' | '/') unary)*          left-assoc via reduce
/// unary := ('-' | '+') unary | power
/// power := prim ('**' power)?                  right-assoc via recursion
/// prim  := number | '(' expr ')'
fn arithmetic() -> Expr<f64> {
    let expr: Rule<f64> = Rule::new("expr");
    let prim: Rule<f64> = Rule::new("prim");
    let power: Rule<f64> = Rule::new("power");
    let unary: Rule<f64> = Rule::new("unary");

    prim.define(Expr::choice([
        number(),
        Expr::prefix(tok("("), Expr::suffix(expr.expr(), tok(")"))),
    ]))
    .unwrap();

    power
        .define(Expr::choice([
            Expr::seq([Expr::suffix(prim.expr(), tok("**")), power.expr()]).map(|v| {
                let mut items = v.into_list().ok_or(ActionFail)?;
                let exponent = items.pop().and_then(Value::into_out).ok_or(ActionFail)?;
                let base = items.pop().and_then(Value::into_out).ok_or(ActionFail)?;
                Ok(Value::out(f64::powf(base, exponent)))
            }),
            prim.expr(),
        ]))
        .unwrap();

    unary
        .define(Expr::choice([
            Expr::prefix(tok("-"), unary.expr())
                .map(|v| v.into_out().map(|x| Value::out(-x)).ok_or(ActionFail)),
            Expr::prefix(tok("+"), unary.expr()),
            power.expr(),
        ]))
        .unwrap();

    let product = Expr::reduce(unary.expr())
        .arm(Expr::prefix(tok("*"), unary.expr()), |a, b| {
            binop(a, b, |x, y| x * y)
        })
        .arm(Expr::prefix(tok("/"), unary.expr()), |a, b| {
            binop(a, b, |x, y| x / y)
        })
        .build()
        .with_label("product");

    let sum = Expr::reduce(product.clone())
        .arm(Expr::prefix(tok("+"), product.clone()), |a, b| {
            binop(a, b, |x, y| x + y)
        })
        .arm(Expr::prefix(tok("-"), product), |a, b| {
            binop(a, b, |x, y| x - y)
        })
        .build()
        .with_label("sum");

    expr.define(sum).unwrap();

    // Eat trailing whitespace so complete parses accept "1 + 2 ".
    Expr::suffix(expr.expr(), ws())
}

fn eval(input: &str) -> Result<f64, ParseError> {
    let parsed = parse_complete(&arithmetic(), input)?;
    Ok(parsed.value.into_out().expect("arithmetic yields a number"))
}

#[test]
fn precedence_of_multiplication() {
    assert_eq!(eval("2+3*4").unwrap(), 14.0);
    assert_eq!(eval("3*4+2").unwrap(), 14.0);
}

#[test]
fn exponentiation_is_right_associative() {
    assert_eq!(eval("2**3**2").unwrap(), 512.0);
    assert_eq!(eval("2**3").unwrap(), 8.0);
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(eval("(1+2)*3").unwrap(), 9.0);
    assert_eq!(eval("2*(3+4)").unwrap(), 14.0);
}

#[test]
fn subtraction_reduces_left_to_right() {
    assert_eq!(eval("1-2-3").unwrap(), -4.0);
    assert_eq!(eval("8/4/2").unwrap(), 1.0);
}

#[test]
fn unary_signs_nest() {
    assert_eq!(eval("-5").unwrap(), -5.0);
    assert_eq!(eval("--5").unwrap(), 5.0);
    assert_eq!(eval("2*-3").unwrap(), -6.0);
    assert_eq!(eval("+7").unwrap(), 7.0);
}

#[test]
fn whitespace_is_insignificant() {
    assert_eq!(eval(" 1 + 2 * 3 ").unwrap(), 7.0);
    assert_eq!(eval("( 1 + 2 ) * 3").unwrap(), 9.0);
}

#[test]
fn decimal_numbers() {
    assert_eq!(eval("1.5*2").unwrap(), 3.0);
}

#[test]
fn missing_close_paren_fails_after_last_term() {
    let error = eval("(1+2*3").unwrap_err();
    match &error {
        ParseError::NoMatch {
            offset, expected, ..
        } => {
            // Offset of the furthest failure: immediately after "3".
            assert_eq!(*offset, 6);
            assert!(expected.contains(&"')'".to_string()), "{expected:?}");
        }
        other => panic!("expected NoMatch, got {other:?}"),
    }
    assert!(!error.is_grammar_error());
}

#[test]
fn partial_parse_stops_at_unconsumed_input() {
    let parsed = parse(&arithmetic(), "2+3rest").unwrap();
    assert_eq!(parsed.end, 3);
    assert_eq!(parsed.value, Value::Out(5.0));
}

#[test]
fn garbage_input_is_an_input_error() {
    let error = eval("@").unwrap_err();
    assert!(matches!(error, ParseError::NoMatch { .. }));
    assert!(!error.is_grammar_error());
}

#[test]
fn deeply_nested_parentheses() {
    assert_eq!(eval("((((1))))+1").unwrap(), 2.0);
}
