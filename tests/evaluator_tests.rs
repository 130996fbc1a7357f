// tests/evaluator_tests.rs

use pretty_assertions::assert_eq;
use tdx_formula::{Context, DataTable, Evaluator, TdxError, Value, parse, tokenize};

fn eval(text: &str, context: &mut Context) -> Result<Value, TdxError> {
    let program = parse(tokenize(text)?)?;
    Evaluator::new(context).evaluate(&program)
}

fn eval_fresh(text: &str) -> Result<Value, TdxError> {
    eval(text, &mut Context::new())
}

fn context_with_table() -> Context {
    let mut context = Context::new();
    let table = DataTable::from_columns([
        ("OPEN", vec![10.0, 11.5, 11.0, 12.5]),
        ("CLOSE", vec![11.0, 11.2, 12.0, 12.2]),
        ("VOLUME", vec![100.0, 200.0, 150.0, 300.0]),
    ])
    .unwrap();
    context.bind_table(table);
    context
}

// ============================================================================
// Scalar arithmetic
// ============================================================================

#[test]
fn test_integer_arithmetic_stays_integer() {
    assert_eq!(eval_fresh("2 + 3 * 4").unwrap(), Value::Integer(14));
    assert_eq!(eval_fresh("10 / 2").unwrap(), Value::Integer(5));
    assert_eq!(eval_fresh("2 ^ 10").unwrap(), Value::Integer(1024));
    assert_eq!(eval_fresh("7 % 3").unwrap(), Value::Integer(1));
}

#[test]
fn test_parentheses_change_the_result() {
    assert_eq!(eval_fresh("1 + 2 * 3").unwrap(), Value::Integer(7));
    assert_eq!(eval_fresh("(1 + 2) * 3").unwrap(), Value::Integer(9));
}

#[test]
fn test_unary_minus_looser_than_power() {
    // -2 ^ 2 is -(2 ^ 2), not (-2) ^ 2.
    assert_eq!(eval_fresh("-2 ^ 2").unwrap(), Value::Integer(-4));
}

#[test]
fn test_inexact_division_widens_to_float() {
    assert_eq!(eval_fresh("7 / 2").unwrap(), Value::Float(3.5));
}

#[test]
fn test_mixed_arithmetic_collapses_whole_results() {
    // 5 / 2.5 is mathematically whole, so it comes back as an integer.
    assert_eq!(eval_fresh("5 / 2.5").unwrap(), Value::Integer(2));
    assert_eq!(eval_fresh("1.5 + 1.5").unwrap(), Value::Integer(3));
    assert_eq!(eval_fresh("1 + 0.25").unwrap(), Value::Float(1.25));
}

#[test]
fn test_unary_negation() {
    assert_eq!(eval_fresh("-5").unwrap(), Value::Integer(-5));
    assert_eq!(eval_fresh("--5").unwrap(), Value::Integer(5));
    assert_eq!(eval_fresh("-(1 + 2.5)").unwrap(), Value::Float(-3.5));
}

#[test]
fn test_scalar_division_by_zero_is_nan() {
    match eval_fresh("1 / 0").unwrap() {
        Value::Float(n) => assert!(n.is_nan()),
        other => panic!("Expected NaN float, got {:?}", other),
    }
    match eval_fresh("5 % 0").unwrap() {
        Value::Float(n) => assert!(n.is_nan()),
        other => panic!("Expected NaN float, got {:?}", other),
    }
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        eval_fresh(r#""buy" + " " + "now""#).unwrap(),
        Value::String("buy now".to_string())
    );
}

#[test]
fn test_string_minus_is_type_error() {
    assert!(matches!(
        eval_fresh(r#""a" - "b""#).unwrap_err(),
        TdxError::Type(_)
    ));
}

// ============================================================================
// Comparisons and logic on scalars
// ============================================================================

#[test]
fn test_scalar_comparisons() {
    assert_eq!(eval_fresh("1 < 2").unwrap(), Value::Boolean(true));
    assert_eq!(eval_fresh("2 <= 2").unwrap(), Value::Boolean(true));
    assert_eq!(eval_fresh("1 = 2").unwrap(), Value::Boolean(false));
    assert_eq!(eval_fresh("1 <> 2").unwrap(), Value::Boolean(true));
    assert_eq!(eval_fresh("2 = 2.0").unwrap(), Value::Boolean(true));
}

#[test]
fn test_string_equality() {
    assert_eq!(eval_fresh(r#""a" = "a""#).unwrap(), Value::Boolean(true));
    assert_eq!(eval_fresh(r#""a" <> "b""#).unwrap(), Value::Boolean(true));
    assert!(matches!(
        eval_fresh(r#""a" < "b""#).unwrap_err(),
        TdxError::Type(_)
    ));
}

#[test]
fn test_scalar_logic() {
    assert_eq!(eval_fresh("1 AND 2").unwrap(), Value::Boolean(true));
    assert_eq!(eval_fresh("1 AND 0").unwrap(), Value::Boolean(false));
    assert_eq!(eval_fresh("0 OR 3").unwrap(), Value::Boolean(true));
    assert_eq!(eval_fresh("NOT 0").unwrap(), Value::Boolean(true));
    assert_eq!(eval_fresh("NOT 7").unwrap(), Value::Boolean(false));
}

// ============================================================================
// Series broadcasting
// ============================================================================

#[test]
fn test_series_scalar_arithmetic() {
    let mut context = context_with_table();
    assert_eq!(
        eval("VOLUME * 2", &mut context).unwrap(),
        Value::Series(vec![200.0, 400.0, 300.0, 600.0])
    );
    assert_eq!(
        eval("1000 - VOLUME", &mut context).unwrap(),
        Value::Series(vec![900.0, 800.0, 850.0, 700.0])
    );
}

#[test]
fn test_series_series_arithmetic() {
    let mut context = context_with_table();
    assert_eq!(
        eval("VOLUME - OPEN", &mut context).unwrap(),
        Value::Series(vec![90.0, 188.5, 139.0, 287.5])
    );
}

#[test]
fn test_series_comparison_yields_bools() {
    let mut context = context_with_table();
    assert_eq!(
        eval("CLOSE > OPEN", &mut context).unwrap(),
        Value::Bools(vec![true, false, true, false])
    );
    assert_eq!(
        eval("VOLUME >= 150", &mut context).unwrap(),
        Value::Bools(vec![false, true, true, true])
    );
}

#[test]
fn test_series_logic_elementwise() {
    let mut context = context_with_table();
    assert_eq!(
        eval("CLOSE > OPEN AND VOLUME >= 150", &mut context).unwrap(),
        Value::Bools(vec![false, false, true, false])
    );
    assert_eq!(
        eval("NOT (CLOSE > OPEN)", &mut context).unwrap(),
        Value::Bools(vec![false, true, false, true])
    );
}

#[test]
fn test_scalar_broadcast_into_series_logic() {
    let mut context = context_with_table();
    assert_eq!(
        eval("CLOSE > OPEN AND 1", &mut context).unwrap(),
        Value::Bools(vec![true, false, true, false])
    );
    assert_eq!(
        eval("0 OR CLOSE > OPEN", &mut context).unwrap(),
        Value::Bools(vec![true, false, true, false])
    );
}

#[test]
fn test_series_length_mismatch_is_value_error() {
    let mut context = context_with_table();
    context.set_variable("SHORT", Value::Series(vec![1.0, 2.0]));
    assert!(matches!(
        eval("CLOSE + SHORT", &mut context).unwrap_err(),
        TdxError::Value(_)
    ));
}

#[test]
fn test_series_division_by_zero_is_nan() {
    let mut context = Context::new();
    context.set_variable("A", Value::Series(vec![4.0, 9.0]));
    context.set_variable("B", Value::Series(vec![2.0, 0.0]));
    match eval("A / B", &mut context).unwrap() {
        Value::Series(values) => {
            assert_eq!(values[0], 2.0);
            assert!(values[1].is_nan());
        }
        other => panic!("Expected series, got {:?}", other),
    }
}

#[test]
fn test_signal_times_series_is_signed_volume() {
    let mut context = context_with_table();
    assert_eq!(
        eval("(CLOSE > OPEN) * VOLUME", &mut context).unwrap(),
        Value::Series(vec![100.0, 0.0, 150.0, 0.0])
    );
}

#[test]
fn test_signal_arithmetic_with_scalar() {
    let mut context = context_with_table();
    // A boolean series counts as 0/1 in arithmetic.
    assert_eq!(
        eval("(CLOSE > OPEN) + 1", &mut context).unwrap(),
        Value::Series(vec![2.0, 1.0, 2.0, 1.0])
    );
}

// ============================================================================
// Historical offset
// ============================================================================

#[test]
fn test_offset_looks_back() {
    let mut context = context_with_table();
    match eval("CLOSE[1]", &mut context).unwrap() {
        Value::Series(values) => {
            assert!(values[0].is_nan());
            assert_eq!(&values[1..], &[11.0, 11.2, 12.0]);
        }
        other => panic!("Expected series, got {:?}", other),
    }
}

#[test]
fn test_negative_offset_looks_forward() {
    let mut context = context_with_table();
    match eval("CLOSE[-1]", &mut context).unwrap() {
        Value::Series(values) => {
            assert_eq!(&values[..3], &[11.2, 12.0, 12.2]);
            assert!(values[3].is_nan());
        }
        other => panic!("Expected series, got {:?}", other),
    }
}

#[test]
fn test_zero_offset_is_identity() {
    let mut context = context_with_table();
    assert_eq!(
        eval("CLOSE[0]", &mut context).unwrap(),
        Value::Series(vec![11.0, 11.2, 12.0, 12.2])
    );
}

#[test]
fn test_offset_on_signal_series() {
    // Yesterday's up-day signal, the usual crossover building block.
    let mut context = context_with_table();
    match eval("(CLOSE > OPEN)[1]", &mut context).unwrap() {
        Value::Series(values) => {
            assert!(values[0].is_nan());
            assert_eq!(&values[1..], &[1.0, 0.0, 1.0]);
        }
        other => panic!("Expected series, got {:?}", other),
    }
}

#[test]
fn test_offset_on_scalar_is_type_error() {
    assert!(matches!(
        eval_fresh("(1 + 2)[1]").unwrap_err(),
        TdxError::Type(_)
    ));
}

#[test]
fn test_series_offset_is_type_error() {
    let mut context = context_with_table();
    assert!(matches!(
        eval("CLOSE[VOLUME]", &mut context).unwrap_err(),
        TdxError::Type(_)
    ));
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn test_conditional_takes_one_branch() {
    assert_eq!(eval_fresh("IF(1 > 0, 10, 20)").unwrap(), Value::Integer(10));
    assert_eq!(eval_fresh("IF(1 < 0, 10, 20)").unwrap(), Value::Integer(20));
}

#[test]
fn test_conditional_short_circuits() {
    // The untaken branch references an unknown name and must not run.
    assert_eq!(
        eval_fresh("IF(1, 42, MISSING)").unwrap(),
        Value::Integer(42)
    );
    assert_eq!(
        eval_fresh("IF(0, MISSING, 42)").unwrap(),
        Value::Integer(42)
    );
    // Even an unregistered call is fine as long as it sits in the dead branch.
    assert_eq!(
        eval_fresh("IF(1 > 2, ERROR_CALL(), 42)").unwrap(),
        Value::Integer(42)
    );
}

#[test]
fn test_series_condition_truthiness() {
    let mut context = Context::new();
    context.set_variable("ALL_UP", Value::Bools(vec![true, true]));
    context.set_variable("SOME_UP", Value::Bools(vec![true, false]));
    assert_eq!(
        eval("IF(ALL_UP, 1, 0)", &mut context).unwrap(),
        Value::Integer(1)
    );
    assert_eq!(
        eval("IF(SOME_UP, 1, 0)", &mut context).unwrap(),
        Value::Integer(0)
    );
}

// ============================================================================
// Statements, assignment, context
// ============================================================================

#[test]
fn test_empty_program_is_null() {
    assert_eq!(eval_fresh("").unwrap(), Value::Null);
    assert_eq!(eval_fresh("\n\n").unwrap(), Value::Null);
}

#[test]
fn test_last_statement_wins() {
    assert_eq!(eval_fresh("1; 2; 3").unwrap(), Value::Integer(3));
}

#[test]
fn test_assignment_persists_across_statements() {
    assert_eq!(eval_fresh("A := 2; B := A * 3; A + B").unwrap(), Value::Integer(8));
}

#[test]
fn test_assignment_yields_value() {
    assert_eq!(eval_fresh("A := 5").unwrap(), Value::Integer(5));
}

#[test]
fn test_variable_shadows_column() {
    let mut context = context_with_table();
    assert_eq!(
        eval("CLOSE := 99; CLOSE", &mut context).unwrap(),
        Value::Integer(99)
    );
}

#[test]
fn test_unknown_name_lists_available() {
    let mut context = context_with_table();
    let err = eval("CLOS", &mut context).unwrap_err();
    match err {
        TdxError::Name { name, available } => {
            assert_eq!(name, "CLOS");
            assert!(available.contains(&"CLOSE".to_string()));
        }
        other => panic!("Expected name error, got {:?}", other),
    }
}

#[test]
fn test_earlier_assignments_survive_failure() {
    let mut context = Context::new();
    let err = eval("A := 7; NO_SUCH_NAME", &mut context).unwrap_err();
    assert!(matches!(err, TdxError::Name { .. }));
    assert_eq!(context.get_variable("A").unwrap(), Value::Integer(7));
}

// ============================================================================
// Registered functions
// ============================================================================

#[test]
fn test_registered_function_dispatch() {
    let mut context = Context::new();
    context.register_function("DOUBLE", |args: &[Value]| match args {
        [Value::Integer(n)] => Ok(Value::Integer(n * 2)),
        [other] => Err(TdxError::Type(format!(
            "DOUBLE expects an integer, got {}",
            other.type_name()
        ))),
        _ => Err(TdxError::Argument {
            function: "DOUBLE".to_string(),
            expected: "1".to_string(),
            actual: args.len(),
        }),
    });

    assert_eq!(eval("double(21)", &mut context).unwrap(), Value::Integer(42));
}

#[test]
fn test_function_errors_propagate_unchanged() {
    let mut context = Context::new();
    context.register_function("PICKY", |args: &[Value]| {
        Err(TdxError::Argument {
            function: "PICKY".to_string(),
            expected: "2".to_string(),
            actual: args.len(),
        })
    });

    match eval("PICKY(1)", &mut context).unwrap_err() {
        TdxError::Argument {
            function, actual, ..
        } => {
            assert_eq!(function, "PICKY");
            assert_eq!(actual, 1);
        }
        other => panic!("Expected argument error, got {:?}", other),
    }
}

#[test]
fn test_unknown_function_is_name_error() {
    assert!(matches!(
        eval_fresh("NOPE(1)").unwrap_err(),
        TdxError::Name { .. }
    ));
}

#[test]
fn test_arguments_evaluate_left_to_right() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let seen: Rc<RefCell<Vec<Value>>> = Rc::new(RefCell::new(Vec::new()));
    let recorder = seen.clone();

    let mut context = Context::new();
    context.register_function("TRACE", move |args: &[Value]| {
        let value = args.first().cloned().unwrap_or(Value::Null);
        recorder.borrow_mut().push(value.clone());
        Ok(value)
    });
    context.register_function("SUM2", |args: &[Value]| {
        match (args.first().and_then(Value::as_int), args.get(1).and_then(Value::as_int)) {
            (Some(a), Some(b)) => Ok(Value::Integer(a + b)),
            _ => Err(TdxError::Argument {
                function: "SUM2".to_string(),
                expected: "2".to_string(),
                actual: args.len(),
            }),
        }
    });

    assert_eq!(
        eval("SUM2(TRACE(1), TRACE(2))", &mut context).unwrap(),
        Value::Integer(3)
    );
    assert_eq!(*seen.borrow(), vec![Value::Integer(1), Value::Integer(2)]);
}
