// tests/integration_tests.rs
//
// End-to-end scenarios through the Interpreter façade: bind a table,
// register indicator functions, evaluate multi-statement formulas.

use pretty_assertions::assert_eq;
use tdx_formula::{DataTable, Interpreter, TdxError, Value};

fn sample_table() -> DataTable {
    DataTable::from_columns([
        ("OPEN", vec![10.0, 10.5, 11.0, 11.5, 11.0]),
        ("HIGH", vec![10.8, 11.2, 11.6, 12.0, 11.9]),
        ("LOW", vec![9.8, 10.3, 10.9, 11.2, 10.8]),
        ("CLOSE", vec![10.5, 11.0, 11.5, 11.2, 11.8]),
        ("VOLUME", vec![1000.0, 1200.0, 900.0, 1500.0, 1100.0]),
    ])
    .unwrap()
}

/// Simple moving average over the trailing `period` rows; rows without a
/// full window are NaN. Window math follows the usual indicator contract.
fn moving_average(args: &[Value]) -> Result<Value, TdxError> {
    let (values, period) = match args {
        [Value::Series(values), period] => match period.as_int() {
            Some(p) if p > 0 => (values, p as usize),
            _ => {
                return Err(TdxError::Value(
                    "MA period must be a positive integer".to_string(),
                ));
            }
        },
        [other, _] => {
            return Err(TdxError::Type(format!(
                "MA expects a series, got {}",
                other.type_name()
            )));
        }
        _ => {
            return Err(TdxError::Argument {
                function: "MA".to_string(),
                expected: "2".to_string(),
                actual: args.len(),
            });
        }
    };

    let out = (0..values.len())
        .map(|i| {
            if i + 1 < period {
                f64::NAN
            } else {
                values[i + 1 - period..=i].iter().sum::<f64>() / period as f64
            }
        })
        .collect();
    Ok(Value::Series(out))
}

fn interpreter_with_data() -> Interpreter {
    let mut interp = Interpreter::new();
    interp.bind_table(sample_table());
    interp.register_function("MA", moving_average);
    interp
}

// ============================================================================
// Whole-pipeline evaluation
// ============================================================================

#[test]
fn test_up_day_signal() {
    let mut interp = interpreter_with_data();
    assert_eq!(
        interp.evaluate("CLOSE > OPEN").unwrap(),
        Value::Bools(vec![true, true, true, false, true])
    );
}

#[test]
fn test_multi_statement_formula() {
    let mut interp = interpreter_with_data();
    let result = interp
        .evaluate("RANGE := HIGH - LOW;\nWIDE := RANGE > 0.5\nWIDE AND VOLUME > 1000")
        .unwrap();
    assert_eq!(result, Value::Bools(vec![false, true, false, true, true]));
}

#[test]
fn test_moving_average_crossover() {
    let mut interp = interpreter_with_data();
    let result = interp.evaluate("MA2 := MA(CLOSE, 2); CLOSE > MA2").unwrap();
    // MA2 = [NaN, 10.75, 11.25, 11.35, 11.5]; NaN comparisons are false.
    assert_eq!(result, Value::Bools(vec![false, true, true, false, true]));
}

#[test]
fn test_yesterday_reference() {
    let mut interp = interpreter_with_data();
    let result = interp.evaluate("CLOSE > CLOSE[1]").unwrap();
    assert_eq!(result, Value::Bools(vec![false, true, true, false, true]));
}

#[test]
fn test_case_insensitive_end_to_end() {
    let mut interp = interpreter_with_data();
    let upper = interp.evaluate("MA(CLOSE, 2)").unwrap();
    let lower = interp.evaluate("ma(close, 2)").unwrap();
    match (upper, lower) {
        (Value::Series(a), Value::Series(b)) => {
            assert!(a[0].is_nan() && b[0].is_nan());
            assert_eq!(&a[1..], &b[1..]);
        }
        other => panic!("Expected two series, got {:?}", other),
    }
}

#[test]
fn test_conditional_signal() {
    let mut interp = Interpreter::new();
    assert_eq!(
        interp.evaluate(r#"IF(2 > 1, "long", "short")"#).unwrap(),
        Value::String("long".to_string())
    );
}

// ============================================================================
// Session state
// ============================================================================

#[test]
fn test_assignments_persist_across_calls() {
    let mut interp = interpreter_with_data();
    interp.evaluate("THRESHOLD := 1000").unwrap();
    assert_eq!(
        interp.evaluate("VOLUME > THRESHOLD").unwrap(),
        Value::Bools(vec![false, true, false, true, true])
    );
}

#[test]
fn test_rebinding_table_keeps_variables() {
    let mut interp = interpreter_with_data();
    interp.evaluate("LIMIT := 3").unwrap();

    let smaller = DataTable::from_columns([("CLOSE", vec![1.0, 5.0])]).unwrap();
    interp.bind_table(smaller);

    assert_eq!(
        interp.evaluate("CLOSE > LIMIT").unwrap(),
        Value::Bools(vec![false, true])
    );
}

#[test]
fn test_clear_drops_variables_but_not_functions() {
    let mut interp = interpreter_with_data();
    interp.evaluate("X := 1").unwrap();
    interp.context_mut().clear();

    assert!(!interp.context().has_variable("X"));
    assert!(interp.context().has_function("MA"));
    assert!(matches!(
        interp.evaluate("X").unwrap_err(),
        TdxError::Name { .. }
    ));
}

// ============================================================================
// Validation and error surfaces
// ============================================================================

#[test]
fn test_validate_checks_syntax_only() {
    let interp = Interpreter::new();
    assert!(interp.validate("MA(CLOSE, 5) > MA(CLOSE, 10)"));
    // Unknown names are a runtime concern, not a syntax one.
    assert!(interp.validate("NO_SUCH_FUNCTION(NO_SUCH_COLUMN)"));
    assert!(!interp.validate("1 +"));
    assert!(!interp.validate("IF(A, 1"));
    assert!(!interp.validate("2 @ 2"));
}

#[test]
fn test_syntax_error_carries_location() {
    let mut interp = Interpreter::new();
    match interp.evaluate("1 + 2\n2 +").unwrap_err() {
        TdxError::Syntax { line, .. } => assert_eq!(line, 2),
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_name_error_suggests_close_matches() {
    let mut interp = interpreter_with_data();
    let err = interp.evaluate("CLOS + 1").unwrap_err();
    let hint = err.suggestion().unwrap();
    assert!(hint.contains("CLOSE"), "hint was: {}", hint);
}

#[test]
fn test_bad_period_error_from_function() {
    let mut interp = interpreter_with_data();
    assert!(matches!(
        interp.evaluate("MA(CLOSE, 0)").unwrap_err(),
        TdxError::Value(_)
    ));
    assert!(matches!(
        interp.evaluate("MA(CLOSE)").unwrap_err(),
        TdxError::Argument { .. }
    ));
}

#[test]
fn test_error_messages_are_readable() {
    let mut interp = Interpreter::new();
    let err = interp.evaluate("NOPE(1)").unwrap_err();
    assert_eq!(err.to_string(), "Name 'NOPE' is not defined");
}
