//! Runtime values produced by formula evaluation.

use std::fmt;

/// A runtime value.
///
/// Scalars come from literals and scalar arithmetic; `Series` and `Bools`
/// are vectorized values with one element per time bar. Missing entries in
/// a `Series` are represented by `f64::NAN`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value (result of an empty program)
    Null,
    /// Scalar boolean from a scalar comparison or logical operation
    Boolean(bool),
    /// Scalar integer
    Integer(i64),
    /// Scalar float
    Float(f64),
    /// Scalar string
    String(String),
    /// Numeric series, one value per row; `NAN` marks a missing entry
    Series(Vec<f64>),
    /// Boolean series from a vectorized comparison or logical operation
    Bools(Vec<bool>),
}

impl Value {
    /// Truthiness used by `IF` conditions and logical operators.
    ///
    /// A series is truthy only when every element is truthy; a missing
    /// entry (`NAN`) is falsy like zero.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Series(values) => values.iter().all(|v| *v != 0.0 && !v.is_nan()),
            Value::Bools(values) => values.iter().all(|b| *b),
        }
    }

    /// Numeric view of a scalar, if it has one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Integer view of a scalar: integers directly, floats only when they
    /// carry no fractional part.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Series(_) => "series",
            Value::Bools(_) => "boolean series",
        }
    }

    /// Length of a vectorized value, `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Series(values) => Some(values.len()),
            Value::Bools(values) => Some(values.len()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Series(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Bools(values) => {
                write!(f, "[")?;
                for (i, b) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", b)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Shifts a series by `periods` rows: positive looks back (earlier rows),
/// negative looks forward. Rows shifted in from outside the data are `NAN`.
pub fn shift(values: &[f64], periods: i64) -> Vec<f64> {
    let len = values.len() as i64;
    (0..len)
        .map(|i| {
            let source = i - periods;
            if source >= 0 && source < len {
                values[source as usize]
            } else {
                f64::NAN
            }
        })
        .collect()
}

#[test]
fn test_shift_pads_with_nan() {
    let shifted = shift(&[1.0, 2.0, 3.0], 1);
    assert!(shifted[0].is_nan());
    assert_eq!(&shifted[1..], &[1.0, 2.0]);

    let forward = shift(&[1.0, 2.0, 3.0], -1);
    assert_eq!(&forward[..2], &[2.0, 3.0]);
    assert!(forward[2].is_nan());
}
