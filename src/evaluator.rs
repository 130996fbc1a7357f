//! Tree-walking evaluator with scalar/series broadcasting.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::ast::{BinOp, Expr, Program, UnaryOp};
use crate::context::Context;
use crate::error::{Result, TdxError};
use crate::value::{Value, shift};

/// Evaluates a parsed [`Program`] against a [`Context`].
///
/// Statements run strictly in order; assignments made by an earlier
/// statement stay in the context even when a later statement fails.
pub struct Evaluator<'a> {
    context: &'a mut Context,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a mut Context) -> Self {
        Evaluator { context }
    }

    /// Runs every statement and returns the last one's value, or
    /// [`Value::Null`] for an empty program.
    pub fn evaluate(&mut self, program: &Program) -> Result<Value> {
        let mut result = Value::Null;
        for statement in &program.statements {
            result = self.eval_expr(statement)?;
        }
        Ok(result)
    }

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Identifier(name) => self.context.get_variable(name),
            Expr::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                apply_binary(*op, left, right)
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                apply_unary(*op, operand)
            }
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                self.context.call_function(name, &values)
            }
            Expr::Assign { name, value } => {
                let value = self.eval_expr(value)?;
                self.context.set_variable(name, value.clone());
                Ok(value)
            }
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.eval_expr(condition)?;
                if condition.is_truthy() {
                    self.eval_expr(then_branch)
                } else {
                    self.eval_expr(else_branch)
                }
            }
            Expr::Index { base, index } => {
                let base = self.eval_expr(base)?;
                let index = self.eval_expr(index)?;
                apply_index(base, index)
            }
        }
    }
}

fn apply_binary(op: BinOp, left: Value, right: Value) -> Result<Value> {
    match op {
        BinOp::Add
        | BinOp::Subtract
        | BinOp::Multiply
        | BinOp::Divide
        | BinOp::Modulo
        | BinOp::Power => apply_arithmetic(op, left, right),
        BinOp::Equal
        | BinOp::NotEqual
        | BinOp::Greater
        | BinOp::Less
        | BinOp::GreaterEqual
        | BinOp::LessEqual => apply_comparison(op, left, right),
        BinOp::And | BinOp::Or => apply_logical(op, left, right),
    }
}

/// Boolean series take part in arithmetic and offsets as 0/1 numeric
/// series, so `(CLOSE > OPEN) * VOLUME` reads as signed volume.
fn coerce_series(value: Value) -> Value {
    match value {
        Value::Bools(values) => Value::Series(
            values
                .into_iter()
                .map(|b| if b { 1.0 } else { 0.0 })
                .collect(),
        ),
        other => other,
    }
}

fn apply_arithmetic(op: BinOp, left: Value, right: Value) -> Result<Value> {
    match (coerce_series(left), coerce_series(right)) {
        (Value::String(a), Value::String(b)) if op == BinOp::Add => Ok(Value::String(a + &b)),

        (Value::Series(a), Value::Series(b)) => {
            check_lengths(op.symbol(), a.len(), b.len())?;
            Ok(Value::Series(
                a.iter().zip(&b).map(|(x, y)| arith_f64(op, *x, *y)).collect(),
            ))
        }
        (Value::Series(a), Value::Integer(n)) => Ok(broadcast_right(op, &a, n as f64)),
        (Value::Series(a), Value::Float(n)) => Ok(broadcast_right(op, &a, n)),
        (Value::Integer(n), Value::Series(b)) => Ok(broadcast_left(op, n as f64, &b)),
        (Value::Float(n), Value::Series(b)) => Ok(broadcast_left(op, n, &b)),

        (Value::Integer(a), Value::Integer(b)) => Ok(integer_arithmetic(op, a, b)),
        (Value::Integer(a), Value::Float(b)) => Ok(mixed_arithmetic(op, a as f64, b)),
        (Value::Float(a), Value::Integer(b)) => Ok(mixed_arithmetic(op, a, b as f64)),
        (Value::Float(a), Value::Float(b)) => Ok(mixed_arithmetic(op, a, b)),

        (left, right) => Err(TdxError::Type(format!(
            "Cannot apply '{}' to {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn broadcast_right(op: BinOp, series: &[f64], scalar: f64) -> Value {
    Value::Series(series.iter().map(|x| arith_f64(op, *x, scalar)).collect())
}

fn broadcast_left(op: BinOp, scalar: f64, series: &[f64]) -> Value {
    Value::Series(series.iter().map(|x| arith_f64(op, scalar, *x)).collect())
}

/// Elementwise arithmetic. Division and modulo by zero yield `NAN` rather
/// than an error or an infinity, so a single bad row poisons only itself.
fn arith_f64(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        BinOp::Divide => {
            if b == 0.0 {
                f64::NAN
            } else {
                a / b
            }
        }
        BinOp::Modulo => {
            if b == 0.0 {
                f64::NAN
            } else {
                a % b
            }
        }
        BinOp::Power => a.powf(b),
        _ => unreachable!("non-arithmetic operator"),
    }
}

/// Integer-pair arithmetic stays integral where the result is exact and
/// representable, widening to float on overflow or inexact division.
fn integer_arithmetic(op: BinOp, a: i64, b: i64) -> Value {
    match op {
        BinOp::Add => a
            .checked_add(b)
            .map_or(Value::Float(a as f64 + b as f64), Value::Integer),
        BinOp::Subtract => a
            .checked_sub(b)
            .map_or(Value::Float(a as f64 - b as f64), Value::Integer),
        BinOp::Multiply => a
            .checked_mul(b)
            .map_or(Value::Float(a as f64 * b as f64), Value::Integer),
        BinOp::Divide => {
            if b == 0 {
                Value::Float(f64::NAN)
            } else if a % b == 0 {
                Value::Integer(a / b)
            } else {
                Value::Float(a as f64 / b as f64)
            }
        }
        BinOp::Modulo => {
            if b == 0 {
                Value::Float(f64::NAN)
            } else {
                Value::Integer(a % b)
            }
        }
        BinOp::Power => {
            if (0..=u32::MAX as i64).contains(&b) {
                match a.checked_pow(b as u32) {
                    Some(n) => Value::Integer(n),
                    None => Value::Float((a as f64).powf(b as f64)),
                }
            } else {
                Value::Float((a as f64).powf(b as f64))
            }
        }
        _ => unreachable!("non-arithmetic operator"),
    }
}

/// Mixed scalar arithmetic through [`Decimal`], collapsing back to an
/// integer when the result carries no fractional part (`5 / 2.5` is `2`,
/// not `2.0`).
fn mixed_arithmetic(op: BinOp, a: f64, b: f64) -> Value {
    match op {
        BinOp::Power => return Value::Float(a.powf(b)),
        BinOp::Divide | BinOp::Modulo if b == 0.0 => return Value::Float(f64::NAN),
        _ => {}
    }

    if let (Some(da), Some(db)) = (Decimal::from_f64(a), Decimal::from_f64(b)) {
        let exact = match op {
            BinOp::Add => da.checked_add(db),
            BinOp::Subtract => da.checked_sub(db),
            BinOp::Multiply => da.checked_mul(db),
            BinOp::Divide => da.checked_div(db),
            BinOp::Modulo => da.checked_rem(db),
            _ => None,
        };
        if let Some(d) = exact {
            let d = d.normalize();
            if d.is_integer() {
                if let Some(n) = d.to_i64() {
                    return Value::Integer(n);
                }
            }
            if let Some(f) = d.to_f64() {
                return Value::Float(f);
            }
        }
    }

    Value::Float(arith_f64(op, a, b))
}

fn apply_comparison(op: BinOp, left: Value, right: Value) -> Result<Value> {
    match (left, right) {
        (Value::Series(a), Value::Series(b)) => {
            check_lengths(op.symbol(), a.len(), b.len())?;
            Ok(Value::Bools(
                a.iter()
                    .zip(&b)
                    .map(|(x, y)| compare_f64(op, *x, *y))
                    .collect(),
            ))
        }
        (Value::Series(a), Value::Integer(n)) => Ok(compare_series(op, &a, n as f64, false)),
        (Value::Series(a), Value::Float(n)) => Ok(compare_series(op, &a, n, false)),
        (Value::Integer(n), Value::Series(b)) => Ok(compare_series(op, &b, n as f64, true)),
        (Value::Float(n), Value::Series(b)) => Ok(compare_series(op, &b, n, true)),

        (Value::String(a), Value::String(b)) => match op {
            BinOp::Equal => Ok(Value::Boolean(a == b)),
            BinOp::NotEqual => Ok(Value::Boolean(a != b)),
            _ => Err(TdxError::Type(format!(
                "Strings support only '=' and '<>', not '{}'",
                op.symbol()
            ))),
        },

        (left, right) => match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => Ok(Value::Boolean(compare_f64(op, a, b))),
            _ => Err(TdxError::Type(format!(
                "Cannot compare {} with {}",
                left.type_name(),
                right.type_name()
            ))),
        },
    }
}

fn compare_series(op: BinOp, series: &[f64], scalar: f64, flipped: bool) -> Value {
    Value::Bools(
        series
            .iter()
            .map(|x| {
                if flipped {
                    compare_f64(op, scalar, *x)
                } else {
                    compare_f64(op, *x, scalar)
                }
            })
            .collect(),
    )
}

/// IEEE semantics: any comparison against `NAN` is false, except `<>`
/// which is true. A missing row therefore never satisfies a condition.
fn compare_f64(op: BinOp, a: f64, b: f64) -> bool {
    match op {
        BinOp::Equal => a == b,
        BinOp::NotEqual => a != b,
        BinOp::Greater => a > b,
        BinOp::Less => a < b,
        BinOp::GreaterEqual => a >= b,
        BinOp::LessEqual => a <= b,
        _ => unreachable!("non-comparison operator"),
    }
}

/// `AND`/`OR` evaluate both sides eagerly. When either side is vectorized
/// the result is a boolean series, with a scalar side broadcast by its
/// truthiness.
fn apply_logical(op: BinOp, left: Value, right: Value) -> Result<Value> {
    match (truth_vector(&left), truth_vector(&right)) {
        (Some(a), Some(b)) => {
            check_lengths(op.symbol(), a.len(), b.len())?;
            Ok(Value::Bools(
                a.iter().zip(&b).map(|(x, y)| logic(op, *x, *y)).collect(),
            ))
        }
        (Some(a), None) => {
            let t = right.is_truthy();
            Ok(Value::Bools(a.iter().map(|x| logic(op, *x, t)).collect()))
        }
        (None, Some(b)) => {
            let t = left.is_truthy();
            Ok(Value::Bools(b.iter().map(|y| logic(op, t, *y)).collect()))
        }
        (None, None) => Ok(Value::Boolean(logic(
            op,
            left.is_truthy(),
            right.is_truthy(),
        ))),
    }
}

fn logic(op: BinOp, a: bool, b: bool) -> bool {
    match op {
        BinOp::And => a && b,
        BinOp::Or => a || b,
        _ => unreachable!("non-logical operator"),
    }
}

/// Per-element truthiness of a vectorized value, `None` for scalars.
fn truth_vector(value: &Value) -> Option<Vec<bool>> {
    match value {
        Value::Series(values) => Some(values.iter().map(|v| *v != 0.0 && !v.is_nan()).collect()),
        Value::Bools(values) => Some(values.clone()),
        _ => None,
    }
}

fn apply_unary(op: UnaryOp, operand: Value) -> Result<Value> {
    match op {
        UnaryOp::Negate => match operand {
            Value::Integer(n) => Ok(n
                .checked_neg()
                .map_or(Value::Float(-(n as f64)), Value::Integer)),
            Value::Float(n) => Ok(Value::Float(-n)),
            Value::Series(values) => Ok(Value::Series(values.iter().map(|v| -v).collect())),
            other => Err(TdxError::Type(format!(
                "Cannot negate {}",
                other.type_name()
            ))),
        },
        UnaryOp::Not => match operand {
            Value::Series(values) => Ok(Value::Bools(
                values.iter().map(|v| *v == 0.0 || v.is_nan()).collect(),
            )),
            Value::Bools(values) => Ok(Value::Bools(values.iter().map(|b| !b).collect())),
            scalar => Ok(Value::Boolean(!scalar.is_truthy())),
        },
    }
}

/// `EXPR[n]`: shift a series `n` rows back (negative `n` looks forward).
fn apply_index(base: Value, index: Value) -> Result<Value> {
    let values = match coerce_series(base) {
        Value::Series(values) => values,
        other => {
            return Err(TdxError::Type(format!(
                "Historical offset requires a series, got {}",
                other.type_name()
            )));
        }
    };
    let periods = index.as_int().ok_or_else(|| {
        TdxError::Type(format!(
            "Historical offset must be an integer, got {}",
            index.type_name()
        ))
    })?;
    Ok(Value::Series(shift(&values, periods)))
}

fn check_lengths(operator: &str, left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(TdxError::Value(format!(
            "Series length mismatch for '{}': {} vs {}",
            operator, left, right
        )));
    }
    Ok(())
}
