use std::{cmp::Ordering, io::Write};

use crate::{
    runtime::{environment::Environment, errors::EvalError, value::Value},
    syntax::{Expression, InfixOperator},
};

use super::{Completion, EvalResult, Interpreter};

impl<W: Write> Interpreter<W> {
    pub(super) fn evaluate_comparison(
        &mut self,
        kind: &'static str,
        operator: InfixOperator,
        left: &Expression,
        right: &Expression,
        env: &Environment,
    ) -> EvalResult {
        let left = proceed!(self.evaluate_operand(left, env, kind)?);
        let right = proceed!(self.evaluate_operand(right, &left.env, kind)?);
        let value = compare(kind, operator, &left.value, &right.value)?;
        Ok(Completion::normal(Value::Bool(value), right.env))
    }

    pub(super) fn evaluate_string_comparison(
        &mut self,
        kind: &'static str,
        operator: InfixOperator,
        left: &Expression,
        right: &Expression,
        env: &Environment,
    ) -> EvalResult {
        let left = proceed!(self.evaluate_operand(left, env, kind)?);
        let right = proceed!(self.evaluate_operand(right, &left.env, kind)?);
        let result = match (&left.value, &right.value) {
            (Value::String(l), Value::String(r)) => match operator {
                InfixOperator::StringLess => l < r,
                _ => l == r,
            },
            (l, r) => {
                return Err(EvalError::type_error(
                    kind,
                    format!(
                        "expected two strings, got {} and {}",
                        l.type_name(),
                        r.type_name()
                    ),
                ));
            }
        };
        Ok(Completion::normal(Value::Bool(result), right.env))
    }
}

pub(super) fn compare(
    kind: &'static str,
    operator: InfixOperator,
    left: &Value,
    right: &Value,
) -> Result<bool, EvalError> {
    let ordering = match (left, right) {
        (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
        (Value::Int(l), Value::Float(r)) => (*l as f32).partial_cmp(r),
        (Value::Float(l), Value::Int(r)) => l.partial_cmp(&(*r as f32)),
        (Value::Float(l), Value::Float(r)) => l.partial_cmp(r),
        _ if operator == InfixOperator::Equals => return equal_non_numeric(kind, left, right),
        _ => return Err(mismatch(kind, operator, left, right)),
    };

    // NaN compares unequal and unordered to everything.
    let Some(ordering) = ordering else {
        return Ok(false);
    };
    Ok(match operator {
        InfixOperator::Equals => ordering == Ordering::Equal,
        InfixOperator::LessThan => ordering == Ordering::Less,
        InfixOperator::GreaterThan => ordering == Ordering::Greater,
        InfixOperator::LessEq => ordering != Ordering::Greater,
        InfixOperator::GreaterEq => ordering != Ordering::Less,
        _ => return Err(mismatch(kind, operator, left, right)),
    })
}

fn equal_non_numeric(kind: &'static str, left: &Value, right: &Value) -> Result<bool, EvalError> {
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => Ok(l == r),
        (Value::String(l), Value::String(r)) => Ok(l == r),
        (Value::Id(l), Value::Id(r)) => Ok(l == r),
        (Value::Void, Value::Void) => Ok(true),
        _ => Err(mismatch(kind, InfixOperator::Equals, left, right)),
    }
}

fn mismatch(kind: &'static str, operator: InfixOperator, left: &Value, right: &Value) -> EvalError {
    EvalError::type_error(
        kind,
        format!(
            "cannot compare {} {} {}",
            left.type_name(),
            operator.symbol(),
            right.type_name()
        ),
    )
}
