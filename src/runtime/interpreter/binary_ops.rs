use std::{io::Write, rc::Rc};

use crate::{
    runtime::{environment::Environment, errors::EvalError, value::Value},
    syntax::{Expression, InfixOperator},
};

use super::{Completion, EvalResult, Interpreter};

impl<W: Write> Interpreter<W> {
    pub(super) fn evaluate_arithmetic(
        &mut self,
        kind: &'static str,
        operator: InfixOperator,
        left: &Expression,
        right: &Expression,
        env: &Environment,
    ) -> EvalResult {
        let left = proceed!(self.evaluate_operand(left, env, kind)?);
        let right = proceed!(self.evaluate_operand(right, &left.env, kind)?);
        let value = apply_arithmetic(kind, operator, &left.value, &right.value)?;
        Ok(Completion::normal(value, right.env))
    }
}

pub(super) fn apply_arithmetic(
    kind: &'static str,
    operator: InfixOperator,
    left: &Value,
    right: &Value,
) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => integer_arithmetic(kind, operator, *l, *r),
        (Value::Int(l), Value::Float(r)) => Ok(float_arithmetic(operator, *l as f32, *r)),
        (Value::Float(l), Value::Int(r)) => Ok(float_arithmetic(operator, *l, *r as f32)),
        (Value::Float(l), Value::Float(r)) => Ok(float_arithmetic(operator, *l, *r)),
        (Value::String(l), Value::String(r)) if operator == InfixOperator::Add => {
            Ok(Value::String(Rc::from(format!("{}{}", l, r))))
        }
        _ => Err(EvalError::type_error(
            kind,
            format!(
                "cannot apply `{}` to {} and {}",
                operator.symbol(),
                left.type_name(),
                right.type_name()
            ),
        )),
    }
}

fn integer_arithmetic(
    kind: &'static str,
    operator: InfixOperator,
    l: i32,
    r: i32,
) -> Result<Value, EvalError> {
    let result = match operator {
        InfixOperator::Add => l.wrapping_add(r),
        InfixOperator::Sub => l.wrapping_sub(r),
        InfixOperator::Mult => l.wrapping_mul(r),
        InfixOperator::Div => {
            if r == 0 {
                return Err(EvalError::DivisionByZero { expression: kind });
            }
            l.wrapping_div(r)
        }
        _ => return Err(EvalError::type_error(kind, "not an arithmetic operator")),
    };
    Ok(Value::Int(result))
}

fn float_arithmetic(operator: InfixOperator, l: f32, r: f32) -> Value {
    let result = match operator {
        InfixOperator::Add => l + r,
        InfixOperator::Sub => l - r,
        InfixOperator::Mult => l * r,
        _ => l / r,
    };
    Value::Float(result)
}
