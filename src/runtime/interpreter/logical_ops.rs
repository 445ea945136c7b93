use std::io::Write;

use crate::{
    runtime::{environment::Environment, errors::EvalError, value::Value},
    syntax::{Expression, InfixOperator},
};

use super::{Completion, EvalResult, Interpreter};

impl<W: Write> Interpreter<W> {
    /// `Not` discards bindings its operand introduced: the result is chained
    /// onto the environment the `Not` was entered with.
    pub(super) fn evaluate_not(&mut self, operand: &Expression, env: &Environment) -> EvalResult {
        let evaluated = proceed!(self.evaluate_operand(operand, env, "Not")?);
        match evaluated.value {
            Value::Bool(value) => Ok(Completion::normal(Value::Bool(!value), env.clone())),
            other => Err(EvalError::expected("Not", "Bool", other.type_name())),
        }
    }

    pub(super) fn evaluate_logical(
        &mut self,
        kind: &'static str,
        operator: InfixOperator,
        left: &Expression,
        right: &Expression,
        env: &Environment,
    ) -> EvalResult {
        let left = proceed!(self.evaluate_operand(left, env, kind)?);
        let decided = match left.value {
            Value::Bool(value) => value,
            ref other => return Err(EvalError::expected(kind, "Bool", other.type_name())),
        };
        let short_circuits = match operator {
            InfixOperator::Or => decided,
            _ => !decided,
        };
        if short_circuits {
            return Ok(Completion::normal(Value::Bool(decided), left.env));
        }

        let right = proceed!(self.evaluate_operand(right, &left.env, kind)?);
        match right.value {
            Value::Bool(value) => Ok(Completion::normal(Value::Bool(value), right.env)),
            ref other => Err(EvalError::expected(kind, "Bool", other.type_name())),
        }
    }
}
