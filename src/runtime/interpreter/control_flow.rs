use std::io::Write;

use tracing::trace;

use crate::{
    runtime::{environment::Environment, errors::EvalError, value::Value},
    syntax::Expression,
};

use super::{Completion, EvalResult, Interpreter};

fn expect_test(value: &Value, context: &'static str) -> Result<bool, EvalError> {
    value
        .as_bool()
        .ok_or_else(|| EvalError::expected(context, "Bool", value.type_name()))
}

impl<W: Write> Interpreter<W> {
    pub(super) fn evaluate_if(
        &mut self,
        condition: &Expression,
        consequence: &Expression,
        alternative: Option<&Expression>,
        env: &Environment,
    ) -> EvalResult {
        let test = proceed!(self.evaluate_operand(condition, env, "If")?);
        match (expect_test(&test.value, "If")?, alternative) {
            (true, _) => self.evaluate(consequence, &test.env),
            (false, Some(alternative)) => self.evaluate(alternative, &test.env),
            (false, None) => Ok(Completion::normal(Value::Void, test.env)),
        }
    }

    /// Each iteration tests against the continuation of the previous body.
    pub(super) fn evaluate_while(
        &mut self,
        condition: &Expression,
        body: &Expression,
        env: &Environment,
    ) -> EvalResult {
        let mut env = env.clone();
        let mut iterations = 0usize;
        loop {
            let test = proceed!(self.evaluate_operand(condition, &env, "While")?);
            if !expect_test(&test.value, "While")? {
                trace!(iterations, "loop finished");
                return Ok(Completion::normal(Value::Void, test.env));
            }
            env = proceed!(self.evaluate(body, &test.env)?).env;
            iterations += 1;
        }
    }

    pub(super) fn evaluate_return(&mut self, value: &Expression, env: &Environment) -> EvalResult {
        let evaluated = proceed!(self.evaluate_operand(value, env, "Return")?);
        trace!(value = %evaluated.value, "return");
        Ok(Completion::Return(evaluated.value))
    }
}
