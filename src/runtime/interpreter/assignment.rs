use std::io::Write;

use tracing::trace;

use crate::{
    runtime::{environment::Environment, errors::EvalError, value::Value},
    syntax::Expression,
};

use super::{Completion, EvalResult, Interpreter};

impl<W: Write> Interpreter<W> {
    pub(super) fn evaluate_assign(
        &mut self,
        target: &Expression,
        value: &Expression,
        env: &Environment,
    ) -> EvalResult {
        let target = proceed!(self.evaluate(target, env)?);
        let name = match target.value {
            Value::Id(name) => name,
            other => {
                return Err(EvalError::type_error(
                    "Assign",
                    format!("cannot assign to {}", other.type_name()),
                ));
            }
        };
        let slot = target
            .env
            .find(&name)
            .ok_or_else(|| EvalError::unbound(&*name, "Assign"))?;

        let assigned = proceed!(self.evaluate_operand(value, &target.env, "Assign")?);
        if let Value::Closure(closure) = &assigned.value {
            closure.rebind(assigned.env.clone());
            self.captures += 1;
        }
        trace!(name = %name, value = %assigned.value, "assign");
        let cell = self
            .store
            .get_mut(slot)
            .ok_or_else(|| EvalError::unbound(&*name, "Assign"))?;
        *cell = assigned.value;

        Ok(Completion::normal(Value::Id(name), assigned.env))
    }
}
