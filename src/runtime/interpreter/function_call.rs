use std::{io::Write, rc::Rc};

use tracing::{debug, trace};

use crate::{
    runtime::{environment::Environment, errors::EvalError, value::Value},
    syntax::{Expression, FunctionLiteral},
};

use super::{Completion, EvalResult, Interpreter};

impl<W: Write> Interpreter<W> {
    pub(super) fn evaluate_call(
        &mut self,
        function: &Expression,
        arguments: &[Expression],
        env: &Environment,
    ) -> EvalResult {
        let callee = proceed!(self.evaluate_operand(function, env, "Call")?);

        let mut call_site = callee.env;
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let evaluated = proceed!(self.evaluate_operand(argument, &call_site, "Call")?);
            values.push(evaluated.value);
            call_site = evaluated.env;
        }

        let (literal, base) = match callee.value {
            Value::Function(literal) => (literal, call_site.clone()),
            Value::Closure(closure) => (closure.function.clone(), closure.environment()),
            other => {
                return Err(EvalError::type_error(
                    "Call",
                    format!("{} is not callable", other.type_name()),
                ));
            }
        };

        let result = self.invoke(&literal, values, &base)?;
        Ok(Completion::normal(result, call_site))
    }

    /// Binds `arguments` over `base` and runs the body, turning a `Return`
    /// into the call's result. The frame's cells are reclaimed on exit.
    pub(super) fn invoke(
        &mut self,
        literal: &Rc<FunctionLiteral>,
        arguments: Vec<Value>,
        base: &Environment,
    ) -> Result<Value, EvalError> {
        if literal.parameters.len() != arguments.len() {
            return Err(EvalError::type_error(
                "Call",
                format!(
                    "expected {} argument(s), got {}",
                    literal.parameters.len(),
                    arguments.len()
                ),
            ));
        }

        let mark = self.mark();
        let mut frame = base.clone();
        for (parameter, argument) in literal.parameters.iter().zip(arguments) {
            frame = self.bind(&frame, parameter, argument);
        }

        self.call_depth += 1;
        let depth = self.call_depth;
        trace!(depth, parameters = ?literal.parameters, "enter call");
        let completion = self.evaluate(&literal.body, &frame);
        self.call_depth -= 1;
        self.reclaim(mark);

        match completion? {
            Completion::Return(value) => {
                debug!(depth, value = %value, "return caught");
                Ok(value)
            }
            Completion::Normal(_) => Ok(Value::Void),
        }
    }
}
