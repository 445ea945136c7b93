use std::{collections::BTreeMap, io::Write, rc::Rc};

use crate::{
    runtime::{environment::Environment, errors::EvalError, value::Value},
    syntax::Expression,
};

use super::{Completion, EvalResult, Interpreter};

fn expect_string(value: &Value, context: &'static str) -> Result<Rc<str>, EvalError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(EvalError::expected(context, "String", other.type_name())),
    }
}

fn expect_index(value: &Value, context: &'static str) -> Result<i32, EvalError> {
    match value {
        Value::Int(i) => Ok(*i),
        other => Err(EvalError::expected(context, "Int", other.type_name())),
    }
}

impl<W: Write> Interpreter<W> {
    pub(super) fn evaluate_print(&mut self, value: &Expression, env: &Environment) -> EvalResult {
        let evaluated = proceed!(self.evaluate_operand(value, env, "Print")?);
        writeln!(self.output, "{}", evaluated.value.to_string_value())?;
        Ok(Completion::normal(Value::Void, evaluated.env))
    }

    pub(super) fn evaluate_is_type(
        &mut self,
        value: &Expression,
        type_name: &str,
        env: &Environment,
    ) -> EvalResult {
        let evaluated = proceed!(self.evaluate_operand(value, env, "IsType")?);
        let matches = evaluated.value.type_name() == type_name;
        Ok(Completion::normal(Value::Bool(matches), evaluated.env))
    }

    pub(super) fn evaluate_string_length(
        &mut self,
        value: &Expression,
        env: &Environment,
    ) -> EvalResult {
        let evaluated = proceed!(self.evaluate_operand(value, env, "StringLength")?);
        let text = expect_string(&evaluated.value, "StringLength")?;
        let length = i32::try_from(text.chars().count()).map_err(|_| {
            EvalError::IndexOutOfRange {
                expression: "StringLength",
                message: "string is too long".to_string(),
            }
        })?;
        Ok(Completion::normal(Value::Int(length), evaluated.env))
    }

    /// Half-open character range `[start, end)`.
    pub(super) fn evaluate_substring(
        &mut self,
        value: &Expression,
        start: &Expression,
        end: &Expression,
        env: &Environment,
    ) -> EvalResult {
        let text = proceed!(self.evaluate_operand(value, env, "Substring")?);
        let start = proceed!(self.evaluate_operand(start, &text.env, "Substring")?);
        let end = proceed!(self.evaluate_operand(end, &start.env, "Substring")?);

        let text_value = expect_string(&text.value, "Substring")?;
        let from = expect_index(&start.value, "Substring")?;
        let to = expect_index(&end.value, "Substring")?;
        let length = text_value.chars().count();

        let range = usize::try_from(from)
            .ok()
            .zip(usize::try_from(to).ok())
            .filter(|(from, to)| from <= to && *to <= length);
        let Some((from, to)) = range else {
            return Err(EvalError::IndexOutOfRange {
                expression: "Substring",
                message: format!("range {}..{} on a string of length {}", from, to, length),
            });
        };

        let slice: String = text_value.chars().skip(from).take(to - from).collect();
        Ok(Completion::normal(Value::String(Rc::from(slice)), end.env))
    }

    pub(super) fn evaluate_object(
        &mut self,
        fields: &[(String, Expression)],
        env: &Environment,
    ) -> EvalResult {
        let mut env = env.clone();
        let mut object = BTreeMap::new();
        for (name, field) in fields {
            let evaluated = proceed!(self.evaluate_operand(field, &env, "Object")?);
            object.insert(name.clone(), evaluated.value);
            env = evaluated.env;
        }
        Ok(Completion::normal(Value::PlainObject(Rc::new(object)), env))
    }

    pub(super) fn evaluate_field(
        &mut self,
        object: &Expression,
        name: &str,
        env: &Environment,
    ) -> EvalResult {
        let evaluated = proceed!(self.evaluate_operand(object, env, "Field")?);
        let value = match &evaluated.value {
            Value::PlainObject(fields) => fields
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::unbound(name, "Field"))?,
            other => return Err(EvalError::expected("Field", "PlainObject", other.type_name())),
        };
        Ok(Completion::normal(value, evaluated.env))
    }
}
