//! Tree-walking evaluator.
//!
//! Every expression is evaluated against an [`Environment`] and completes
//! either normally, with an [`Evaluated`] value/continuation pair, or with a
//! `Return` signal that unwinds to the nearest function call. Composite
//! expressions thread the continuation of each operand into the next one and
//! re-resolve `Id` operands in that continuation before using them.

use std::{io, io::Write, rc::Rc};

use tracing::{debug, trace};

use crate::{
    runtime::{
        closure::Closure,
        environment::{BindingStore, Environment, Evaluated},
        errors::EvalError,
        value::Value,
    },
    syntax::{Expression, InfixOperator},
};

/// Unwraps a normal completion or forwards a `Return` signal to the caller
/// untouched.
macro_rules! proceed {
    ($completion:expr) => {
        match $completion {
            Completion::Normal(evaluated) => evaluated,
            Completion::Return(value) => return Ok(Completion::Return(value)),
        }
    };
}

mod assignment;
mod binary_ops;
mod builtin_ops;
mod comparison_ops;
mod control_flow;
mod function_call;
mod logical_ops;

/// How an evaluation step finished.
#[derive(Debug, Clone)]
pub enum Completion {
    Normal(Evaluated),
    /// A `Return` is unwinding toward the nearest function call.
    Return(Value),
}

impl Completion {
    pub fn normal(value: Value, env: Environment) -> Self {
        Completion::Normal(Evaluated::new(value, env))
    }
}

pub type EvalResult = Result<Completion, EvalError>;

/// Arena height and closure activity recorded on entry to a call or scope.
#[derive(Debug, Clone, Copy)]
struct Mark {
    cells: usize,
    captures: usize,
}

pub struct Interpreter<W: Write = io::Stdout> {
    store: BindingStore,
    output: W,
    call_depth: usize,
    /// Closures created or rebound so far.
    captures: usize,
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    /// Creates an interpreter whose `Print` output goes to `output`.
    pub fn with_output(output: W) -> Self {
        Self {
            store: BindingStore::new(),
            output,
            call_depth: 0,
            captures: 0,
        }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn store(&self) -> &BindingStore {
        &self.store
    }

    /// Evaluates a whole program in an empty environment and returns its
    /// printable result.
    ///
    /// A trailing `Id` result is resolved; a `Return` escaping the program
    /// is reported as [`EvalError::ReturnOutsideFunction`].
    pub fn run(&mut self, program: &Expression) -> Result<Value, EvalError> {
        let completion = self.evaluate(program, &Environment::empty())?;
        debug!(cells = self.store.len(), "program finished");
        match completion {
            Completion::Normal(evaluated) => {
                self.resolve(evaluated.value, &evaluated.env, program.kind())
            }
            Completion::Return(_) => Err(EvalError::ReturnOutsideFunction),
        }
    }

    /// Binds `name` to a fresh cell holding `value` on top of `env`.
    pub fn bind(&mut self, env: &Environment, name: &str, value: Value) -> Environment {
        let slot = self.store.alloc(value);
        env.bind(Rc::from(name), slot)
    }

    pub fn lookup(
        &self,
        env: &Environment,
        name: &str,
        expression: &'static str,
    ) -> Result<Value, EvalError> {
        env.find(name)
            .and_then(|slot| self.store.get(slot))
            .cloned()
            .ok_or_else(|| EvalError::unbound(name, expression))
    }

    fn mark(&self) -> Mark {
        Mark {
            cells: self.store.len(),
            captures: self.captures,
        }
    }

    /// Drops the cells allocated since `mark`, unless a closure created or
    /// rebound since then can still reach them.
    fn reclaim(&mut self, mark: Mark) {
        if self.captures != mark.captures {
            return;
        }
        let dropped = self.store.len().saturating_sub(mark.cells);
        if dropped > 0 {
            trace!(dropped, "reclaim cells");
            self.store.truncate(mark.cells);
        }
    }

    /// Replaces an `Id` by the value bound to it in `env`; other values pass
    /// through.
    pub fn resolve(
        &self,
        value: Value,
        env: &Environment,
        expression: &'static str,
    ) -> Result<Value, EvalError> {
        match value {
            Value::Id(name) => self.lookup(env, &name, expression),
            other => Ok(other),
        }
    }

    pub fn evaluate(&mut self, expression: &Expression, env: &Environment) -> EvalResult {
        match expression {
            Expression::Integer { value } => Ok(Completion::normal(Value::Int(*value), env.clone())),
            Expression::Float { value } => {
                Ok(Completion::normal(Value::Float(*value), env.clone()))
            }
            Expression::Boolean { value } => {
                Ok(Completion::normal(Value::Bool(*value), env.clone()))
            }
            Expression::String { value } => Ok(Completion::normal(
                Value::String(Rc::from(value.as_str())),
                env.clone(),
            )),
            Expression::Identifier { name } => Ok(Completion::normal(
                Value::Id(Rc::from(name.as_str())),
                env.clone(),
            )),
            Expression::Void => Ok(Completion::normal(Value::Void, env.clone())),
            Expression::VarDecl { name } => {
                let env = self.bind(env, name, Value::Void);
                Ok(Completion::normal(Value::Id(Rc::from(name.as_str())), env))
            }
            Expression::FuncDecl { name, function } => {
                let env = self.bind(env, name, Value::Function(function.clone()));
                Ok(Completion::normal(Value::Id(Rc::from(name.as_str())), env))
            }
            Expression::Function { function } => Ok(Completion::normal(
                Value::Function(function.clone()),
                env.clone(),
            )),
            Expression::Closure { function } => {
                let closure = Closure::new(function.clone(), env.clone());
                self.captures += 1;
                Ok(Completion::normal(
                    Value::Closure(Rc::new(closure)),
                    env.clone(),
                ))
            }
            Expression::Scope { body } => {
                let mark = self.mark();
                let inner = proceed!(self.evaluate(body, env)?);
                let value = self.resolve(inner.value, &inner.env, "Scope")?;
                self.reclaim(mark);
                Ok(Completion::normal(value, env.clone()))
            }
            Expression::Sequence { expressions } => self.evaluate_sequence(expressions, env),
            Expression::Not { operand } => self.evaluate_not(operand, env),
            Expression::Infix {
                left,
                operator,
                right,
            } => self.evaluate_infix(expression.kind(), *operator, left, right, env),
            Expression::Assign { target, value } => self.evaluate_assign(target, value, env),
            Expression::Call {
                function,
                arguments,
            } => self.evaluate_call(function, arguments, env),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => self.evaluate_if(condition, consequence, alternative.as_deref(), env),
            Expression::While { condition, body } => self.evaluate_while(condition, body, env),
            Expression::Return { value } => self.evaluate_return(value, env),
            Expression::Print { value } => self.evaluate_print(value, env),
            Expression::IsType { value, type_name } => {
                self.evaluate_is_type(value, type_name, env)
            }
            Expression::StringLength { value } => self.evaluate_string_length(value, env),
            Expression::Substring { value, start, end } => {
                self.evaluate_substring(value, start, end, env)
            }
            Expression::Object { fields } => self.evaluate_object(fields, env),
            Expression::Field { object, name } => self.evaluate_field(object, name, env),
        }
    }

    /// Evaluates `expression` and resolves an `Id` result in its own
    /// continuation.
    fn evaluate_operand(
        &mut self,
        expression: &Expression,
        env: &Environment,
        context: &'static str,
    ) -> EvalResult {
        let evaluated = proceed!(self.evaluate(expression, env)?);
        let value = self.resolve(evaluated.value, &evaluated.env, context)?;
        Ok(Completion::normal(value, evaluated.env))
    }

    fn evaluate_sequence(&mut self, expressions: &[Expression], env: &Environment) -> EvalResult {
        let mut last = Evaluated::new(Value::Void, env.clone());
        for expression in expressions {
            last = proceed!(self.evaluate(expression, &last.env)?);
        }
        Ok(Completion::Normal(last))
    }

    fn evaluate_infix(
        &mut self,
        kind: &'static str,
        operator: InfixOperator,
        left: &Expression,
        right: &Expression,
        env: &Environment,
    ) -> EvalResult {
        match operator {
            InfixOperator::Add | InfixOperator::Sub | InfixOperator::Mult | InfixOperator::Div => {
                self.evaluate_arithmetic(kind, operator, left, right, env)
            }
            InfixOperator::Equals
            | InfixOperator::LessThan
            | InfixOperator::GreaterThan
            | InfixOperator::LessEq
            | InfixOperator::GreaterEq => self.evaluate_comparison(kind, operator, left, right, env),
            InfixOperator::And | InfixOperator::Or => {
                self.evaluate_logical(kind, operator, left, right, env)
            }
            InfixOperator::StringEqual | InfixOperator::StringLess => {
                self.evaluate_string_comparison(kind, operator, left, right, env)
            }
        }
    }
}
