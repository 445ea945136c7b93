use thiserror::Error;

/// Failures surfaced by the interpreter.
///
/// Each variant names the kind of expression that failed so a driver can
/// print a diagnostic. A `Return` unwinding to a call boundary is not an
/// error; see [`Completion`](crate::runtime::interpreter::Completion).
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("type error in {expression}: {message}")]
    TypeError {
        expression: &'static str,
        message: String,
    },
    #[error("unbound identifier `{name}` in {expression}")]
    UnboundIdentifier {
        name: String,
        expression: &'static str,
    },
    #[error("division by zero in {expression}")]
    DivisionByZero { expression: &'static str },
    #[error("index out of range in {expression}: {message}")]
    IndexOutOfRange {
        expression: &'static str,
        message: String,
    },
    #[error("return outside of a function")]
    ReturnOutsideFunction,
    #[error("failed to write program output")]
    Output(#[from] std::io::Error),
}

impl EvalError {
    pub fn type_error(expression: &'static str, message: impl Into<String>) -> Self {
        EvalError::TypeError {
            expression,
            message: message.into(),
        }
    }

    pub fn unbound(name: impl Into<String>, expression: &'static str) -> Self {
        EvalError::UnboundIdentifier {
            name: name.into(),
            expression,
        }
    }

    /// `expected X, got Y` type error.
    pub fn expected(expression: &'static str, expected: &str, got: &str) -> Self {
        Self::type_error(expression, format!("expected {}, got {}", expected, got))
    }
}
