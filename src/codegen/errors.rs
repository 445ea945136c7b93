use thiserror::Error;

/// Failures surfaced while lowering an expression tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("{kind} expressions cannot be compiled")]
    Unsupported { kind: &'static str },
    #[error("unbound identifier `{name}` in {kind}")]
    UnboundIdentifier { name: String, kind: &'static str },
    #[error("`{name}` is declared by an enclosing function and cannot be read from a nested one")]
    CapturedVariable { name: String },
    #[error("cannot assign to {kind}")]
    InvalidAssignmentTarget { kind: &'static str },
    #[error("{kind} does not produce a value")]
    NotAValue { kind: &'static str },
}
