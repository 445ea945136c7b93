//! Program tree shared by the interpreter and the code generator.
//!
//! Parsing and scope resolution happen outside this crate; programs arrive
//! as already-built [`Expression`] trees (see [`crate::program`]).

pub mod expression;

pub use expression::{Expression, FunctionLiteral, InfixOperator};
