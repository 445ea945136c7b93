//! Runtime value model, environments and the tree-walking interpreter.
//!
//! # No-Cycle Invariant
//! Runtime values are shared through `Rc` and must stay acyclic. Environments
//! name binding cells by [`SlotId`](environment::SlotId) rather than holding
//! values, and cells live in the interpreter's
//! [`BindingStore`](environment::BindingStore), so a closure stored in a
//! binding never forms a reference cycle with the chain it captured.

pub mod closure;
pub mod environment;
pub mod errors;
pub mod interpreter;
pub mod value;

pub use environment::{Environment, Evaluated};
pub use errors::EvalError;
pub use interpreter::{Completion, Interpreter};
pub use value::Value;
