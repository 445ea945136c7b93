pub mod codegen;
pub mod program;
pub mod runtime;
pub mod syntax;
