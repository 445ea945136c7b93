use std::fmt;

use super::{EFrame, FunctionDeclaration};

pub const DATALAYOUT: &str = "e-p:32:32:32-i1:8:8-i8:8:8-i16:16:16-i32:32:32-i64:32:64-f32:32:32-f64:32:64-v64:64:64-v128:128:128-a0:0:64-f80:32:32";
pub const TRIPLE: &str = "i386-pc-linux-gnu";
pub const ENTRY_POINT: &str = "llvm_main";

/// A complete generated module: function table plus the `@llvm_main` entry
/// wrapping the top-level instruction stream.
#[derive(Debug, Clone)]
pub struct Module {
    pub functions: Vec<FunctionDeclaration>,
    pub entry: FunctionDeclaration,
    pub root_frame: EFrame,
}

impl Module {
    pub fn function(&self, name: &str) -> Option<&FunctionDeclaration> {
        self.functions.iter().find(|function| function.name == name)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "target datalayout = \"{}\"", DATALAYOUT)?;
        writeln!(f, "target triple = \"{}\"", TRIPLE)?;
        writeln!(f, "%eframe = type {{%eframe*, i32, [0 x i32]}}")?;
        writeln!(f, "@emptyframe = global %eframe undef")?;
        for function in &self.functions {
            writeln!(f, "{}", function)?;
        }
        writeln!(f, "{}", self.entry)
    }
}
