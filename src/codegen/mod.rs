//! Lowering of expression trees to LLVM-style textual IR.
//!
//! Values live in heap cells holding a tagged `i32`: integers are shifted
//! left by [`INT_TAG_BITS`], booleans are the constants [`FALSE_TAG`] and
//! [`TRUE_TAG`]. Every variable gets a slot in its function's [`EFrame`] and
//! is read and written through `getelementptr` into that frame.

pub mod errors;
pub mod frame;
pub mod instruction;
pub mod module;

mod control_flow;
mod expression;

use tracing::debug;

pub use errors::CodegenError;
pub use frame::{EFrame, FrameSlot};
pub use instruction::{
    FunctionDeclaration, Instruction, Label, Operand, Predicate, Register, ShiftOp,
};
pub use module::Module;

use crate::syntax::Expression;

pub const INT_TAG_BITS: u32 = 2;
pub const FALSE_TAG: i32 = 7;
pub const TRUE_TAG: i32 = (FALSE_TAG << 1) | 1;

/// Register holding the root frame allocation in `@llvm_main`.
const ROOT_FRAME_ALLOCATION: Register = 0;
/// Register holding the root frame cast to `%eframe*`.
const ROOT_FRAME_POINTER: Register = 1;

pub fn bool_tag(value: bool) -> i32 {
    if value { TRUE_TAG } else { FALSE_TAG }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Unbox with `ashr` and divide with `sdiv` instead of `lshr`/`udiv`.
    pub signed_arithmetic: bool,
}

/// What lowering an expression left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lowered {
    /// Pointer to a heap cell holding a tagged value.
    Boxed(Register),
    /// Raw `i1` comparison result.
    Flag(Register),
    Nothing,
}

pub struct CodeGenerator {
    options: CodegenOptions,
    instructions: Vec<Instruction>,
    functions: Vec<FunctionDeclaration>,
    frame: EFrame,
    frame_pointer: Register,
    next_register: Register,
    next_label: Label,
    last_constant: Option<i32>,
    last_boxed: Option<Register>,
}

impl CodeGenerator {
    /// Generator for the program's top level, whose frame lives in `%r1`.
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            options,
            instructions: Vec::new(),
            functions: Vec::new(),
            frame: EFrame::new(),
            frame_pointer: ROOT_FRAME_POINTER,
            next_register: ROOT_FRAME_POINTER + 1,
            next_label: 0,
            last_constant: None,
            last_boxed: None,
        }
    }

    /// Generator for a nested function body. Registers continue from the
    /// enclosing generator; labels restart.
    fn nested(options: CodegenOptions, next_register: Register, frame: EFrame) -> Self {
        Self {
            frame,
            next_register,
            ..Self::new(options)
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn functions(&self) -> &[FunctionDeclaration] {
        &self.functions
    }

    pub fn frame(&self) -> &EFrame {
        &self.frame
    }

    pub fn next_register(&self) -> Register {
        self.next_register
    }

    /// Tagged value of the most recent integer or boolean literal.
    pub fn last_constant(&self) -> Option<i32> {
        self.last_constant
    }

    fn fresh_register(&mut self) -> Register {
        let register = self.next_register;
        self.next_register += 1;
        register
    }

    fn reserve_labels(&mut self, count: usize) -> Label {
        let first = self.next_label;
        self.next_label += count;
        first
    }

    fn emit(&mut self, instruction: Instruction) -> usize {
        let position = self.instructions.len();
        self.instructions.push(instruction);
        position
    }

    /// Mallocs a cell and stores `value` into it.
    fn box_value(&mut self, value: Operand) -> Lowered {
        let cell = self.fresh_register();
        self.emit(Instruction::Malloc {
            dest: cell,
            ty: "i32".to_string(),
        });
        self.emit(Instruction::Store {
            value,
            pointer: cell,
        });
        self.last_boxed = Some(cell);
        Lowered::Boxed(cell)
    }

    /// Loads the tagged value out of a boxed result.
    fn load_value(&mut self, lowered: Lowered, kind: &'static str) -> Result<Operand, CodegenError> {
        match lowered {
            Lowered::Boxed(pointer) => {
                let dest = self.fresh_register();
                self.emit(Instruction::Load { dest, pointer });
                Ok(Operand::Register(dest))
            }
            Lowered::Flag(_) | Lowered::Nothing => Err(CodegenError::NotAValue { kind }),
        }
    }

    /// Loads the last computed value and returns it.
    ///
    /// A trailing `Store` is loaded back through its own pointer; otherwise
    /// the most recent boxed cell that dominates the exit is used, and with
    /// neither the function returns 0.
    fn emit_epilogue(&mut self) {
        let pointer = match self.instructions.last() {
            Some(Instruction::Store { pointer, .. }) => Some(*pointer),
            _ => self.last_boxed,
        };
        let value = match pointer {
            Some(pointer) => {
                let dest = self.fresh_register();
                self.emit(Instruction::Load { dest, pointer });
                Operand::Register(dest)
            }
            None => Operand::Constant(0),
        };
        self.emit(Instruction::Return { value });
    }

    /// Finishes the top level into a module with an `@llvm_main` entry.
    pub fn into_module(mut self) -> Module {
        self.emit_epilogue();

        let frame_type = self.frame.llvm_type();
        let mut body = vec![
            Instruction::Malloc {
                dest: ROOT_FRAME_ALLOCATION,
                ty: frame_type.clone(),
            },
            Instruction::BitCast {
                dest: ROOT_FRAME_POINTER,
                from: format!("{}*", frame_type),
                value: ROOT_FRAME_ALLOCATION,
                to: "%eframe*".to_string(),
            },
        ];
        body.append(&mut self.instructions);

        debug!(
            slots = self.frame.slot_count(),
            functions = self.functions.len(),
            registers = self.next_register,
            "assembled module"
        );
        Module {
            functions: self.functions,
            entry: FunctionDeclaration {
                name: module::ENTRY_POINT.to_string(),
                parameters: Vec::new(),
                body,
            },
            root_frame: self.frame,
        }
    }
}

pub fn generate(program: &Expression) -> Result<Module, CodegenError> {
    generate_with(program, CodegenOptions::default())
}

pub fn generate_with(program: &Expression, options: CodegenOptions) -> Result<Module, CodegenError> {
    let mut generator = CodeGenerator::new(options);
    generator.lower(program)?;
    Ok(generator.into_module())
}
