//! Textual IR instructions.
//!
//! Instructions are plain data; the only behavior they have is rendering
//! themselves through `Display`. Register `N` renders as `%rN` and label `N`
//! as `label_N`.

use std::fmt;

pub type Register = usize;
pub type Label = usize;

/// Field index of the slot array inside `%eframe`.
pub const FRAME_SLOTS_FIELD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    /// A named function parameter, `%name`.
    Named(String),
    Constant(i32),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "%r{}", r),
            Operand::Named(name) => write!(f, "%{}", name),
            Operand::Constant(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOp {
    Shl,
    LShr,
    AShr,
}

impl ShiftOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            ShiftOp::Shl => "shl",
            ShiftOp::LShr => "lshr",
            ShiftOp::AShr => "ashr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Eq,
    Sgt,
    Sge,
    Slt,
    Sle,
}

impl Predicate {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Predicate::Eq => "eq",
            Predicate::Sgt => "sgt",
            Predicate::Sge => "sge",
            Predicate::Slt => "slt",
            Predicate::Sle => "sle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `%dest = load i32* pointer`
    Load { dest: Register, pointer: Register },
    /// `store i32 value, i32* pointer`
    Store { value: Operand, pointer: Register },
    /// `%dest = malloc ty`
    Malloc { dest: Register, ty: String },
    Add {
        dest: Register,
        left: Operand,
        right: Operand,
    },
    Sub {
        dest: Register,
        left: Operand,
        right: Operand,
    },
    Mult {
        dest: Register,
        left: Operand,
        right: Operand,
    },
    SDiv {
        dest: Register,
        left: Operand,
        right: Operand,
    },
    UDiv {
        dest: Register,
        left: Operand,
        right: Operand,
    },
    Shift {
        dest: Register,
        op: ShiftOp,
        value: Operand,
        amount: u32,
    },
    ICmp {
        dest: Register,
        predicate: Predicate,
        left: Operand,
        right: Operand,
    },
    /// Unconditional when `condition` is `None`; `otherwise` is only set for
    /// conditional branches.
    Branch {
        condition: Option<Register>,
        target: Label,
        otherwise: Option<Label>,
    },
    Label(Label),
    /// `%dest = getelementptr %eframe* frame, i32 0, i32 2, i32 slot`
    GetElementPtr {
        dest: Register,
        frame: Register,
        slot: usize,
    },
    Call {
        dest: Register,
        function: String,
        arguments: Vec<Operand>,
    },
    BitCast {
        dest: Register,
        from: String,
        value: Register,
        to: String,
    },
    Return { value: Operand },
}

impl Instruction {
    /// Register this instruction writes, if any.
    pub fn dest(&self) -> Option<Register> {
        match self {
            Instruction::Load { dest, .. }
            | Instruction::Malloc { dest, .. }
            | Instruction::Add { dest, .. }
            | Instruction::Sub { dest, .. }
            | Instruction::Mult { dest, .. }
            | Instruction::SDiv { dest, .. }
            | Instruction::UDiv { dest, .. }
            | Instruction::Shift { dest, .. }
            | Instruction::ICmp { dest, .. }
            | Instruction::GetElementPtr { dest, .. }
            | Instruction::Call { dest, .. }
            | Instruction::BitCast { dest, .. } => Some(*dest),
            Instruction::Store { .. }
            | Instruction::Branch { .. }
            | Instruction::Label(_)
            | Instruction::Return { .. } => None,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Instruction::Label(_))
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, Instruction::Branch { .. } | Instruction::Return { .. })
    }
}

fn binary(f: &mut fmt::Formatter<'_>, dest: Register, op: &str, l: &Operand, r: &Operand) -> fmt::Result {
    write!(f, "%r{} = {} i32 {}, {}", dest, op, l, r)
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Load { dest, pointer } => write!(f, "%r{} = load i32* %r{}", dest, pointer),
            Instruction::Store { value, pointer } => {
                write!(f, "store i32 {}, i32* %r{}", value, pointer)
            }
            Instruction::Malloc { dest, ty } => write!(f, "%r{} = malloc {}", dest, ty),
            Instruction::Add { dest, left, right } => binary(f, *dest, "add", left, right),
            Instruction::Sub { dest, left, right } => binary(f, *dest, "sub", left, right),
            Instruction::Mult { dest, left, right } => binary(f, *dest, "mul", left, right),
            Instruction::SDiv { dest, left, right } => binary(f, *dest, "sdiv", left, right),
            Instruction::UDiv { dest, left, right } => binary(f, *dest, "udiv", left, right),
            Instruction::Shift {
                dest,
                op,
                value,
                amount,
            } => write!(f, "%r{} = {} i32 {}, {}", dest, op.mnemonic(), value, amount),
            Instruction::ICmp {
                dest,
                predicate,
                left,
                right,
            } => write!(
                f,
                "%r{} = icmp {} i32 {}, {}",
                dest,
                predicate.mnemonic(),
                left,
                right
            ),
            Instruction::Branch {
                condition: Some(condition),
                target,
                otherwise,
            } => write!(
                f,
                "br i1 %r{}, label %label_{}, label %label_{}",
                condition,
                target,
                otherwise.unwrap_or(*target)
            ),
            Instruction::Branch {
                condition: None,
                target,
                ..
            } => write!(f, "br label %label_{}", target),
            Instruction::Label(label) => write!(f, "label_{}:", label),
            Instruction::GetElementPtr { dest, frame, slot } => write!(
                f,
                "%r{} = getelementptr %eframe* %r{}, i32 0, i32 {}, i32 {}",
                dest, frame, FRAME_SLOTS_FIELD, slot
            ),
            Instruction::Call {
                dest,
                function,
                arguments,
            } => {
                let arguments: Vec<String> =
                    arguments.iter().map(|a| format!("i32 {}", a)).collect();
                write!(
                    f,
                    "%r{} = call i32 @{}({})",
                    dest,
                    function,
                    arguments.join(", ")
                )
            }
            Instruction::BitCast {
                dest,
                from,
                value,
                to,
            } => write!(f, "%r{} = bitcast {} %r{} to {}", dest, from, value, to),
            Instruction::Return { value } => write!(f, "ret i32 {}", value),
        }
    }
}

/// Entry in a module's function table, rendered as
/// `define i32 @name(i32 %p, ...) { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Vec<Instruction>,
}

impl fmt::Display for FunctionDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parameters: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("i32 %{}", p))
            .collect();
        writeln!(f, "define i32 @{}({}) {{", self.name, parameters.join(", "))?;
        for instruction in &self.body {
            if instruction.is_label() {
                writeln!(f, "{}", instruction)?;
            } else {
                writeln!(f, "  {}", instruction)?;
            }
        }
        write!(f, "}}")
    }
}
