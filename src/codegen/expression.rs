use std::mem;

use tracing::{debug, trace};

use crate::syntax::{Expression, FunctionLiteral, InfixOperator};

use super::{
    CodeGenerator, CodegenError, EFrame, FrameSlot, FunctionDeclaration, INT_TAG_BITS,
    Instruction, Lowered, Operand, Predicate, ShiftOp, bool_tag,
};

impl CodeGenerator {
    pub fn lower(&mut self, expression: &Expression) -> Result<Lowered, CodegenError> {
        trace!(kind = expression.kind(), register = self.next_register, "lower");
        match expression {
            Expression::Integer { value } => Ok(self.lower_constant(value.wrapping_shl(INT_TAG_BITS))),
            Expression::Boolean { value } => Ok(self.lower_constant(bool_tag(*value))),
            Expression::Identifier { name } => self.lower_identifier(name),
            Expression::Void => Ok(Lowered::Nothing),
            Expression::VarDecl { name } => {
                self.frame.declare(name, self.last_constant);
                Ok(Lowered::Nothing)
            }
            Expression::FuncDecl { name, function } => self.lower_function_declaration(name, function),
            Expression::Scope { body } => self.lower(body),
            Expression::Sequence { expressions } => {
                let mut last = Lowered::Nothing;
                for expression in expressions {
                    last = self.lower(expression)?;
                }
                Ok(last)
            }
            Expression::Infix {
                left,
                operator,
                right,
            } => self.lower_infix(expression.kind(), *operator, left, right),
            Expression::Assign { target, value } => self.lower_assign(target, value),
            Expression::Call {
                function,
                arguments,
            } => self.lower_call(function, arguments),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => self.lower_if(condition, consequence, alternative.as_deref()),
            Expression::While { condition, body } => self.lower_while(condition, body),
            Expression::Return { value } => self.lower_return(value),
            other => Err(CodegenError::Unsupported { kind: other.kind() }),
        }
    }

    fn lower_constant(&mut self, tagged: i32) -> Lowered {
        self.last_constant = Some(tagged);
        self.box_value(Operand::Constant(tagged))
    }

    fn local_slot(&self, name: &str, kind: &'static str) -> Result<usize, CodegenError> {
        match self.frame.resolve(name) {
            Some(FrameSlot::Local(slot)) => Ok(slot),
            Some(FrameSlot::Enclosing) => Err(CodegenError::CapturedVariable {
                name: name.to_string(),
            }),
            None => Err(CodegenError::UnboundIdentifier {
                name: name.to_string(),
                kind,
            }),
        }
    }

    fn slot_pointer(&mut self, slot: usize) -> usize {
        let dest = self.fresh_register();
        self.emit(Instruction::GetElementPtr {
            dest,
            frame: self.frame_pointer,
            slot,
        });
        dest
    }

    fn lower_identifier(&mut self, name: &str) -> Result<Lowered, CodegenError> {
        let slot = self.local_slot(name, "Identifier")?;
        let pointer = self.slot_pointer(slot);
        let value = self.fresh_register();
        self.emit(Instruction::Load {
            dest: value,
            pointer,
        });
        Ok(self.box_value(Operand::Register(value)))
    }

    /// Writes `value` into frame slot `slot`. The slot pointer doubles as the
    /// assignment's boxed result.
    fn store_slot(&mut self, slot: usize, value: Operand) -> Lowered {
        let pointer = self.slot_pointer(slot);
        self.emit(Instruction::Store { value, pointer });
        self.last_boxed = Some(pointer);
        Lowered::Boxed(pointer)
    }

    fn lower_assign(
        &mut self,
        target: &Expression,
        value: &Expression,
    ) -> Result<Lowered, CodegenError> {
        match target {
            Expression::VarDecl { name } => {
                let lowered = self.lower(value)?;
                let operand = self.load_value(lowered, value.kind())?;
                let slot = self.frame.declare(name, self.last_constant);
                trace!(name = %name, slot, initial = ?self.last_constant, "declare slot");
                Ok(self.store_slot(slot, operand))
            }
            Expression::Identifier { name } => {
                let slot = self.local_slot(name, "Assign")?;
                let lowered = self.lower(value)?;
                let operand = self.load_value(lowered, value.kind())?;
                Ok(self.store_slot(slot, operand))
            }
            other => Err(CodegenError::InvalidAssignmentTarget { kind: other.kind() }),
        }
    }

    fn unboxed(&mut self, lowered: Lowered, kind: &'static str) -> Result<Operand, CodegenError> {
        let value = self.load_value(lowered, kind)?;
        let dest = self.fresh_register();
        let op = if self.options.signed_arithmetic {
            ShiftOp::AShr
        } else {
            ShiftOp::LShr
        };
        self.emit(Instruction::Shift {
            dest,
            op,
            value,
            amount: INT_TAG_BITS,
        });
        Ok(Operand::Register(dest))
    }

    fn lower_infix(
        &mut self,
        kind: &'static str,
        operator: InfixOperator,
        left: &Expression,
        right: &Expression,
    ) -> Result<Lowered, CodegenError> {
        if !operator.is_arithmetic() && !operator.is_comparison() {
            return Err(CodegenError::Unsupported { kind });
        }

        let lowered_left = self.lower(left)?;
        let lowered_right = self.lower(right)?;

        if operator == InfixOperator::Add {
            // Tagged integers add without unboxing: (a << 2) + (b << 2) == (a + b) << 2.
            let l = self.load_value(lowered_left, left.kind())?;
            let r = self.load_value(lowered_right, right.kind())?;
            let dest = self.fresh_register();
            self.emit(Instruction::Add {
                dest,
                left: l,
                right: r,
            });
            return Ok(self.box_value(Operand::Register(dest)));
        }

        if operator.is_comparison() {
            let l = self.load_value(lowered_left, left.kind())?;
            let r = self.load_value(lowered_right, right.kind())?;
            let dest = self.fresh_register();
            let predicate = match operator {
                InfixOperator::GreaterThan => Predicate::Sgt,
                InfixOperator::GreaterEq => Predicate::Sge,
                InfixOperator::LessThan => Predicate::Slt,
                InfixOperator::LessEq => Predicate::Sle,
                _ => Predicate::Eq,
            };
            self.emit(Instruction::ICmp {
                dest,
                predicate,
                left: l,
                right: r,
            });
            return Ok(Lowered::Flag(dest));
        }

        let l = self.unboxed(lowered_left, left.kind())?;
        let r = self.unboxed(lowered_right, right.kind())?;
        let raw = self.fresh_register();
        let instruction = match operator {
            InfixOperator::Sub => Instruction::Sub {
                dest: raw,
                left: l,
                right: r,
            },
            InfixOperator::Mult => Instruction::Mult {
                dest: raw,
                left: l,
                right: r,
            },
            _ if self.options.signed_arithmetic => Instruction::SDiv {
                dest: raw,
                left: l,
                right: r,
            },
            _ => Instruction::UDiv {
                dest: raw,
                left: l,
                right: r,
            },
        };
        self.emit(instruction);

        let tagged = self.fresh_register();
        self.emit(Instruction::Shift {
            dest: tagged,
            op: ShiftOp::Shl,
            value: Operand::Register(raw),
            amount: INT_TAG_BITS,
        });
        Ok(self.box_value(Operand::Register(tagged)))
    }

    fn lower_call(
        &mut self,
        function: &Expression,
        arguments: &[Expression],
    ) -> Result<Lowered, CodegenError> {
        let Expression::Identifier { name } = function else {
            return Err(CodegenError::Unsupported {
                kind: "indirect Call",
            });
        };

        let mut operands = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let lowered = self.lower(argument)?;
            operands.push(self.load_value(lowered, argument.kind())?);
        }

        let dest = self.fresh_register();
        self.emit(Instruction::Call {
            dest,
            function: name.clone(),
            arguments: operands,
        });
        Ok(self.box_value(Operand::Register(dest)))
    }

    fn lower_function_declaration(
        &mut self,
        name: &str,
        function: &FunctionLiteral,
    ) -> Result<Lowered, CodegenError> {
        let outer = mem::take(&mut self.frame);
        let mut nested = CodeGenerator::nested(
            self.options,
            self.next_register,
            EFrame::new_enclosed(outer),
        );
        let declaration = nested.lower_function(name, function);

        let CodeGenerator {
            frame,
            functions,
            next_register,
            ..
        } = nested;
        self.frame = frame.into_outer().unwrap_or_default();
        let declaration = declaration?;

        self.next_register = next_register;
        self.functions.extend(functions);
        self.functions.push(declaration);
        Ok(Lowered::Nothing)
    }

    /// Lowers a function body into a declaration. The prologue allocates the
    /// function's own frame and spills every parameter into its slot.
    fn lower_function(
        &mut self,
        name: &str,
        function: &FunctionLiteral,
    ) -> Result<FunctionDeclaration, CodegenError> {
        let allocation = self.fresh_register();
        self.frame_pointer = self.fresh_register();
        for parameter in &function.parameters {
            let slot = self.frame.declare(parameter, None);
            self.store_slot(slot, Operand::Named(parameter.clone()));
        }

        self.lower(&function.body)?;
        self.emit_epilogue();

        let frame_type = self.frame.llvm_type();
        debug!(
            name,
            parameters = function.parameters.len(),
            slots = self.frame.slot_count(),
            "lowered function"
        );
        let mut body = vec![
            Instruction::Malloc {
                dest: allocation,
                ty: frame_type.clone(),
            },
            Instruction::BitCast {
                dest: self.frame_pointer,
                from: format!("{}*", frame_type),
                value: allocation,
                to: "%eframe*".to_string(),
            },
        ];
        body.append(&mut self.instructions);

        Ok(FunctionDeclaration {
            name: name.to_string(),
            parameters: function.parameters.clone(),
            body,
        })
    }
}
