use crate::syntax::Expression;

use super::{
    CodeGenerator, CodegenError, Instruction, Lowered, Operand, Predicate, Register, TRUE_TAG,
};

impl CodeGenerator {
    fn jump(&mut self, target: usize) {
        self.emit(Instruction::Branch {
            condition: None,
            target,
            otherwise: None,
        });
    }

    /// Lowers a branch test to an `i1` register. Boxed booleans are compared
    /// against the `true` tag.
    fn lower_test(&mut self, condition: &Expression) -> Result<Register, CodegenError> {
        match self.lower(condition)? {
            Lowered::Flag(flag) => Ok(flag),
            boxed @ Lowered::Boxed(_) => {
                let value = self.load_value(boxed, condition.kind())?;
                let dest = self.fresh_register();
                self.emit(Instruction::ICmp {
                    dest,
                    predicate: Predicate::Eq,
                    left: value,
                    right: Operand::Constant(TRUE_TAG),
                });
                Ok(dest)
            }
            Lowered::Nothing => Err(CodegenError::NotAValue {
                kind: condition.kind(),
            }),
        }
    }

    /// Lowers a two-armed branch. Cells boxed inside either arm do not
    /// dominate the end label, so the last boxed cell is reset to the one
    /// seen before the branch.
    pub(super) fn lower_if(
        &mut self,
        condition: &Expression,
        consequence: &Expression,
        alternative: Option<&Expression>,
    ) -> Result<Lowered, CodegenError> {
        let dominating = self.last_boxed;
        let begin = self.reserve_labels(4);
        let (then_label, else_label, end) = (begin + 1, begin + 2, begin + 3);

        self.jump(begin);
        self.emit(Instruction::Label(begin));
        let test = self.lower_test(condition)?;
        self.emit(Instruction::Branch {
            condition: Some(test),
            target: then_label,
            otherwise: Some(else_label),
        });

        self.emit(Instruction::Label(then_label));
        self.lower(consequence)?;
        self.jump(end);

        self.emit(Instruction::Label(else_label));
        if let Some(alternative) = alternative {
            self.lower(alternative)?;
        }
        self.jump(end);

        self.emit(Instruction::Label(end));
        self.last_boxed = dominating;
        Ok(Lowered::Nothing)
    }

    pub(super) fn lower_while(
        &mut self,
        condition: &Expression,
        body: &Expression,
    ) -> Result<Lowered, CodegenError> {
        let dominating = self.last_boxed;
        let begin = self.reserve_labels(3);
        let (body_label, end) = (begin + 1, begin + 2);

        self.jump(begin);
        self.emit(Instruction::Label(begin));
        let test = self.lower_test(condition)?;
        self.emit(Instruction::Branch {
            condition: Some(test),
            target: body_label,
            otherwise: Some(end),
        });

        self.emit(Instruction::Label(body_label));
        self.lower(body)?;
        self.jump(begin);

        self.emit(Instruction::Label(end));
        self.last_boxed = dominating;
        Ok(Lowered::Nothing)
    }

    /// Returns from the current function; a fresh label opens the block that
    /// follows.
    pub(super) fn lower_return(&mut self, value: &Expression) -> Result<Lowered, CodegenError> {
        let lowered = self.lower(value)?;
        let value = self.load_value(lowered, value.kind())?;
        self.emit(Instruction::Return { value });
        let label = self.reserve_labels(1);
        self.emit(Instruction::Label(label));
        Ok(Lowered::Nothing)
    }
}
