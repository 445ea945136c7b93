use insta::assert_snapshot;
use quill::codegen::{self, CodegenOptions};
use quill::syntax::{Expression, InfixOperator};

fn id(name: &str) -> Expression {
    Expression::identifier(name)
}

fn int(value: i32) -> Expression {
    Expression::integer(value)
}

#[test]
fn empty_program_module() {
    let module = codegen::generate(&Expression::sequence(vec![])).unwrap();
    assert_snapshot!(module.to_string(), @r#"
    target datalayout = "e-p:32:32:32-i1:8:8-i8:8:8-i16:16:16-i32:32:32-i64:32:64-f32:32:32-f64:32:64-v64:64:64-v128:128:128-a0:0:64-f80:32:32"
    target triple = "i386-pc-linux-gnu"
    %eframe = type {%eframe*, i32, [0 x i32]}
    @emptyframe = global %eframe undef
    define i32 @llvm_main() {
      %r0 = malloc {%eframe*, i32, [0 x i32]}
      %r1 = bitcast {%eframe*, i32, [0 x i32]}* %r0 to %eframe*
      ret i32 0
    }
    "#);
}

#[test]
fn declaration_then_subtraction() {
    let program = Expression::sequence(vec![
        Expression::declare("x", int(7)),
        Expression::infix(id("x"), InfixOperator::Sub, int(3)),
    ]);
    let module = codegen::generate(&program).unwrap();
    assert_snapshot!(module.entry.to_string(), @r"
    define i32 @llvm_main() {
      %r0 = malloc {%eframe*, i32, [1 x i32]}
      %r1 = bitcast {%eframe*, i32, [1 x i32]}* %r0 to %eframe*
      %r2 = malloc i32
      store i32 28, i32* %r2
      %r3 = load i32* %r2
      %r4 = getelementptr %eframe* %r1, i32 0, i32 2, i32 0
      store i32 %r3, i32* %r4
      %r5 = getelementptr %eframe* %r1, i32 0, i32 2, i32 0
      %r6 = load i32* %r5
      %r7 = malloc i32
      store i32 %r6, i32* %r7
      %r8 = malloc i32
      store i32 12, i32* %r8
      %r9 = load i32* %r7
      %r10 = lshr i32 %r9, 2
      %r11 = load i32* %r8
      %r12 = lshr i32 %r11, 2
      %r13 = sub i32 %r10, %r12
      %r14 = shl i32 %r13, 2
      %r15 = malloc i32
      store i32 %r14, i32* %r15
      %r16 = load i32* %r15
      ret i32 %r16
    }
    ");
}

#[test]
fn signed_division_uses_arithmetic_shifts() {
    let program = Expression::infix(
        Expression::infix(int(0), InfixOperator::Sub, int(8)),
        InfixOperator::Div,
        int(2),
    );
    let options = CodegenOptions {
        signed_arithmetic: true,
    };
    let module = codegen::generate_with(&program, options).unwrap();
    assert_snapshot!(module.entry.to_string(), @r"
    define i32 @llvm_main() {
      %r0 = malloc {%eframe*, i32, [0 x i32]}
      %r1 = bitcast {%eframe*, i32, [0 x i32]}* %r0 to %eframe*
      %r2 = malloc i32
      store i32 0, i32* %r2
      %r3 = malloc i32
      store i32 32, i32* %r3
      %r4 = load i32* %r2
      %r5 = ashr i32 %r4, 2
      %r6 = load i32* %r3
      %r7 = ashr i32 %r6, 2
      %r8 = sub i32 %r5, %r7
      %r9 = shl i32 %r8, 2
      %r10 = malloc i32
      store i32 %r9, i32* %r10
      %r11 = malloc i32
      store i32 8, i32* %r11
      %r12 = load i32* %r10
      %r13 = ashr i32 %r12, 2
      %r14 = load i32* %r11
      %r15 = ashr i32 %r14, 2
      %r16 = sdiv i32 %r13, %r15
      %r17 = shl i32 %r16, 2
      %r18 = malloc i32
      store i32 %r17, i32* %r18
      %r19 = load i32* %r18
      ret i32 %r19
    }
    ");
}

#[test]
fn if_without_else_keeps_both_branches() {
    let program = Expression::if_else(Expression::boolean(true), int(5), None);
    let module = codegen::generate(&program).unwrap();
    assert_snapshot!(module.entry.to_string(), @r"
    define i32 @llvm_main() {
      %r0 = malloc {%eframe*, i32, [0 x i32]}
      %r1 = bitcast {%eframe*, i32, [0 x i32]}* %r0 to %eframe*
      br label %label_0
    label_0:
      %r2 = malloc i32
      store i32 15, i32* %r2
      %r3 = load i32* %r2
      %r4 = icmp eq i32 %r3, 15
      br i1 %r4, label %label_1, label %label_2
    label_1:
      %r5 = malloc i32
      store i32 20, i32* %r5
      br label %label_3
    label_2:
      br label %label_3
    label_3:
      ret i32 0
    }
    ");
}

#[test]
fn top_level_while_returns_without_reading_the_body() {
    let program = Expression::while_loop(Expression::boolean(false), int(1));
    let module = codegen::generate(&program).unwrap();
    assert_snapshot!(module.entry.to_string(), @r"
    define i32 @llvm_main() {
      %r0 = malloc {%eframe*, i32, [0 x i32]}
      %r1 = bitcast {%eframe*, i32, [0 x i32]}* %r0 to %eframe*
      br label %label_0
    label_0:
      %r2 = malloc i32
      store i32 7, i32* %r2
      %r3 = load i32* %r2
      %r4 = icmp eq i32 %r3, 15
      br i1 %r4, label %label_1, label %label_2
    label_1:
      %r5 = malloc i32
      store i32 4, i32* %r5
      br label %label_0
    label_2:
      ret i32 0
    }
    ");
}

#[test]
fn function_declaration_and_call() {
    let program = Expression::sequence(vec![
        Expression::func_decl(
            "double",
            &["v"],
            Expression::ret(Expression::infix(id("v"), InfixOperator::Add, id("v"))),
        ),
        Expression::call(id("double"), vec![int(21)]),
    ]);
    let module = codegen::generate(&program).unwrap();

    assert_snapshot!(module.functions[0].to_string(), @r"
    define i32 @double(i32 %v) {
      %r2 = malloc {%eframe*, i32, [1 x i32]}
      %r3 = bitcast {%eframe*, i32, [1 x i32]}* %r2 to %eframe*
      %r4 = getelementptr %eframe* %r3, i32 0, i32 2, i32 0
      store i32 %v, i32* %r4
      %r5 = getelementptr %eframe* %r3, i32 0, i32 2, i32 0
      %r6 = load i32* %r5
      %r7 = malloc i32
      store i32 %r6, i32* %r7
      %r8 = getelementptr %eframe* %r3, i32 0, i32 2, i32 0
      %r9 = load i32* %r8
      %r10 = malloc i32
      store i32 %r9, i32* %r10
      %r11 = load i32* %r7
      %r12 = load i32* %r10
      %r13 = add i32 %r11, %r12
      %r14 = malloc i32
      store i32 %r13, i32* %r14
      %r15 = load i32* %r14
      ret i32 %r15
    label_0:
      %r16 = load i32* %r14
      ret i32 %r16
    }
    ");

    assert_snapshot!(module.entry.to_string(), @r"
    define i32 @llvm_main() {
      %r0 = malloc {%eframe*, i32, [0 x i32]}
      %r1 = bitcast {%eframe*, i32, [0 x i32]}* %r0 to %eframe*
      %r17 = malloc i32
      store i32 84, i32* %r17
      %r18 = load i32* %r17
      %r19 = call i32 @double(i32 %r18)
      %r20 = malloc i32
      store i32 %r19, i32* %r20
      %r21 = load i32* %r20
      ret i32 %r21
    }
    ");
}
