use pretty_assertions::assert_eq;
use quill::codegen::{self, CodegenError, Instruction, module::ENTRY_POINT};
use quill::syntax::{Expression, InfixOperator};

fn id(name: &str) -> Expression {
    Expression::identifier(name)
}

fn int(value: i32) -> Expression {
    Expression::integer(value)
}

fn labels(body: &[Instruction]) -> Vec<usize> {
    body.iter()
        .filter_map(|instruction| match instruction {
            Instruction::Label(label) => Some(*label),
            _ => None,
        })
        .collect()
}

fn countdown(name: &str) -> Expression {
    Expression::func_decl(
        name,
        &["n"],
        Expression::sequence(vec![
            Expression::while_loop(
                Expression::infix(id("n"), InfixOperator::GreaterThan, int(0)),
                Expression::assign(id("n"), Expression::infix(id("n"), InfixOperator::Sub, int(1))),
            ),
            Expression::ret(id("n")),
        ]),
    )
}

#[test]
fn root_frame_records_declarations_in_order() {
    let program = Expression::sequence(vec![
        Expression::declare("x", int(5)),
        Expression::declare("flag", Expression::boolean(false)),
        Expression::var_decl("later"),
    ]);
    let module = codegen::generate(&program).unwrap();
    let frame = &module.root_frame;

    assert_eq!(frame.names().collect::<Vec<_>>(), vec!["x", "flag", "later"]);
    assert_eq!(frame.initial_constant(0), Some(20));
    assert_eq!(frame.initial_constant(1), Some(7));
    // A bare declaration records whatever literal was lowered last.
    assert_eq!(frame.initial_constant(2), Some(7));
    assert!(
        module
            .to_string()
            .contains("%r0 = malloc {%eframe*, i32, [3 x i32]}")
    );
}

#[test]
fn every_function_numbers_its_labels_from_zero() {
    let program = Expression::sequence(vec![countdown("first"), countdown("second")]);
    let module = codegen::generate(&program).unwrap();

    let first = module.function("first").unwrap();
    let second = module.function("second").unwrap();
    assert_eq!(labels(&first.body), vec![0, 1, 2, 3]);
    assert_eq!(labels(&second.body), vec![0, 1, 2, 3]);
    assert!(labels(&module.entry.body).is_empty());
}

#[test]
fn registers_are_unique_across_the_module() {
    let program = Expression::sequence(vec![
        countdown("first"),
        Expression::declare("r", Expression::call(id("first"), vec![int(3)])),
        countdown("second"),
        Expression::call(id("second"), vec![id("r")]),
    ]);
    let module = codegen::generate(&program).unwrap();

    let mut destinations: Vec<usize> = module
        .functions
        .iter()
        .chain(std::iter::once(&module.entry))
        .flat_map(|function| function.body.iter())
        .filter_map(Instruction::dest)
        .collect();
    let total = destinations.len();
    destinations.sort_unstable();
    destinations.dedup();
    assert_eq!(destinations.len(), total);
}

#[test]
fn functions_appear_in_declaration_order_before_the_entry() {
    let program = Expression::sequence(vec![countdown("first"), countdown("second")]);
    let text = codegen::generate(&program).unwrap().to_string();

    let first = text.find("define i32 @first(i32 %n) {").unwrap();
    let second = text.find("define i32 @second(i32 %n) {").unwrap();
    let entry = text.find(&format!("define i32 @{}() {{", ENTRY_POINT)).unwrap();
    assert!(first < second && second < entry);
    assert!(text.ends_with("}\n"));
}

#[test]
fn nested_declarations_are_hoisted_ahead_of_their_parent() {
    let program = Expression::func_decl(
        "outer",
        &["a"],
        Expression::sequence(vec![
            countdown("inner"),
            Expression::ret(Expression::call(id("inner"), vec![id("a")])),
        ]),
    );
    let module = codegen::generate(&program).unwrap();
    let names: Vec<&str> = module.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["inner", "outer"]);
}

#[test]
fn outer_slots_are_not_readable_from_a_function() {
    let program = Expression::sequence(vec![
        Expression::declare("limit", int(10)),
        Expression::func_decl("get", &[], Expression::ret(id("limit"))),
    ]);
    let err = codegen::generate(&program).unwrap_err();
    assert_eq!(
        err,
        CodegenError::CapturedVariable {
            name: "limit".to_string()
        }
    );
}

#[test]
fn root_frame_survives_a_failed_function() {
    let mut generator = codegen::CodeGenerator::new(Default::default());
    generator.lower(&Expression::declare("x", int(1))).unwrap();
    let failing = Expression::func_decl("bad", &[], Expression::ret(id("missing")));
    assert!(generator.lower(&failing).is_err());
    assert_eq!(generator.frame().names().collect::<Vec<_>>(), vec!["x"]);
}

#[test]
fn lowering_errors() {
    let cases = vec![
        (
            Expression::call(Expression::closure(&[], int(1)), vec![]),
            "indirect Call expressions cannot be compiled",
        ),
        (id("nope"), "unbound identifier `nope` in Identifier"),
        (
            Expression::assign(int(1), int(2)),
            "cannot assign to Integer",
        ),
        (
            Expression::infix(
                Expression::boolean(true),
                InfixOperator::And,
                Expression::boolean(false),
            ),
            "And expressions cannot be compiled",
        ),
        (Expression::float(1.5), "Float expressions cannot be compiled"),
        (
            Expression::ret(Expression::var_decl("v")),
            "VarDecl does not produce a value",
        ),
    ];

    for (program, expected) in cases {
        let err = codegen::generate(&program).unwrap_err();
        assert_eq!(err.to_string(), expected, "program: {}", program);
    }
}
