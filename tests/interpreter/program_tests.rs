use pretty_assertions::assert_eq;
use quill::runtime::{EvalError, Interpreter, Value};
use quill::syntax::{Expression, InfixOperator};

fn id(name: &str) -> Expression {
    Expression::identifier(name)
}

fn int(value: i32) -> Expression {
    Expression::integer(value)
}

fn string(value: &str) -> Expression {
    Expression::string(value)
}

fn infix(left: Expression, operator: InfixOperator, right: Expression) -> Expression {
    Expression::infix(left, operator, right)
}

/// Runs `program` and returns its result together with everything it printed.
fn run_capturing(program: &Expression) -> (Result<Value, EvalError>, String) {
    let mut interpreter = Interpreter::with_output(Vec::new());
    let result = interpreter.run(program);
    let printed = String::from_utf8(interpreter.into_output()).unwrap();
    (result, printed)
}

#[test]
fn fizzbuzz_style_loop_prints_every_step() {
    // i = 1; while i <= 5 { if i == 3 print("fizz") else print(i); i = i + 1 }
    let program = Expression::sequence(vec![
        Expression::declare("i", int(1)),
        Expression::while_loop(
            infix(id("i"), InfixOperator::LessEq, int(5)),
            Expression::sequence(vec![
                Expression::if_else(
                    infix(id("i"), InfixOperator::Equals, int(3)),
                    Expression::print(string("fizz")),
                    Some(Expression::print(id("i"))),
                ),
                Expression::assign(id("i"), infix(id("i"), InfixOperator::Add, int(1))),
            ]),
        ),
        id("i"),
    ]);

    let (result, printed) = run_capturing(&program);
    assert_eq!(result.unwrap(), Value::Int(6));
    assert_eq!(printed, "1\n2\nfizz\n4\n5\n");
}

#[test]
fn gcd_through_a_declared_function() {
    // fun gcd(a, b) { while !(b == 0) { var t = b; b = a - (a / b) * b; a = t }; return a }
    let body = Expression::sequence(vec![
        Expression::while_loop(
            Expression::logical_not(infix(id("b"), InfixOperator::Equals, int(0))),
            Expression::scope(Expression::sequence(vec![
                Expression::declare("t", id("b")),
                Expression::assign(
                    id("b"),
                    infix(
                        id("a"),
                        InfixOperator::Sub,
                        infix(
                            infix(id("a"), InfixOperator::Div, id("b")),
                            InfixOperator::Mult,
                            id("b"),
                        ),
                    ),
                ),
                Expression::assign(id("a"), id("t")),
            ])),
        ),
        Expression::ret(id("a")),
    ]);
    let program = Expression::sequence(vec![
        Expression::func_decl("gcd", &["a", "b"], body),
        Expression::call(id("gcd"), vec![int(84), int(36)]),
    ]);

    let (result, _) = run_capturing(&program);
    assert_eq!(result.unwrap(), Value::Int(12));
}

#[test]
fn strings_and_objects_work_together() {
    let program = Expression::sequence(vec![
        Expression::declare(
            "person",
            Expression::Object {
                fields: vec![
                    ("name".to_string(), string("Ada Lovelace")),
                    ("born".to_string(), int(1815)),
                ],
            },
        ),
        Expression::declare(
            "first",
            Expression::Substring {
                value: Box::new(Expression::Field {
                    object: Box::new(id("person")),
                    name: "name".to_string(),
                }),
                start: Box::new(int(0)),
                end: Box::new(int(3)),
            },
        ),
        Expression::print(infix(id("first"), InfixOperator::Add, string("!"))),
        Expression::print(Expression::StringLength {
            value: Box::new(id("first")),
        }),
        Expression::print(infix(id("first"), InfixOperator::StringLess, string("Bob"))),
        Expression::IsType {
            value: Box::new(id("person")),
            type_name: "PlainObject".to_string(),
        },
    ]);

    let (result, printed) = run_capturing(&program);
    assert_eq!(result.unwrap(), Value::Bool(true));
    assert_eq!(printed, "Ada!\n3\ntrue\n");
}

#[test]
fn prints_objects_with_sorted_fields() {
    let program = Expression::print(Expression::Object {
        fields: vec![
            ("z".to_string(), Expression::boolean(false)),
            ("a".to_string(), string("text")),
        ],
    });
    let (result, printed) = run_capturing(&program);
    assert_eq!(result.unwrap(), Value::Void);
    assert_eq!(printed, "{a: \"text\", z: false}\n");
}

#[test]
fn scoped_declarations_do_not_leak() {
    let program = Expression::sequence(vec![
        Expression::declare("x", int(1)),
        Expression::scope(Expression::sequence(vec![
            Expression::declare("x", int(2)),
            Expression::declare("y", int(3)),
        ])),
        Expression::print(id("x")),
        id("y"),
    ]);

    let (result, printed) = run_capturing(&program);
    assert_eq!(printed, "1\n");
    assert!(matches!(
        result,
        Err(EvalError::UnboundIdentifier { ref name, .. }) if name == "y"
    ));
}

#[test]
fn runtime_errors_stop_the_program() {
    let program = Expression::sequence(vec![
        Expression::print(string("before")),
        infix(int(1), InfixOperator::Div, int(0)),
        Expression::print(string("after")),
    ]);

    let (result, printed) = run_capturing(&program);
    assert_eq!(printed, "before\n");
    assert_eq!(result.unwrap_err().to_string(), "division by zero in Div");
}

#[test]
fn a_program_result_that_names_a_binding_is_resolved() {
    let program = Expression::sequence(vec![
        Expression::declare("greeting", string("hi")),
        id("greeting"),
    ]);
    let (result, _) = run_capturing(&program);
    assert_eq!(result.unwrap(), Value::String("hi".into()));
}

#[test]
fn repeated_calls_do_not_grow_the_store() {
    // fun f(v) { return v }; i = 0; while i < 10000 { i = f(i + 1) }
    let program = Expression::sequence(vec![
        Expression::func_decl("f", &["v"], Expression::ret(id("v"))),
        Expression::declare("i", int(0)),
        Expression::while_loop(
            infix(id("i"), InfixOperator::LessThan, int(10_000)),
            Expression::assign(
                id("i"),
                Expression::call(id("f"), vec![infix(id("i"), InfixOperator::Add, int(1))]),
            ),
        ),
        id("i"),
    ]);
    let mut interpreter = Interpreter::with_output(Vec::new());
    assert_eq!(interpreter.run(&program).unwrap(), Value::Int(10_000));
    assert_eq!(interpreter.store().len(), 2);
}

#[test]
fn scoped_loop_bodies_do_not_grow_the_store() {
    let program = Expression::sequence(vec![
        Expression::declare("i", int(0)),
        Expression::while_loop(
            infix(id("i"), InfixOperator::LessThan, int(1_000)),
            Expression::scope(Expression::sequence(vec![
                Expression::declare("next", infix(id("i"), InfixOperator::Add, int(1))),
                Expression::assign(id("i"), id("next")),
            ])),
        ),
        id("i"),
    ]);
    let mut interpreter = Interpreter::with_output(Vec::new());
    assert_eq!(interpreter.run(&program).unwrap(), Value::Int(1_000));
    assert_eq!(interpreter.store().len(), 1);
}
