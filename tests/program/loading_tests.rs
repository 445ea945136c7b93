use std::path::PathBuf;

use pretty_assertions::assert_eq;
use quill::codegen;
use quill::program::{LoadError, load_program, parse_program, to_json};
use quill::runtime::{Interpreter, Value};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
}

fn run_demo(name: &str) -> (Value, String) {
    let program = load_program(demo(name)).unwrap_or_else(|e| panic!("{}: {}", name, e));
    let mut interpreter = Interpreter::with_output(Vec::new());
    let value = interpreter.run(&program).unwrap();
    let printed = String::from_utf8(interpreter.into_output()).unwrap();
    (value, printed)
}

#[test]
fn factorial_demo_runs() {
    assert_eq!(run_demo("factorial.json"), (Value::Int(120), String::new()));
}

#[test]
fn sum_loop_demo_runs() {
    assert_eq!(run_demo("sum_loop.json"), (Value::Int(10), String::new()));
}

#[test]
fn greeting_demo_prints() {
    assert_eq!(
        run_demo("greeting.json"),
        (Value::Int(12), "hello world\n5\n".to_string())
    );
}

#[test]
fn compilable_demos_generate_modules() {
    for name in ["factorial.json", "sum_loop.json"] {
        let program = load_program(demo(name)).unwrap();
        let module = codegen::generate(&program).unwrap();
        assert!(module.to_string().contains("define i32 @llvm_main() {"));
    }

    let factorial = codegen::generate(&load_program(demo("factorial.json")).unwrap()).unwrap();
    assert!(factorial.function("fact").is_some());
}

#[test]
fn greeting_demo_is_interpreter_only() {
    let program = load_program(demo("greeting.json")).unwrap();
    let err = codegen::generate(&program).unwrap_err();
    assert_eq!(err.to_string(), "String expressions cannot be compiled");
}

#[test]
fn dumped_programs_load_back_unchanged() {
    for name in ["factorial.json", "sum_loop.json", "greeting.json"] {
        let program = load_program(demo(name)).unwrap();
        let json = to_json(&program).unwrap();
        assert_eq!(parse_program(&json).unwrap(), program, "{}", name);
    }
}

#[test]
fn malformed_json_is_reported() {
    let err = parse_program("{\"Integer\": {\"value\": \"seven\"}}").unwrap_err();
    assert!(matches!(err, LoadError::Json(_)));
}

#[test]
fn missing_files_keep_the_io_error_as_source() {
    let err = load_program(demo("missing.json")).unwrap_err();
    match err {
        LoadError::Io { path, source } => {
            assert!(path.ends_with("missing.json"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected an I/O error, got {:?}", other),
    }
}
