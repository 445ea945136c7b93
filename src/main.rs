use std::{env, fs, io, process};

use quill::{
    codegen::{self, CodegenOptions},
    program::{load_program, to_json},
    runtime::Interpreter,
    syntax::Expression,
};

fn main() {
    let mut args: Vec<String> = env::args().collect();
    let verbose = args.iter().any(|arg| arg == "--verbose");
    let signed = args.iter().any(|arg| arg == "--signed");
    if verbose {
        args.retain(|arg| arg != "--verbose");
    }
    if signed {
        args.retain(|arg| arg != "--signed");
    }
    let output = match extract_output(&mut args) {
        Some(value) => value,
        None => return,
    };

    init_tracing(verbose);

    if args.len() < 2 {
        print_help();
        return;
    }

    if is_program_file(&args[1]) {
        run_file(&args[1]);
        return;
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => {
            print_help();
        }
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: quill run <program.json>");
                return;
            }
            run_file(&args[2]);
        }
        "emit" => {
            if args.len() < 3 {
                eprintln!("Usage: quill emit <program.json> [-o <file.ll>] [--signed]");
                return;
            }
            let options = CodegenOptions {
                signed_arithmetic: signed,
            };
            emit_file(&args[2], options, output.as_deref());
        }
        "dump" => {
            if args.len() < 3 {
                eprintln!("Usage: quill dump <program.json>");
                return;
            }
            dump_file(&args[2]);
        }
        other => {
            eprintln!("Error: unknown command `{}`", other);
            print_help();
            process::exit(2);
        }
    }
}

fn print_help() {
    println!(
        "\
Quill CLI

Usage:
  quill <program.json>
  quill run <program.json>
  quill emit <program.json> [-o <file.ll>]
  quill dump <program.json>

Flags:
  --verbose          Log interpreter and code generator activity
  --signed           Use ashr/sdiv instead of lshr/udiv in emitted code
  -o <file>          Write the emitted module to a file instead of stdout
  -h, --help         Show this help message

Environment:
  QUILL_LOG          Log filter (default: warn), e.g. QUILL_LOG=quill=trace
"
    );
}

/// Installs the fmt subscriber on stderr. `--verbose` overrides `QUILL_LOG`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}

fn extract_output(args: &mut Vec<String>) -> Option<Option<String>> {
    let mut output = None;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "-o" || args[i] == "--output" {
            if i + 1 >= args.len() {
                eprintln!("Usage: quill emit <program.json> -o <file.ll>");
                return None;
            }
            output = Some(args.remove(i + 1));
            args.remove(i);
            continue;
        }
        i += 1;
    }
    Some(output)
}

fn is_program_file(path: &str) -> bool {
    path.ends_with(".json")
}

fn load_or_exit(path: &str) -> Expression {
    match load_program(path) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    }
}

fn run_file(path: &str) {
    let program = load_or_exit(path);
    let mut interpreter = Interpreter::new();
    match interpreter.run(&program) {
        Ok(value) => println!("{}", value.to_string_value()),
        Err(err) => {
            eprintln!("Runtime error: {}", err);
            process::exit(1);
        }
    }
}

fn emit_file(path: &str, options: CodegenOptions, output: Option<&str>) {
    let program = load_or_exit(path);
    let module = match codegen::generate_with(&program, options) {
        Ok(module) => module,
        Err(err) => {
            eprintln!("Codegen error: {}", err);
            process::exit(1);
        }
    };

    match output {
        Some(file) => {
            if let Err(err) = fs::write(file, module.to_string()) {
                eprintln!("Error: failed to write {}: {}", file, err);
                process::exit(1);
            }
        }
        None => print!("{}", module),
    }
}

fn dump_file(path: &str) {
    let program = load_or_exit(path);
    println!("{}", program);
    match to_json(&program) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    }
}
