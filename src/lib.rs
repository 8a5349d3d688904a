//! `lox` — a tree-walking interpreter for the Lox scripting language.
//!
//! The library crate holds the whole pipeline (scanner, parser, AST,
//! environment, evaluator) plus the CLI driver; `src/main.rs` is a thin
//! wrapper that calls [`run_cli`] and turns its exit code into the
//! process's actual exit status.
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | `0`  | success |
//! | `64` | usage error (wrong number of arguments) |
//! | `65` | a lexical or parse error occurred |
//! | `70` | a runtime error occurred |

pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod token;

use std::io::{self, BufRead, Write};

use diagnostics::ErrorFlag;
use interpreter::Interpreter;
use parser::Parser;
use scanner::Scanner;

pub const EXIT_OK: i32 = 0;
pub const EXIT_USAGE: i32 = 64;
pub const EXIT_DATA_ERROR: i32 = 65;
pub const EXIT_SOFTWARE: i32 = 70;

/// A debug dump requested via an optional leading CLI flag. Neither variant
/// is required for correct execution — both are ambient diagnostic tooling
/// carried over from the original implementation's unconditional dump, kept
/// here behind an explicit opt-in instead.
#[derive(Clone, Copy, PartialEq, Eq)]
enum DumpMode {
    None,
    Tokens,
    Ast,
}

/// Dispatches between batch and REPL mode based on `args` (as would be
/// collected from `std::env::args().skip(1)`), and returns the process
/// exit code. Argument parsing is hand-rolled rather than routed through a
/// general-purpose CLI parser so this exact exit-code contract is never
/// reshaped by a parser's own usage conventions.
pub fn run_cli(args: &[String]) -> i32 {
    match args {
        [] => run_prompt(&mut io::stdin().lock(), &mut io::stdout()),
        [path] => run_file(path),
        [flag, path] if flag == "--dump-tokens" => run_file_dumping(path, DumpMode::Tokens),
        [flag, path] if flag == "--dump-ast" => run_file_dumping(path, DumpMode::Ast),
        _ => {
            eprintln!("Usage: lox [--dump-tokens | --dump-ast] [script]");
            EXIT_USAGE
        }
    }
}

/// Reads `path`, runs it as a complete program, and returns the exit code
/// implied by whether a lexical/parse or runtime error occurred.
pub fn run_file(path: &str) -> i32 {
    run_file_dumping(path, DumpMode::None)
}

fn run_file_dumping(path: &str, dump: DumpMode) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: could not read '{path}': {e}");
            return EXIT_DATA_ERROR;
        }
    };

    let flag = ErrorFlag::new();

    if dump == DumpMode::Tokens {
        let tokens = Scanner::new(&source, &flag).scan_tokens();
        for token in &tokens {
            println!("{token}");
        }
        flag.reset();
    } else if dump == DumpMode::Ast {
        let tokens = Scanner::new(&source, &flag).scan_tokens();
        let statements = Parser::new(tokens, &flag).parse();
        for stmt in &statements {
            println!("{stmt:?}");
        }
        flag.reset();
    }

    let mut interpreter = Interpreter::new(Box::new(io::stdout()));
    run(&source, &flag, &mut interpreter);

    if flag.had_error() {
        EXIT_DATA_ERROR
    } else if flag.had_runtime_error() {
        EXIT_SOFTWARE
    } else {
        EXIT_OK
    }
}

/// Reads one line at a time from `input`, prompting with `"> "`, and
/// evaluates each line as a complete program. An empty line terminates the
/// loop (the spec's deliberate convention); real EOF on `input` (e.g.
/// piped input) terminates it too. The per-line error flag is reset before
/// each line, but the environment — and so all variable state — persists
/// across the whole session.
pub fn run_prompt(input: &mut impl BufRead, output: &mut impl Write) -> i32 {
    let flag = ErrorFlag::new();
    let mut interpreter = Interpreter::new(Box::new(output));
    let mut had_any_error = false;

    loop {
        interpreter.write_raw("> ").expect("write to prompt sink");

        let mut line = String::new();
        let bytes_read = input.read_line(&mut line).expect("read from prompt source");
        if bytes_read == 0 {
            break; // real EOF, e.g. piped input or Ctrl-D
        }

        let line = line.strip_suffix('\n').unwrap_or(&line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            break;
        }

        flag.reset();
        run(line, &flag, &mut interpreter);
        had_any_error = had_any_error || flag.had_error() || flag.had_runtime_error();
    }

    if had_any_error {
        EXIT_DATA_ERROR
    } else {
        EXIT_OK
    }
}

/// Runs one complete program: scan, parse, and (if no lexical/parse error
/// was reported) evaluate. Leaves error state in `flag` for the caller to
/// inspect.
fn run(source: &str, flag: &ErrorFlag, interpreter: &mut Interpreter<'_>) {
    let tokens = Scanner::new(source, flag).scan_tokens();
    let statements = Parser::new(tokens, flag).parse();

    if flag.had_error() {
        return;
    }

    if let Err(err) = interpreter.interpret(&statements) {
        err.report(flag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn repl(input: &str) -> (String, i32) {
        let mut out = Vec::new();
        let mut cursor = Cursor::new(input.as_bytes().to_vec());
        let code = run_prompt(&mut cursor, &mut out);
        (String::from_utf8(out).unwrap(), code)
    }

    #[test]
    fn empty_line_terminates_repl() {
        let (out, code) = repl("\n");
        assert!(out.starts_with("> "));
        assert_eq!(code, EXIT_OK);
    }

    #[test]
    fn repl_preserves_environment_across_lines() {
        let (_, code) = repl("var a = 1;\nprint a;\n\n");
        assert_eq!(code, EXIT_OK);
    }

    #[test]
    fn repl_resets_error_flag_between_lines_but_keeps_going() {
        // the first line has a parse error; the second is fine and still runs.
        let (_, code) = repl("var = 3;\nprint 1;\n\n");
        assert_eq!(code, EXIT_DATA_ERROR);
    }

    #[test]
    fn usage_error_on_too_many_arguments() {
        let code = run_cli(&["a".to_string(), "b".to_string()]);
        assert_eq!(code, EXIT_USAGE);
    }

    fn temp_script(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn dump_tokens_flag_still_runs_the_program() {
        let file = temp_script("print 1 + 1;");
        let code = run_cli(&["--dump-tokens".to_string(), file.path().to_str().unwrap().to_string()]);
        assert_eq!(code, EXIT_OK);
    }

    #[test]
    fn dump_ast_flag_still_runs_the_program() {
        let file = temp_script("print 1 + 1;");
        let code = run_cli(&["--dump-ast".to_string(), file.path().to_str().unwrap().to_string()]);
        assert_eq!(code, EXIT_OK);
    }
}
