use lox::diagnostics::{ErrorFlag, RuntimeError};
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::scanner::Scanner;

/// Runs `source` end to end and returns `(captured stdout, had_parse_error,
/// runtime result)`.
pub fn run(source: &str) -> (String, bool, Result<(), RuntimeError>) {
    let flag = ErrorFlag::new();
    let tokens = Scanner::new(source, &flag).scan_tokens();
    let statements = Parser::new(tokens, &flag).parse();

    let mut buffer = Vec::new();
    let result = if flag.had_error() {
        Ok(())
    } else {
        let mut interpreter = Interpreter::new(Box::new(&mut buffer));
        interpreter.interpret(&statements)
    };

    (String::from_utf8(buffer).unwrap(), flag.had_error(), result)
}
