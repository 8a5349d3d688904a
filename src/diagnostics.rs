//! Diagnostic sinks shared by the scanner, parser, and evaluator.
//!
//! The core never decides process exit codes itself; it only reports
//! through the two sinks named in the spec — a lexical-error reporter and a
//! parse-error reporter — and flips a flag the driver inspects afterward.
//! Runtime errors are not reported through a sink at all: they unwind as an
//! ordinary `Result` and are printed once, by the driver, at the top.

use std::cell::Cell;
use std::fmt;

use crate::token::{Token, TokenKind};

/// Tracks whether a lexical/parse error or a runtime error occurred during
/// the current run. The REPL resets `had_error` (but not the environment)
/// between lines; `had_runtime_error` likewise resets per line.
#[derive(Default)]
pub struct ErrorFlag {
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl ErrorFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    pub fn mark_error(&self) {
        self.had_error.set(true);
    }

    pub fn mark_runtime_error(&self) {
        self.had_runtime_error.set(true);
    }

    pub fn reset(&self) {
        self.had_error.set(false);
        self.had_runtime_error.set(false);
    }
}

/// Reports a lexical error at `line` and marks `flag`.
///
/// Wire format: `[line L] Error: <message>\n`.
pub fn report_lex(flag: &ErrorFlag, line: usize, message: &str) {
    report(flag, line, "", message);
}

/// Reports a parse error at `token` and marks `flag`.
///
/// Wire format: `[line L] Error at end: <message>\n` when `token` is `EOF`,
/// otherwise `[line L] Error '<lexeme>': <message>\n`.
pub fn report_parse(flag: &ErrorFlag, token: &Token, message: &str) {
    if token.kind == TokenKind::Eof {
        report(flag, token.line, " at end", message);
    } else {
        report(flag, token.line, &format!(" '{}'", token.lexeme), message);
    }
}

fn report(flag: &ErrorFlag, line: usize, where_: &str, message: &str) {
    eprintln!("[line {line}] Error{where_}: {message}");
    flag.mark_error();
}

/// The kind of failure a runtime error represents, closed over the set the
/// evaluator can actually raise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UndefinedVariable,
    NotANumber,
    BadAddOperands,
    NotCallable,
    ArityMismatch,
}

/// A runtime error: always carries the source line of the operation that
/// failed plus a rendered message, matching `RuntimeError[line L]: <message>`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub line: usize,
    pub message: String,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, line: usize, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            line,
            message: message.into(),
        }
    }

    pub fn undefined_variable(line: usize, name: &str) -> Self {
        Self::new(
            RuntimeErrorKind::UndefinedVariable,
            line,
            format!("Undefined variable {name}."),
        )
    }

    pub fn not_a_number(line: usize, message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::NotANumber, line, message)
    }

    pub fn bad_add_operands(line: usize) -> Self {
        Self::new(
            RuntimeErrorKind::BadAddOperands,
            line,
            "Operands must be two numbers or two strings.",
        )
    }

    pub fn not_callable(line: usize) -> Self {
        Self::new(RuntimeErrorKind::NotCallable, line, "Can only call functions and classes.")
    }

    pub fn arity_mismatch(line: usize, expected: usize, got: usize) -> Self {
        Self::new(
            RuntimeErrorKind::ArityMismatch,
            line,
            format!("Expected {expected} arguments but got {got}."),
        )
    }

    /// Prints this error to standard error in the driver-level wire format
    /// and marks `flag`.
    pub fn report(&self, flag: &ErrorFlag) {
        eprintln!("{self}");
        flag.mark_runtime_error();
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuntimeError[line {}]: {}", self.line, self.message)
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_wire_format_at_eof() {
        let flag = ErrorFlag::new();
        let eof = Token::new(TokenKind::Eof, "", None, 3);
        report_parse(&flag, &eof, "Expect expression.");
        assert!(flag.had_error());
    }

    #[test]
    fn runtime_error_display_matches_contract() {
        let err = RuntimeError::undefined_variable(7, "a");
        assert_eq!(format!("{err}"), "RuntimeError[line 7]: Undefined variable a.");
    }

    #[test]
    fn flag_reset_clears_both_bits() {
        let flag = ErrorFlag::new();
        flag.mark_error();
        flag.mark_runtime_error();
        flag.reset();
        assert!(!flag.had_error());
        assert!(!flag.had_runtime_error());
    }
}
