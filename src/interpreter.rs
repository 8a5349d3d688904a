//! Tree-walking evaluator.
//!
//! Walks the AST produced by [`crate::parser`], threading a single
//! [`Environment`] chain and writing `print` output through a `Write` sink
//! so tests can capture it without touching real stdout.
//!
//! ```text
//! [Stmt]
//!    |
//!    v
//! +------------+
//! | Interpreter| --> evaluate expressions
//! |            | --> execute statements
//! |            | --> manage scopes
//! +------------+
//!    |
//!    v
//! side effects (print) + mutated Environment
//! ```
//!
//! There is no user-level `return` or `break`: every statement either
//! completes normally or a runtime error unwinds the whole evaluation, so
//! `execute` and `evaluate` are plain `Result`-returning methods — no
//! separate control-flow signal type is needed.

use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::diagnostics::RuntimeError;
use crate::environment::Environment;
use crate::token::{Token, TokenKind};

/// A callable capability: anything with an arity and a body that can be
/// invoked with already-evaluated arguments. Currently only the built-in
/// `clock` implements it, but the interface is deliberately minimal so
/// user-defined functions could plug in later without evaluator changes.
pub trait Callable: fmt::Debug {
    fn arity(&self) -> usize;
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<RuntimeValue>) -> Result<RuntimeValue, RuntimeError>;
    fn name(&self) -> &str;
}

/// All possible values at runtime.
#[derive(Debug, Clone)]
pub enum RuntimeValue {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Callable(Rc<dyn Callable>),
}

impl PartialEq for RuntimeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RuntimeValue::Nil, RuntimeValue::Nil) => true,
            (RuntimeValue::Bool(a), RuntimeValue::Bool(b)) => a == b,
            (RuntimeValue::Number(a), RuntimeValue::Number(b)) => a == b,
            (RuntimeValue::Str(a), RuntimeValue::Str(b)) => a == b,
            (RuntimeValue::Callable(a), RuntimeValue::Callable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl RuntimeValue {
    /// `Nil` and `Bool(false)` are falsey; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, RuntimeValue::Nil | RuntimeValue::Bool(false))
    }

    /// Both `Nil` -> equal; either-but-not-both `Nil` -> not equal;
    /// otherwise equal iff same runtime type and equal value. NaN
    /// comparisons fall through to `f64`'s native `PartialEq`.
    pub fn lox_equals(&self, other: &RuntimeValue) -> bool {
        self == other
    }
}

/// Canonical printable representation used by `print`: `nil`, `true`/
/// `false`, the string's own contents, or the default decimal
/// representation with exactly one trailing `.0` stripped.
pub fn stringify(value: &RuntimeValue) -> String {
    match value {
        RuntimeValue::Nil => "nil".to_string(),
        RuntimeValue::Bool(b) => b.to_string(),
        RuntimeValue::Str(s) => s.clone(),
        RuntimeValue::Number(n) => {
            let text = n.to_string();
            text.strip_suffix(".0").map(str::to_string).unwrap_or(text)
        }
        RuntimeValue::Callable(c) => format!("<fn {}>", c.name()),
    }
}

#[derive(Debug)]
struct Clock;

impl Callable for Clock {
    fn arity(&self) -> usize {
        0
    }

    fn call(&self, _interpreter: &mut Interpreter<'_>, _arguments: Vec<RuntimeValue>) -> Result<RuntimeValue, RuntimeError> {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Ok(RuntimeValue::Number(seconds))
    }

    fn name(&self) -> &str {
        "clock"
    }
}

pub struct Interpreter<'out> {
    globals: Environment,
    environment: Environment,
    out: Box<dyn Write + 'out>,
}

impl<'out> Interpreter<'out> {
    pub fn new(out: Box<dyn Write + 'out>) -> Self {
        let globals = Environment::new_global();
        globals.define("clock", RuntimeValue::Callable(Rc::new(Clock)));
        Interpreter { environment: globals.clone(), globals, out }
    }

    /// The root environment, pre-populated with `clock`. Exposed for
    /// embedders that want to inspect or seed global bindings before the
    /// first `interpret` call.
    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// Writes `text` straight to the interpreter's output sink, with no
    /// trailing newline. Used by the REPL driver to print its `"> "`
    /// prompt on the same sink `print` statements write to.
    pub fn write_raw(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{text}")?;
        self.out.flush()
    }

    /// Executes every statement in source order. Stops and propagates on
    /// the first runtime error; earlier side effects (already-printed
    /// output, already-mutated bindings) are not rolled back, matching the
    /// spec's "unwind the entire evaluator stack" semantics.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in statements {
            self.execute(stmt)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expression { expr } => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print { expr } => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", stringify(&value)).expect("write to print sink");
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => RuntimeValue::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::Block { statements } => self.execute_block(statements, self.environment.child()),
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
        }
    }

    /// Runs `statements` with `scope` as the active environment, then
    /// restores the previous environment on every exit path — normal
    /// completion or a propagating runtime error — via this guard-like
    /// swap-and-restore.
    fn execute_block(&mut self, statements: &[Stmt], scope: Environment) -> Result<(), RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, scope);
        let result = (|| {
            for stmt in statements {
                self.execute(stmt)?;
            }
            Ok(())
        })();
        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<RuntimeValue, RuntimeError> {
        match expr {
            Expr::Literal { value } => Ok(literal_to_runtime(value)),
            Expr::Grouping { inner } => self.evaluate(inner),
            Expr::Variable { name } => self.environment.get(name),
            Expr::Assignment { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Unary { op, right } => self.evaluate_unary(op, right),
            Expr::Binary { left, op, right } => self.evaluate_binary(left, op, right),
            Expr::Logical { left, op, right } => self.evaluate_logical(left, op, right),
            Expr::Call { callee, paren, arguments } => self.evaluate_call(callee, paren, arguments),
        }
    }

    fn evaluate_unary(&mut self, op: &Token, right: &Expr) -> Result<RuntimeValue, RuntimeError> {
        let right = self.evaluate(right)?;
        match op.kind {
            TokenKind::Minus => match right {
                RuntimeValue::Number(n) => Ok(RuntimeValue::Number(-n)),
                _ => Err(RuntimeError::not_a_number(op.line, "Operand must be a number.")),
            },
            TokenKind::Bang => Ok(RuntimeValue::Bool(!right.is_truthy())),
            _ => unreachable!("parser only produces ! or - unary operators"),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<RuntimeValue, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        use TokenKind::*;
        match op.kind {
            BangEqual => Ok(RuntimeValue::Bool(!left.lox_equals(&right))),
            EqualEqual => Ok(RuntimeValue::Bool(left.lox_equals(&right))),
            Greater | GreaterEqual | Less | LessEqual => {
                let (l, r) = as_number_pair(&left, &right, op.line)?;
                let result = match op.kind {
                    Greater => l > r,
                    GreaterEqual => l >= r,
                    Less => l < r,
                    LessEqual => l <= r,
                    _ => unreachable!(),
                };
                Ok(RuntimeValue::Bool(result))
            }
            Minus | Slash | Star => {
                let (l, r) = as_number_pair(&left, &right, op.line)?;
                let result = match op.kind {
                    Minus => l - r,
                    Slash => l / r,
                    Star => l * r,
                    _ => unreachable!(),
                };
                Ok(RuntimeValue::Number(result))
            }
            Plus => match (left, right) {
                (RuntimeValue::Str(l), RuntimeValue::Str(r)) => Ok(RuntimeValue::Str(l + &r)),
                (RuntimeValue::Number(l), RuntimeValue::Number(r)) => Ok(RuntimeValue::Number(l + r)),
                _ => Err(RuntimeError::bad_add_operands(op.line)),
            },
            _ => unreachable!("parser only produces comparison/arithmetic/equality binary operators"),
        }
    }

    fn evaluate_logical(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<RuntimeValue, RuntimeError> {
        let left = self.evaluate(left)?;
        match op.kind {
            TokenKind::Or if left.is_truthy() => Ok(left),
            TokenKind::Or => self.evaluate(right),
            TokenKind::And if !left.is_truthy() => Ok(left),
            TokenKind::And => self.evaluate(right),
            _ => unreachable!("parser only produces and/or logical operators"),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Result<RuntimeValue, RuntimeError> {
        let callee = self.evaluate(callee)?;

        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.evaluate(arg)?);
        }

        let callable = match callee {
            RuntimeValue::Callable(c) => c,
            _ => return Err(RuntimeError::not_callable(paren.line)),
        };

        if args.len() != callable.arity() {
            return Err(RuntimeError::arity_mismatch(paren.line, callable.arity(), args.len()));
        }

        callable.call(self, args)
    }
}

fn literal_to_runtime(value: &LiteralValue) -> RuntimeValue {
    match value {
        LiteralValue::Nil => RuntimeValue::Nil,
        LiteralValue::Bool(b) => RuntimeValue::Bool(*b),
        LiteralValue::Number(n) => RuntimeValue::Number(*n),
        LiteralValue::Str(s) => RuntimeValue::Str(s.clone()),
    }
}

fn as_number_pair(left: &RuntimeValue, right: &RuntimeValue, line: usize) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (RuntimeValue::Number(l), RuntimeValue::Number(r)) => Ok((*l, *r)),
        _ => Err(RuntimeError::not_a_number(line, "Operands must be numbers.")),
    }
}
