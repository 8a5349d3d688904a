//! Parser: recursive descent with one-token lookahead and panic-mode error
//! recovery.
//!
//! ```text
//! program     -> declaration* EOF
//! declaration -> varDecl | statement
//! varDecl     -> "var" IDENTIFIER ("=" expression)? ";"
//! statement   -> printStmt | ifStmt | whileStmt | forStmt | block | exprStmt
//! printStmt   -> "print" expression ";"
//! ifStmt      -> "if" "(" expression ")" statement ("else" statement)?
//! whileStmt   -> "while" "(" expression ")" statement
//! forStmt     -> "for" "(" (varDecl | exprStmt | ";") expression? ";" expression? ")" statement
//! block       -> "{" declaration* "}"
//! exprStmt    -> expression ";"
//!
//! expression  -> assignment
//! assignment  -> IDENTIFIER "=" assignment | logic_or
//! logic_or    -> logic_and ("or" logic_and)*
//! logic_and   -> equality  ("and" equality)*
//! equality    -> comparison (("==" | "!=") comparison)*
//! comparison  -> term       ((">" | ">=" | "<" | "<=") term)*
//! term        -> factor     (("+" | "-") factor)*
//! factor      -> unary      (("/" | "*") unary)*
//! unary       -> ("!" | "-") unary | call
//! call        -> primary ("(" arguments? ")")*
//! arguments   -> expression ("," expression)*
//! primary     -> NUMBER | STRING | "true" | "false" | "nil"
//!              | "(" expression ")" | IDENTIFIER
//! ```
//!
//! A `for` loop is not a distinct AST node — it is desugared here into a
//! `Block` wrapping a `While` (see [`Parser::for_statement`]).

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::diagnostics::{report_parse, ErrorFlag};
use crate::token::{Literal, Token, TokenKind};

const MAX_ARGUMENTS: usize = 255;

/// Signals that a parse error was already reported and the caller should
/// unwind to the nearest declaration boundary and `synchronize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    flag: &'a ErrorFlag,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, flag: &'a ErrorFlag) -> Self {
        Parser { tokens, current: 0, flag }
    }

    /// Parses every declaration in the token stream. Individual parse
    /// errors are reported and recovered from via `synchronize`; the
    /// returned list may therefore omit the statement that failed while
    /// still containing everything parsed around it. Callers must check
    /// `flag.had_error()` before executing the result.
    pub fn parse(mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(ParseError) => self.synchronize(),
            }
        }
        statements
    }

    // ---- declarations -----------------------------------------------

    fn declaration(&mut self) -> ParseResult<Stmt> {
        if self.match_kind(&[TokenKind::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expected variable name.")?;
        let initializer = if self.match_kind(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    // ---- statements ---------------------------------------------------

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.match_kind(&[TokenKind::Print]) {
            return self.print_statement();
        }
        if self.match_kind(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.match_kind(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.match_kind(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.match_kind(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block { statements: self.block()? });
        }
        self.expression_statement()
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print { expr })
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression { expr })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_kind(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    /// Desugars `for (init; cond; incr) body` into:
    ///
    /// ```text
    /// Block [
    ///   init,                                  -- omitted if absent
    ///   While(cond_or_true,
    ///         Block [ body, Expression(incr) ]) -- inner Block omitted if incr absent
    /// ]
    /// ```
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.match_kind(&[TokenKind::Semicolon]) {
            None
        } else if self.match_kind(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            self.expression()?
        } else {
            Expr::Literal { value: LiteralValue::Bool(true) }
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(TokenKind::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block {
                statements: vec![body, Stmt::Expression { expr: increment }],
            };
        }

        body = Stmt::While { condition, body: Box::new(body) };

        if let Some(initializer) = initializer {
            body = Stmt::Block { statements: vec![initializer, body] };
        }

        Ok(body)
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    // ---- expressions ---------------------------------------------------

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.match_kind(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            if let Expr::Variable { name } = expr {
                return Ok(Expr::Assignment { name, value: Box::new(value) });
            }

            report_parse(self.flag, &equals, "Invalid assignment target.");
            return Err(ParseError);
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;
        while self.match_kind(&[TokenKind::Or]) {
            let op = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical { left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.match_kind(&[TokenKind::And]) {
            let op = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical { left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_fold(Self::comparison, &[TokenKind::BangEqual, TokenKind::EqualEqual])
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_fold(
            Self::term,
            &[TokenKind::Greater, TokenKind::GreaterEqual, TokenKind::Less, TokenKind::LessEqual],
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_fold(Self::factor, &[TokenKind::Minus, TokenKind::Plus])
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_fold(Self::unary, &[TokenKind::Slash, TokenKind::Star])
    }

    /// Left-associative binary operator loop: parse one `operand`, then
    /// while the next token is one of `kinds`, consume it and fold into a
    /// `Binary` node.
    fn binary_fold(
        &mut self,
        operand: fn(&mut Self) -> ParseResult<Expr>,
        kinds: &[TokenKind],
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while self.match_kind(kinds) {
            let op = self.previous().clone();
            let right = operand(self)?;
            expr = Expr::Binary { left: Box::new(expr), op, right: Box::new(right) };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.match_kind(&[TokenKind::Bang, TokenKind::Minus]) {
            let op = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary { op, right: Box::new(right) });
        }
        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.match_kind(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    report_parse(self.flag, self.peek(), "Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);
                if !self.match_kind(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::Call { callee: Box::new(callee), paren, arguments })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.match_kind(&[TokenKind::False]) {
            return Ok(Expr::Literal { value: LiteralValue::Bool(false) });
        }
        if self.match_kind(&[TokenKind::True]) {
            return Ok(Expr::Literal { value: LiteralValue::Bool(true) });
        }
        if self.match_kind(&[TokenKind::Nil]) {
            return Ok(Expr::Literal { value: LiteralValue::Nil });
        }
        if self.match_kind(&[TokenKind::Number]) {
            let n = match &self.previous().literal {
                Some(Literal::Num(n)) => *n,
                _ => unreachable!("scanner always attaches a Num literal to Number tokens"),
            };
            return Ok(Expr::Literal { value: LiteralValue::Number(n) });
        }
        if self.match_kind(&[TokenKind::String]) {
            let s = match &self.previous().literal {
                Some(Literal::Str(s)) => s.clone(),
                _ => unreachable!("scanner always attaches a Str literal to String tokens"),
            };
            return Ok(Expr::Literal { value: LiteralValue::Str(s) });
        }
        if self.match_kind(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable { name: self.previous().clone() });
        }
        if self.match_kind(&[TokenKind::LeftParen]) {
            let inner = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping { inner: Box::new(inner) });
        }

        let err = ParseError;
        report_parse(self.flag, self.peek(), "Expect expression.");
        Err(err)
    }

    // ---- error recovery -------------------------------------------------

    /// Consumes tokens until the one just consumed is a `;`, or the next
    /// token begins a new statement. Resumes parsing of declarations from
    /// there.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Class
                | TokenKind::For
                | TokenKind::Fun
                | TokenKind::If
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::Var
                | TokenKind::While => return,
                _ => {}
            }

            self.advance();
        }
    }

    // ---- token-stream primitives ----------------------------------------

    fn match_kind(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|k| self.check(*k)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        report_parse(self.flag, self.peek(), message);
        Err(ParseError)
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }
}
