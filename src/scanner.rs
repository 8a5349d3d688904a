//! Scanner: turns a source string into a token list.
//!
//! A single forward pass over the source's Unicode scalar values. Two
//! cursors track the current lexeme: `start` (its first character) and
//! `current` (one past its last consumed character). Only the ASCII subset
//! is semantically significant — identifiers, digits, operators — so
//! non-ASCII bytes inside string literals simply ride along unexamined.

use crate::diagnostics::{report_lex, ErrorFlag};
use crate::token::{keyword, Literal, Token, TokenKind};

/// `String -> [Token]`, terminated by a synthetic `EOF`.
///
/// Lexical errors are reported through `flag` but never abort the scan;
/// the caller decides whether to proceed to parsing based on
/// `flag.had_error()`.
pub struct Scanner<'a> {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    flag: &'a ErrorFlag,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &str, flag: &'a ErrorFlag) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            flag,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        self.tokens.push(Token::new(TokenKind::Eof, "", None, self.line));
        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        use TokenKind::*;
        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            ',' => self.add_token(Comma),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),
            '!' => {
                let kind = if self.match_char('=') { BangEqual } else { Bang };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.match_char('=') { EqualEqual } else { Equal };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.match_char('=') { LessEqual } else { Less };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.match_char('=') { GreaterEqual } else { Greater };
                self.add_token(kind);
            }
            '/' => {
                if self.match_char('/') {
                    while self.peek() != Some('\n') && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(Slash);
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if is_identifier_start(c) => self.identifier(),
            _ => report_lex(self.flag, self.line, "Unexpected character."),
        }
    }

    fn string(&mut self) {
        while self.peek() != Some('"') && !self.is_at_end() {
            if self.peek() == Some('\n') {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            report_lex(self.flag, self.line, "Unterminated string.");
            return;
        }

        // Consume the closing quote.
        self.advance();

        let value: String = self.source[self.start + 1..self.current - 1].iter().collect();
        self.add_token_with_literal(TokenKind::String, Some(Literal::Str(value)));
    }

    fn number(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        match text.parse::<f64>() {
            Ok(n) => self.add_token_with_literal(TokenKind::Number, Some(Literal::Num(n))),
            Err(_) => report_lex(self.flag, self.line, "Invalid number literal."),
        }
    }

    fn identifier(&mut self) {
        while self.peek().is_some_and(is_identifier_continue) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let kind = keyword(&text).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() != Some(expected) {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.current + 1).copied()
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_with_literal(kind, None);
    }

    fn add_token_with_literal(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> (Vec<Token>, bool) {
        let flag = ErrorFlag::new();
        let tokens = Scanner::new(src, &flag).scan_tokens();
        (tokens, flag.had_error())
    }

    #[test]
    fn terminates_with_exactly_one_eof() {
        let (tokens, had_error) = scan("var a = 1;");
        assert!(!had_error);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    }

    #[test]
    fn scans_two_char_operators() {
        let (tokens, _) = scan("!= == <= >=");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::BangEqual,
                TokenKind::EqualEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_literal_carries_unquoted_body() {
        let (tokens, had_error) = scan("\"hi there\"");
        assert!(!had_error);
        assert_eq!(tokens[0].literal, Some(Literal::Str("hi there".to_string())));
    }

    #[test]
    fn unterminated_string_is_reported() {
        let (_, had_error) = scan("\"abc");
        assert!(had_error);
    }

    #[test]
    fn number_literal_strips_to_f64() {
        let (tokens, _) = scan("3.5");
        assert_eq!(tokens[0].literal, Some(Literal::Num(3.5)));
    }

    #[test]
    fn line_comment_is_skipped() {
        let (tokens, _) = scan("// a comment\nvar");
        assert_eq!(tokens[0].kind, TokenKind::Var);
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn keyword_vs_identifier() {
        let (tokens, _) = scan("while whiled");
        assert_eq!(tokens[0].kind, TokenKind::While);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn unexpected_character_is_reported_but_scanning_continues() {
        let (tokens, had_error) = scan("@ var x;");
        assert!(had_error);
        // scanning still produced the rest of the tokens
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Var));
    }

    #[test]
    fn multiline_string_bumps_line_counter() {
        let (tokens, _) = scan("\"a\nb\" 1");
        assert_eq!(tokens[1].line, 2);
    }
}
