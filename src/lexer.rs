//! Tokenizer for ITMOScript source text.
//!
//! Produces a flat token stream terminated by `Eof`. Newlines are
//! preserved as `Newline` tokens since the grammar treats them as
//! optional statement terminators; all other whitespace is skipped.

use thiserror::Error;

use crate::token::{Span, Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character '{character}' at line {line}, column {column}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Expected '=' after '!' at line {line}, column {column}")]
    BangWithoutEqual { line: usize, column: usize },
}

pub type LexResult<T> = Result<T, LexError>;

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn next_token(&mut self) -> LexResult<Token> {
        loop {
            match self.peek_char() {
                None => return Ok(Token::new(TokenKind::Eof, self.span())),
                Some('\n') => {
                    let span = self.span();
                    self.consume_char();
                    return Ok(Token::new(TokenKind::Newline, span));
                }
                Some('/') if self.peek_next_char() == Some('/') => {
                    self.consume_while(|c| c != '\n');
                }
                Some(c) if c.is_whitespace() => {
                    self.consume_char();
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    return Ok(self.read_identifier_or_keyword());
                }
                Some(c) if c.is_ascii_digit() => {
                    return Ok(self.read_number());
                }
                Some('"') => return Ok(self.read_string()),
                Some(_) => return self.read_symbol(),
            }
        }
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let span = self.span();
        let start = self.pos;
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let lexeme = &self.input[start..self.pos];

        let kind = match lexeme {
            "function" => TokenKind::Function,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "and" => TokenKind::And,
            "not" => TokenKind::Not,
            "end" => TokenKind::End,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "return" => TokenKind::Return,
            "while" => TokenKind::While,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "or" => TokenKind::Or,
            "nil" => TokenKind::Nil,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Identifier(lexeme.to_string()),
        };
        Token::new(kind, span)
    }

    fn read_number(&mut self) -> Token {
        let span = self.span();
        let start = self.pos;
        self.consume_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') {
            self.consume_char();
            self.consume_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            self.consume_char();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.consume_char();
            }
            self.consume_while(|c| c.is_ascii_digit());
        }
        Token::new(
            TokenKind::Number(self.input[start..self.pos].to_string()),
            span,
        )
    }

    /// Reads a string literal, decoding escapes. A string that runs to
    /// end of input without a closing quote is accepted here; the parser
    /// rejects whatever token soup follows.
    fn read_string(&mut self) -> Token {
        let span = self.span();
        self.consume_char(); // opening quote
        let mut value = String::new();
        while let Some(c) = self.peek_char() {
            if c == '"' {
                break;
            }
            self.consume_char();
            if c != '\\' {
                value.push(c);
                continue;
            }
            match self.consume_char() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('"') => value.push('"'),
                Some('\\') => value.push('\\'),
                Some(other) => value.push(other),
                None => break,
            }
        }
        if self.peek_char() == Some('"') {
            self.consume_char();
        }
        Token::new(TokenKind::Str(value), span)
    }

    fn read_symbol(&mut self) -> LexResult<Token> {
        let span = self.span();
        let c = match self.consume_char() {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::Eof, span)),
        };

        let followed_by_equal = self.peek_char() == Some('=');
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => {
                // Trailing horizontal whitespace after a comma is eaten
                // eagerly; newlines stay significant.
                self.consume_while(|c| c.is_whitespace() && c != '\n');
                TokenKind::Comma
            }
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '=' if followed_by_equal => {
                self.consume_char();
                TokenKind::Eq
            }
            '=' => TokenKind::Assign,
            '+' if followed_by_equal => {
                self.consume_char();
                TokenKind::PlusAssign
            }
            '+' => TokenKind::Plus,
            '-' if followed_by_equal => {
                self.consume_char();
                TokenKind::MinusAssign
            }
            '-' => TokenKind::Minus,
            '*' if followed_by_equal => {
                self.consume_char();
                TokenKind::StarAssign
            }
            '*' => TokenKind::Star,
            '/' if followed_by_equal => {
                self.consume_char();
                TokenKind::SlashAssign
            }
            '/' => TokenKind::Slash,
            '%' if followed_by_equal => {
                self.consume_char();
                TokenKind::PercentAssign
            }
            '%' => TokenKind::Percent,
            '^' if followed_by_equal => {
                self.consume_char();
                TokenKind::CaretAssign
            }
            '^' => TokenKind::Caret,
            '<' if followed_by_equal => {
                self.consume_char();
                TokenKind::LessEq
            }
            '<' => TokenKind::Less,
            '>' if followed_by_equal => {
                self.consume_char();
                TokenKind::GreaterEq
            }
            '>' => TokenKind::Greater,
            '!' if followed_by_equal => {
                self.consume_char();
                TokenKind::NotEq
            }
            '!' => {
                return Err(LexError::BangWithoutEqual {
                    line: span.line,
                    column: span.column,
                });
            }
            other => {
                return Err(LexError::UnexpectedCharacter {
                    character: other,
                    line: span.line,
                    column: span.column,
                });
            }
        };
        Ok(Token::new(kind, span))
    }

    fn consume_while<P>(&mut self, keep: P)
    where
        P: Fn(char) -> bool,
    {
        while let Some(c) = self.peek_char() {
            if !keep(c) {
                break;
            }
            self.consume_char();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
        }
    }
}

pub fn tokenize(input: &str) -> LexResult<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}
