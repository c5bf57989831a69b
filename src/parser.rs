//! Recursive-descent parser for ITMOScript.
//!
//! Expression precedence, lowest to highest: assignment (right
//! associative), `or`, `and`, equality, comparison, additive,
//! multiplicative, unary, then a primary followed by a postfix chain of
//! calls, indexes and slices. Newlines and semicolons separate
//! statements but are never required; the first error aborts the parse.

use thiserror::Error;

use crate::token::{Span, Token, TokenKind};

pub mod ast;

use ast::{BinaryOperator, Expression, Program, Statement, UnaryOperator};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expected {expected}, got {found} at line {line}, column {column}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },
    #[error("Invalid target for assignment at line {line}, column {column}: expected an identifier")]
    InvalidAssignmentTarget { line: usize, column: usize },
    #[error("Invalid number literal '{literal}' at line {line}, column {column}")]
    InvalidNumberLiteral {
        literal: String,
        line: usize,
        column: usize,
    },
    #[error(
        "Empty brackets at line {line}, column {column}: a list literal is '[]', indexing is 'expr[index]'"
    )]
    EmptyIndex { line: usize, column: usize },
}

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(Token::kind), Some(TokenKind::Eof)) {
            tokens.push(Token::new(TokenKind::Eof, Span::default()));
        }
        Self { tokens, pos: 0 }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if self.is_at_end() {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.peek_kind() {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => {
                self.advance();
                let value = if matches!(
                    self.peek_kind(),
                    TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof | TokenKind::End
                ) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                Ok(Statement::Return(value))
            }
            TokenKind::Break => {
                self.advance();
                Ok(Statement::Break)
            }
            TokenKind::Continue => {
                self.advance();
                Ok(Statement::Continue)
            }
            _ => {
                let expr = self.parse_expression()?;
                if matches!(self.peek_kind(), TokenKind::Semicolon) {
                    self.advance();
                }
                Ok(Statement::Expr(expr))
            }
        }
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.advance(); // 'if'
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Then, "'then' after if condition")?;
        let then_block = self.parse_block()?;

        let mut else_ifs = Vec::new();
        let mut else_block = None;
        while matches!(self.peek_kind(), TokenKind::Else) {
            self.advance();
            if matches!(self.peek_kind(), TokenKind::If) {
                self.advance();
                let condition = self.parse_expression()?;
                self.expect(TokenKind::Then, "'then' after else if condition")?;
                else_ifs.push((condition, self.parse_block()?));
            } else {
                else_block = Some(self.parse_block()?);
                break;
            }
        }

        self.expect(TokenKind::End, "'end' after if statement")?;
        self.expect(TokenKind::If, "'if' after 'end'")?;
        Ok(Statement::If {
            condition,
            then_block,
            else_ifs,
            else_block,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        self.advance(); // 'while'
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        self.expect(TokenKind::End, "'end' after while body")?;
        self.expect(TokenKind::While, "'while' after 'end'")?;
        Ok(Statement::While { condition, body })
    }

    fn parse_for(&mut self) -> ParseResult<Statement> {
        self.advance(); // 'for'
        let variable = self.expect_identifier("identifier after 'for'")?;
        self.expect(TokenKind::In, "'in' after for variable")?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        self.expect(TokenKind::End, "'end' after for body")?;
        self.expect(TokenKind::For, "'for' after 'end'")?;
        Ok(Statement::For {
            variable,
            iterable,
            body,
        })
    }

    /// Parses statements up to (not including) a block terminator:
    /// `end`, `else` or end of file.
    fn parse_block(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if self.is_at_end() || matches!(self.peek_kind(), TokenKind::End | TokenKind::Else) {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Expression> {
        let expr = self.parse_or()?;

        let op = match self.peek_kind() {
            TokenKind::Assign => None,
            TokenKind::PlusAssign => Some(BinaryOperator::Add),
            TokenKind::MinusAssign => Some(BinaryOperator::Sub),
            TokenKind::StarAssign => Some(BinaryOperator::Mul),
            TokenKind::SlashAssign => Some(BinaryOperator::Div),
            TokenKind::PercentAssign => Some(BinaryOperator::Mod),
            TokenKind::CaretAssign => Some(BinaryOperator::Pow),
            _ => return Ok(expr),
        };
        let span = self.peek().span();
        let Expression::Identifier(name) = expr else {
            return Err(ParseError::InvalidAssignmentTarget {
                line: span.line,
                column: span.column,
            });
        };
        self.advance();
        let value = self.parse_assignment()?;
        Ok(Expression::Assign {
            name,
            op,
            value: Box::new(value),
        })
    }

    fn parse_or(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_and()?;
        while matches!(self.peek_kind(), TokenKind::Or) {
            self.advance();
            let right = self.parse_and()?;
            expr = binary(BinaryOperator::Or, expr, right);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_equality()?;
        while matches!(self.peek_kind(), TokenKind::And) {
            self.advance();
            let right = self.parse_equality()?;
            expr = binary(BinaryOperator::And, expr, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Eq => BinaryOperator::Eq,
                TokenKind::NotEq => BinaryOperator::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Less => BinaryOperator::Less,
                TokenKind::LessEq => BinaryOperator::LessEq,
                TokenKind::Greater => BinaryOperator::Greater,
                TokenKind::GreaterEq => BinaryOperator::GreaterEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOperator::Mul,
                TokenKind::Slash => BinaryOperator::Div,
                TokenKind::Percent => BinaryOperator::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let op = match self.peek_kind() {
            TokenKind::Not => UnaryOperator::Not,
            TokenKind::Minus => UnaryOperator::Neg,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !matches!(self.peek_kind(), TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expression()?);
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "')' after function arguments")?;
                    expr = Expression::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                TokenKind::LBracket => {
                    let span = self.peek().span();
                    self.advance();
                    expr = self.parse_index_or_slice(expr, span)?;
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Parses the bracket suffix after `expr[`. A colon anywhere before
    /// the closing bracket makes it a slice; otherwise it is a plain
    /// index, and bare `[]` in postfix position is rejected.
    fn parse_index_or_slice(
        &mut self,
        target: Expression,
        open: Span,
    ) -> ParseResult<Expression> {
        let mut start = None;
        if !matches!(self.peek_kind(), TokenKind::Colon | TokenKind::RBracket) {
            start = Some(self.parse_expression()?);
        }

        if self.eat(TokenKind::Colon) {
            let mut end = None;
            let mut step = None;
            if !matches!(self.peek_kind(), TokenKind::RBracket | TokenKind::Colon) {
                end = Some(self.parse_expression()?);
            }
            if self.eat(TokenKind::Colon) && !matches!(self.peek_kind(), TokenKind::RBracket) {
                step = Some(self.parse_expression()?);
            }
            self.expect(TokenKind::RBracket, "']' after slice expression")?;
            return Ok(Expression::Slice {
                target: Box::new(target),
                start: start.map(Box::new),
                end: end.map(Box::new),
                step: step.map(Box::new),
            });
        }

        self.expect(TokenKind::RBracket, "']' after index expression")?;
        let Some(index) = start else {
            return Err(ParseError::EmptyIndex {
                line: open.line,
                column: open.column,
            });
        };
        Ok(Expression::Index {
            target: Box::new(target),
            index: Box::new(index),
        })
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.peek_kind() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(Expression::Identifier(name))
            }
            TokenKind::Number(lexeme) => {
                let lexeme = lexeme.clone();
                let span = self.peek().span();
                self.advance();
                let value = lexeme.parse::<f64>().map_err(|_| {
                    ParseError::InvalidNumberLiteral {
                        literal: lexeme.clone(),
                        line: span.line,
                        column: span.column,
                    }
                })?;
                Ok(Expression::Number(value))
            }
            TokenKind::Str(value) => {
                let value = value.clone();
                self.advance();
                Ok(Expression::Str(value))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::Number(1.0))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::Number(0.0))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expression::Nil)
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')' after expression in parentheses")?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !matches!(self.peek_kind(), TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expression()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket, "']' after list elements")?;
                Ok(Expression::List(elements))
            }
            TokenKind::Function => self.parse_function_def(),
            _ => Err(self.error("expression")),
        }
    }

    fn parse_function_def(&mut self) -> ParseResult<Expression> {
        self.advance(); // 'function'
        self.expect(TokenKind::LParen, "'(' after 'function'")?;
        let mut params = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier("parameter name")?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')' after function parameters")?;
        let body = self.parse_block()?;
        self.expect(TokenKind::End, "'end' after function body")?;
        self.expect(TokenKind::Function, "'function' after 'end'")?;
        Ok(Expression::FunctionDef { params, body })
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if *self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> ParseResult<String> {
        if let TokenKind::Identifier(name) = self.peek_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error(expected))
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if *self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> &TokenKind {
        self.peek().kind()
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind().to_string(),
            line: token.span().line,
            column: token.span().column,
        }
    }
}

fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult<Program> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse(source: &str) -> Program {
        let tokens = tokenize(source).expect("tokenize failed");
        parse_tokens(tokens).expect("parse failed")
    }

    fn parse_err(source: &str) -> ParseError {
        let tokens = tokenize(source).expect("tokenize failed");
        parse_tokens(tokens).expect_err("expected parse failure")
    }

    fn identifier(name: &str) -> Expression {
        Expression::Identifier(name.to_string())
    }

    fn number(value: f64) -> Expression {
        Expression::Number(value)
    }

    fn assign(name: &str, value: Expression) -> Statement {
        Statement::Expr(Expression::Assign {
            name: name.to_string(),
            op: None,
            value: Box::new(value),
        })
    }

    #[test]
    fn parses_assignment_and_call() {
        let program = parse("x = 1\nprint(x)\n");
        let expected = Program {
            statements: vec![
                assign("x", number(1.0)),
                Statement::Expr(Expression::Call {
                    callee: Box::new(identifier("print")),
                    args: vec![identifier("x")],
                }),
            ],
        };
        assert_eq!(program, expected);
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse("x = 1 + 2 * 3");
        let expected = assign(
            "x",
            binary(
                BinaryOperator::Add,
                number(1.0),
                binary(BinaryOperator::Mul, number(2.0), number(3.0)),
            ),
        );
        assert_eq!(program.statements, vec![expected]);
    }

    #[test]
    fn comparison_binds_tighter_than_logic() {
        let program = parse("x = a < b and c > d or not e");
        let expected = assign(
            "x",
            binary(
                BinaryOperator::Or,
                binary(
                    BinaryOperator::And,
                    binary(BinaryOperator::Less, identifier("a"), identifier("b")),
                    binary(BinaryOperator::Greater, identifier("c"), identifier("d")),
                ),
                Expression::Unary {
                    op: UnaryOperator::Not,
                    operand: Box::new(identifier("e")),
                },
            ),
        );
        assert_eq!(program.statements, vec![expected]);
    }

    #[test]
    fn assignment_is_right_associative() {
        let program = parse("a = b = 1");
        let expected = assign(
            "a",
            Expression::Assign {
                name: "b".to_string(),
                op: None,
                value: Box::new(number(1.0)),
            },
        );
        assert_eq!(program.statements, vec![expected]);
    }

    #[test]
    fn compound_assignment_records_operator() {
        let program = parse("a ^= 2");
        let expected = Statement::Expr(Expression::Assign {
            name: "a".to_string(),
            op: Some(BinaryOperator::Pow),
            value: Box::new(number(2.0)),
        });
        assert_eq!(program.statements, vec![expected]);
    }

    #[test]
    fn caret_is_not_a_binary_operator() {
        let err = parse_err("x = 2 ^ 3");
        assert!(err.to_string().contains("'^'"), "got: {err}");
    }

    #[test]
    fn true_false_lower_to_numbers() {
        let program = parse("x = true\ny = false\nz = nil");
        assert_eq!(
            program.statements,
            vec![
                assign("x", number(1.0)),
                assign("y", number(0.0)),
                assign("z", Expression::Nil),
            ]
        );
    }

    #[test]
    fn parses_if_else_if_else_chain() {
        let program = parse(indoc! {"
            if a then
                x = 1
            else if b then
                x = 2
            else
                x = 3
            end if
        "});
        let expected = Statement::If {
            condition: identifier("a"),
            then_block: vec![assign("x", number(1.0))],
            else_ifs: vec![(identifier("b"), vec![assign("x", number(2.0))])],
            else_block: Some(vec![assign("x", number(3.0))]),
        };
        assert_eq!(program.statements, vec![expected]);
    }

    #[test]
    fn parses_while_and_for_loops() {
        let program = parse(indoc! {"
            while i < 3
                i += 1
            end while
            for x in items
                break
                continue
            end for
        "});
        let expected = vec![
            Statement::While {
                condition: binary(BinaryOperator::Less, identifier("i"), number(3.0)),
                body: vec![Statement::Expr(Expression::Assign {
                    name: "i".to_string(),
                    op: Some(BinaryOperator::Add),
                    value: Box::new(number(1.0)),
                })],
            },
            Statement::For {
                variable: "x".to_string(),
                iterable: identifier("items"),
                body: vec![Statement::Break, Statement::Continue],
            },
        ];
        assert_eq!(program.statements, expected);
    }

    #[test]
    fn parses_function_definition_with_return() {
        let program = parse("f = function(a, b) return a end function");
        let expected = assign(
            "f",
            Expression::FunctionDef {
                params: vec!["a".to_string(), "b".to_string()],
                body: vec![Statement::Return(Some(identifier("a")))],
            },
        );
        assert_eq!(program.statements, vec![expected]);
    }

    #[test]
    fn return_without_value_before_end() {
        let program = parse("f = function() return end function");
        let expected = assign(
            "f",
            Expression::FunctionDef {
                params: vec![],
                body: vec![Statement::Return(None)],
            },
        );
        assert_eq!(program.statements, vec![expected]);
    }

    #[test]
    fn semicolons_separate_statements() {
        let program = parse("a = 1; b = 2;; c = 3");
        assert_eq!(program.statements.len(), 3);
    }

    #[test]
    fn parses_postfix_call_and_index_chain() {
        let program = parse("x = f(1)[2](3)");
        let expected = assign(
            "x",
            Expression::Call {
                callee: Box::new(Expression::Index {
                    target: Box::new(Expression::Call {
                        callee: Box::new(identifier("f")),
                        args: vec![number(1.0)],
                    }),
                    index: Box::new(number(2.0)),
                }),
                args: vec![number(3.0)],
            },
        );
        assert_eq!(program.statements, vec![expected]);
    }

    #[test]
    fn parses_all_slice_forms() {
        let slice = |start: Option<f64>, end: Option<f64>, step: Option<f64>| {
            Statement::Expr(Expression::Slice {
                target: Box::new(identifier("l")),
                start: start.map(|v| Box::new(number(v))),
                end: end.map(|v| Box::new(number(v))),
                step: step.map(|v| Box::new(number(v))),
            })
        };
        let program = parse("l[:]; l[1:]; l[:2]; l[1:2]; l[1:2:3]; l[::3]; l[1::3]; l[:2:3]");
        let expected = vec![
            slice(None, None, None),
            slice(Some(1.0), None, None),
            slice(None, Some(2.0), None),
            slice(Some(1.0), Some(2.0), None),
            slice(Some(1.0), Some(2.0), Some(3.0)),
            slice(None, None, Some(3.0)),
            slice(Some(1.0), None, Some(3.0)),
            slice(None, Some(2.0), Some(3.0)),
        ];
        assert_eq!(program.statements, expected);
    }

    #[test]
    fn rejects_empty_index_in_postfix_position() {
        let err = parse_err("x = l[]");
        assert_eq!(err, ParseError::EmptyIndex { line: 1, column: 6 });
    }

    #[test]
    fn rejects_invalid_assignment_target() {
        let err = parse_err("1 = 2");
        assert_eq!(
            err,
            ParseError::InvalidAssignmentTarget { line: 1, column: 3 }
        );
    }

    #[test]
    fn rejects_trailing_comma_in_list_literal() {
        let err = parse_err("x = [1, 2,]");
        assert!(err.to_string().contains("Expected expression"), "got: {err}");
    }

    #[test]
    fn rejects_if_without_then() {
        let err = parse_err("if x\ny = 1\nend if");
        assert!(
            err.to_string().contains("Expected 'then' after if condition"),
            "got: {err}"
        );
    }

    #[test]
    fn rejects_unclosed_while() {
        let err = parse_err("while x\ny = 1\nend");
        assert!(
            err.to_string().contains("Expected 'while' after 'end'"),
            "got: {err}"
        );
    }

    #[test]
    fn rejects_single_keyword_block_terminator() {
        let err = parse_err("f = function() return 1 end");
        assert!(
            err.to_string().contains("Expected 'function' after 'end'"),
            "got: {err}"
        );
    }

    #[test]
    fn rejects_keyword_in_expression_position() {
        let err = parse_err("x = then");
        assert!(err.to_string().contains("Expected expression"), "got: {err}");
    }
}
