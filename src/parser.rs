//! Recursive-descent parser with precedence climbing for expressions.

use crate::ast::{BinOp, Expr, Program, Stmt, UnaryOp};
use crate::error::ParseError;
use crate::token::{Position, Token, TokenKind};

/// Lexes and parses `source` in one call.
pub fn parse_source(source: &str) -> Result<Program, crate::error::WitcherError> {
    let tokens = crate::lexer::tokenize(source)?;
    Ok(parse(tokens)?)
}

/// Parses a pre-lexed token stream into the top-level statement list.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    Parser::new(tokens).parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn position(&self) -> Position {
        self.peek().position
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> ParseError {
        if matches!(self.peek_kind(), TokenKind::EndOfInput) {
            ParseError::UnexpectedEndOfInput {
                position: self.position(),
            }
        } else {
            ParseError::UnexpectedToken {
                found: format!("{:?}", self.peek_kind()),
                position: self.position(),
            }
        }
    }

    /// Consumes any run of newline tokens; they are statement separators
    /// and otherwise ignorable whitespace between statements.
    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Newline | TokenKind::EndOfInput)
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.check(&TokenKind::EndOfInput) && !self.check(&TokenKind::RBrace) {
            stmts.push(self.parse_statement()?);
            self.skip_newlines();
        }
        Ok(stmts)
    }

    fn parse_block(&mut self) -> Result<Program, ParseError> {
        self.eat(TokenKind::LBrace)?;
        let body = self.parse_program()?;
        self.eat(TokenKind::RBrace)?;
        Ok(body)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Contract | TokenKind::Mutation => self.parse_var_decl(),
            TokenKind::Igni => self.parse_if(),
            TokenKind::Quen => self.parse_while(),
            TokenKind::Yrden => self.parse_for(),
            TokenKind::Aard => self.parse_func_def(),
            TokenKind::Hunt => self.parse_return(),
            TokenKind::Medallion => self.parse_print(),
            TokenKind::Grimoire => self.parse_import(),
            _ => Ok(Stmt::Expr(self.parse_expression()?)),
        }
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, ParseError> {
        let is_constant = matches!(self.peek_kind(), TokenKind::Mutation);
        self.advance();
        let name = self.parse_identifier_name()?;
        self.eat(TokenKind::Assign)?;
        let initializer = self.parse_expression()?;
        Ok(Stmt::VarDecl {
            name,
            initializer,
            is_constant,
        })
    }

    fn parse_identifier_name(&mut self) -> Result<String, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // igni
        let condition = self.parse_expression()?;
        let then_body = self.parse_block()?;
        self.skip_newlines_peek_else();
        let else_body = if self.check(&TokenKind::Elixir) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_body,
            else_body,
        })
    }

    /// `elixir` may follow the closing `}` on the same or a new line;
    /// tolerate either without treating a bare newline as ending the
    /// statement.
    fn skip_newlines_peek_else(&mut self) {
        let save = self.pos;
        self.skip_newlines();
        if !self.check(&TokenKind::Elixir) {
            self.pos = save;
        }
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // quen
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // yrden
        let loop_var = self.parse_identifier_name()?;
        self.eat(TokenKind::Arrow)?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Stmt::For {
            loop_var,
            iterable,
            body,
        })
    }

    fn parse_func_def(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // aard
        let name = self.parse_identifier_name()?;
        self.eat(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.parse_identifier_name()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.eat(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::FuncDef { name, params, body })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let position = self.position();
        self.advance(); // hunt
        let value = if self.at_statement_end() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Ok(Stmt::Return { value, position })
    }

    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        let position = self.position();
        self.advance(); // medallion
        self.eat(TokenKind::LParen)?;
        let args = self.parse_args()?;
        self.eat(TokenKind::RParen)?;
        Ok(Stmt::Expr(Expr::Call {
            name: "medallion".to_string(),
            args,
            position,
        }))
    }

    fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        let position = self.position();
        self.advance(); // grimoire
        match self.peek_kind().clone() {
            TokenKind::Text(path) => {
                self.advance();
                Ok(Stmt::Import { path, position })
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        Ok(args)
    }

    // ---- expressions, precedence low to high ----

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::Or) {
            let position = self.position();
            self.advance();
            let right = self.parse_and()?;
            left = Expr::BinOp {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::And) {
            let position = self.position();
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::BinOp {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqualEqual => BinOp::Eq,
                TokenKind::NotEqual => BinOp::NotEq,
                _ => break,
            };
            let position = self.position();
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Less => BinOp::Lt,
                TokenKind::LessEqual => BinOp::LtEq,
                TokenKind::Greater => BinOp::Gt,
                TokenKind::GreaterEqual => BinOp::GtEq,
                _ => break,
            };
            let position = self.position();
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let position = self.position();
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let position = self.position();
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let position = self.position();
        match self.peek_kind() {
            TokenKind::Not => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::UnaryOp {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                    position,
                })
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::UnaryOp {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                    position,
                })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let position = self.position();
        let is_ident = matches!(self.peek_kind(), TokenKind::Identifier(_));
        let ident_name = if is_ident {
            if let TokenKind::Identifier(name) = self.peek_kind().clone() {
                Some(name)
            } else {
                None
            }
        } else {
            None
        };

        let mut expr = self.parse_primary()?;

        // Call is admitted only immediately after an Identifier primary.
        if let (Some(name), true) = (ident_name.as_ref(), self.check(&TokenKind::LParen)) {
            self.advance();
            let args = self.parse_args()?;
            self.eat(TokenKind::RParen)?;
            expr = Expr::Call {
                name: name.clone(),
                args,
                position,
            };
        }

        loop {
            if self.check(&TokenKind::LBracket) {
                let index_pos = self.position();
                self.advance();
                let index = self.parse_expression()?;
                self.eat(TokenKind::RBracket)?;
                expr = Expr::IndexAccess {
                    target: Box::new(expr),
                    index: Box::new(index),
                    position: index_pos,
                };
                continue;
            }

            if self.check(&TokenKind::Assign) {
                let assign_pos = self.position();
                match expr {
                    Expr::Ident(name) => {
                        self.advance();
                        let value = self.parse_expression()?;
                        expr = Expr::Assign {
                            name,
                            value: Box::new(value),
                            position: assign_pos,
                        };
                        continue;
                    }
                    Expr::IndexAccess { target, index, .. } => {
                        self.advance();
                        let value = self.parse_expression()?;
                        expr = Expr::IndexAssign {
                            target,
                            index,
                            value: Box::new(value),
                            position: assign_pos,
                        };
                        continue;
                    }
                    other => {
                        // Not an assignable LHS: stop the postfix chain and
                        // leave '=' for the caller (it will error).
                        expr = other;
                        break;
                    }
                }
            }

            break;
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::NumberLit(n))
            }
            TokenKind::Text(s) => {
                self.advance();
                Ok(Expr::TextLit(s))
            }
            TokenKind::Truth => {
                self.advance();
                Ok(Expr::BoolLit(true))
            }
            TokenKind::Falsehood => {
                self.advance();
                Ok(Expr::BoolLit(false))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Ident(name))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.eat(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let elements = self.parse_args()?;
                self.eat(TokenKind::RBracket)?;
                Ok(Expr::ArrayLit(elements))
            }
            _ => Err(self.unexpected()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmts(src: &str) -> Program {
        parse_source(src).unwrap()
    }

    #[test]
    fn parses_var_decl_with_constant_flag() {
        let p = stmts("contract x = 1\nmutation y = 2");
        assert_eq!(
            p,
            vec![
                Stmt::VarDecl {
                    name: "x".into(),
                    initializer: Expr::NumberLit(1.0),
                    is_constant: false,
                },
                Stmt::VarDecl {
                    name: "y".into(),
                    initializer: Expr::NumberLit(2.0),
                    is_constant: true,
                },
            ]
        );
    }

    #[test]
    fn operator_precedence_climbs_correctly() {
        let p = stmts("1 + 2 * 3");
        match &p[0] {
            Stmt::Expr(Expr::BinOp { op: BinOp::Add, right, .. }) => {
                assert!(matches!(**right, Expr::BinOp { op: BinOp::Mul, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn if_else_block() {
        let p = stmts("igni truth { medallion(1) } elixir { medallion(2) }");
        assert!(matches!(
            p[0],
            Stmt::If {
                else_body: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn bare_return_requires_newline_or_eof() {
        let p = stmts("aard f() {\n hunt\n}");
        if let Stmt::FuncDef { body, .. } = &p[0] {
            assert!(matches!(body[0], Stmt::Return { value: None, .. }));
        } else {
            panic!();
        }
    }

    #[test]
    fn index_assignment_parses() {
        let p = stmts("xs[0] = 1");
        assert!(matches!(p[0], Stmt::Expr(Expr::IndexAssign { .. })));
    }

    #[test]
    fn call_only_admitted_after_identifier() {
        // (1)(2) is not a call; "(2)" parses as a separate statement.
        let p = stmts("(1)\n(2)");
        assert_eq!(p.len(), 2);
    }
}
