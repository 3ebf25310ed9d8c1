/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Expression parser.

use crate::ast::{BinOp, Builtin, Expr, ExprKind};
use crate::lexer::TokenKind;

use super::{PResult, Parser};

const TERM_START: &[TokenKind] = &[
    TokenKind::Number,
    TokenKind::Minus,
    TokenKind::Ident,
    TokenKind::LBracket,
    TokenKind::Converge,
];

impl<'t> Parser<'t> {
    /// `term (("+"|"-"|"*") term)*`, folded strictly left to right.
    pub(super) fn expression(&mut self) -> PResult<Expr> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                TokenKind::Star => BinOp::Mul,
                _ => break,
            };
            self.bump()?;
            // `a-b*c` becomes `(a-b)*c`.
            let right = self.term()?;
            let span = left.span.merge(&right.span);
            left = Expr {
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            };
        }
        Ok(left)
    }

    /// Parses expression atoms.
    fn term(&mut self) -> PResult<Expr> {
        match self.peek_kind() {
            TokenKind::Number | TokenKind::Minus => {
                let start = self.current().map(|t| t.span.clone());
                let (value, end) = self.signed_number()?;
                let span = match start {
                    Some(start) => start.merge(&end),
                    None => end,
                };
                Ok(Expr {
                    kind: ExprKind::Number(value),
                    span,
                })
            }
            TokenKind::Ident => {
                let token = self.bump()?;
                Ok(Expr {
                    kind: ExprKind::Ident(token.lexeme.clone()),
                    span: token.span.clone(),
                })
            }
            TokenKind::LBracket => self.list_literal(),
            TokenKind::Converge => {
                let start = self.bump()?.span.clone();
                self.expect(TokenKind::LParen, &[])?;
                let target = self.expect(TokenKind::Ident, &[])?.lexeme.clone();
                let end = self.expect(TokenKind::RParen, &[])?;
                Ok(Expr {
                    kind: ExprKind::Call {
                        function: Builtin::Converge,
                        target,
                    },
                    span: start.merge(&end.span),
                })
            }
            _ => Err(self.unexpected(TERM_START)),
        }
    }

    /// `"[" (signed_number ("," signed_number)*)? "]"`
    fn list_literal(&mut self) -> PResult<Expr> {
        let start = self.bump()?.span.clone();
        let mut values = Vec::new();

        if self.peek_kind() != TokenKind::RBracket {
            loop {
                let (value, _) = self.signed_number()?;
                values.push(value);
                if self.peek_kind() == TokenKind::Comma {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }

        let end = self.expect(TokenKind::RBracket, &[TokenKind::Comma])?;
        Ok(Expr {
            kind: ExprKind::List(values),
            span: start.merge(&end.span),
        })
    }

    /// `["-"] NUMBER`, returning the folded value and the number's span.
    fn signed_number(&mut self) -> PResult<(f64, crate::ast::SourceSpan)> {
        let negative = if self.peek_kind() == TokenKind::Minus {
            self.bump()?;
            true
        } else {
            false
        };
        if self.peek_kind() != TokenKind::Number {
            let expected: &[TokenKind] = if negative {
                &[TokenKind::Number]
            } else {
                &[TokenKind::Number, TokenKind::Minus]
            };
            return Err(self.unexpected(expected));
        }
        let token = self.bump()?;
        let value = token.value.unwrap_or(0.0);
        Ok((if negative { -value } else { value }, token.span.clone()))
    }
}
