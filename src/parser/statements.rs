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

//! Statement parsers.

use crate::ast::{SourceSpan, Stmt, StmtKind};
use crate::lexer::TokenKind;

use super::{PResult, Parser};

const STATEMENT_START: &[TokenKind] = &[TokenKind::Timeline, TokenKind::Converge, TokenKind::Ident];
const EXPRESSION_FOLLOW: &[TokenKind] = &[TokenKind::Plus, TokenKind::Minus, TokenKind::Star];

impl<'t> Parser<'t> {
    /// Parses one statement including its trailing semicolon.
    pub(super) fn statement(&mut self) -> PResult<Stmt> {
        match self.peek_kind() {
            TokenKind::Timeline => self.timeline_decl(),
            TokenKind::Converge => self.converge_stmt(),
            TokenKind::Ident => self.ident_stmt(),
            _ => Err(self.unexpected(STATEMENT_START)),
        }
    }

    /// `timeline ID = expression ;`
    fn timeline_decl(&mut self) -> PResult<Stmt> {
        let start = self.bump()?.span.clone();
        let name = self.expect(TokenKind::Ident, &[])?.lexeme.clone();
        self.expect(TokenKind::Assign, &[])?;
        let init = self.expression()?;
        let end = self.expect(TokenKind::Semicolon, EXPRESSION_FOLLOW)?;
        Ok(Stmt {
            kind: StmtKind::TimelineDecl { name, init },
            span: start.merge(&end.span),
        })
    }

    /// `converge ( ID ) ;`
    fn converge_stmt(&mut self) -> PResult<Stmt> {
        let start = self.bump()?.span.clone();
        self.expect(TokenKind::LParen, &[])?;
        let name = self.expect(TokenKind::Ident, &[])?.lexeme.clone();
        self.expect(TokenKind::RParen, &[])?;
        let end = self.expect(TokenKind::Semicolon, &[])?;
        Ok(Stmt {
            kind: StmtKind::Converge { name },
            span: start.merge(&end.span),
        })
    }

    /// `ID <~ expression ;` or `ID = expression ;`, split on the second token.
    fn ident_stmt(&mut self) -> PResult<Stmt> {
        let head = self.bump()?;
        let name = head.lexeme.clone();
        let start: SourceSpan = head.span.clone();

        // One stray token between the name and the operator is tolerated.
        let op_offset = match (self.peek_kind(), self.peek_kind_at(1)) {
            (TokenKind::Assign | TokenKind::Retro, _) => 0,
            (TokenKind::Eof, _) => return Err(self.unexpected(&[TokenKind::Assign, TokenKind::Retro])),
            (_, TokenKind::Assign | TokenKind::Retro) => 1,
            _ => return Err(self.unexpected(&[TokenKind::Assign, TokenKind::Retro])),
        };
        let op = self.peek_kind_at(op_offset);
        let alternative = if op == TokenKind::Assign {
            TokenKind::Retro
        } else {
            TokenKind::Assign
        };
        self.expect(op, &[alternative])?;

        let value = self.expression()?;
        let end = self.expect(TokenKind::Semicolon, EXPRESSION_FOLLOW)?;
        let kind = if op == TokenKind::Retro {
            StmtKind::Constraint {
                name,
                target: value,
            }
        } else {
            StmtKind::Assign { name, value }
        };
        Ok(Stmt {
            kind,
            span: start.merge(&end.span),
        })
    }
}
