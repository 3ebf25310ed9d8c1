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

//! Lexical recognizers and trivia skipping.

use crate::ast::Span;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace1, not_line_ending},
    combinator::{map, opt, recognize, value},
    error::VerboseError,
    multi::many0,
    sequence::pair,
    IResult,
};

use super::TokenKind;

pub(super) type LResult<'a, O> = IResult<Span<'a>, O, VerboseError<Span<'a>>>;

/// Skips zero-or-more whitespace/comments.
pub(super) fn trivia(input: Span<'_>) -> LResult<'_, ()> {
    value((), many0(alt((value((), multispace1), comment))))(input)
}

/// Parses line comments (`// ...` and `# ...`).
fn comment(input: Span<'_>) -> LResult<'_, ()> {
    value(
        (),
        alt((
            pair(tag("//"), opt(not_line_ending)),
            pair(tag("#"), opt(not_line_ending)),
        )),
    )(input)
}

/// Recognizes one token and reports its provisional kind.
///
/// Words come back as [`TokenKind::Ident`]; keyword classification happens in
/// the caller on the recognized lexeme.
pub(super) fn token(input: Span<'_>) -> LResult<'_, TokenKind> {
    alt((
        symbol,
        map(number, |_| TokenKind::Number),
        map(word, |_| TokenKind::Ident),
    ))(input)
}

/// Parses operators and punctuation. `<~` must be tried before anything else
/// starting with `<`.
fn symbol(input: Span<'_>) -> LResult<'_, TokenKind> {
    alt((
        value(TokenKind::Retro, tag("<~")),
        value(TokenKind::Assign, char('=')),
        value(TokenKind::Plus, char('+')),
        value(TokenKind::Minus, char('-')),
        value(TokenKind::Star, char('*')),
        value(TokenKind::LParen, char('(')),
        value(TokenKind::RParen, char(')')),
        value(TokenKind::LBracket, char('[')),
        value(TokenKind::RBracket, char(']')),
        value(TokenKind::Comma, char(',')),
        value(TokenKind::Semicolon, char(';')),
    ))(input)
}

/// Parses unsigned numbers (`12`, `12.`, `12.5`).
fn number(input: Span<'_>) -> LResult<'_, Span<'_>> {
    recognize(pair(digit1, opt(pair(char('.'), digit0))))(input)
}

/// Parses words (`[A-Za-z_][A-Za-z0-9_]*`).
fn word(input: Span<'_>) -> LResult<'_, Span<'_>> {
    recognize(pair(
        take_while1(is_ident_start),
        take_while(is_ident_continue),
    ))(input)
}

/// Returns whether a char can start an identifier.
fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

/// Returns whether a char can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivia_skips_both_comment_styles() {
        let input = Span::new("  // one\n# two\n\t x");
        let (rest, ()) = trivia(input).expect("trivia never fails");
        assert_eq!(*rest.fragment(), "x");
        assert_eq!(rest.location_line(), 3);
    }

    #[test]
    fn retro_operator_wins_over_single_chars() {
        let (rest, kind) = token(Span::new("<~ 3")).expect("token");
        assert_eq!(kind, TokenKind::Retro);
        assert_eq!(*rest.fragment(), " 3");
    }

    #[test]
    fn number_accepts_trailing_dot() {
        let (rest, lexeme) = number(Span::new("12.;")).expect("number");
        assert_eq!(*lexeme.fragment(), "12.");
        assert_eq!(*rest.fragment(), ";");
    }

    #[test]
    fn lone_angle_bracket_is_not_a_token() {
        assert!(token(Span::new("< 3")).is_err());
    }
}
