// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! nom-based tokenizer for power formulas
//!
//! Produces a flat vector of spanned tokens. Whitespace is insignificant and
//! dropped; everything else either forms a token or is reported as an
//! unexpected character with its byte offset.

use crate::error::{ParseError, ParseResult};
use crate::lexer::{is_identifier_continue, is_identifier_start};
use crate::span::helpers::{position, spanned};
use crate::span::{Span, Spanned};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, digit0, digit1, multispace0, one_of, satisfy};
use nom::combinator::{opt, recognize, value};
use nom::{IResult, Parser};
use std::fmt;

/// Token types produced by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'input> {
    /// Numeric literal
    Number(f64),
    /// Identifier (variable or function name)
    Identifier(&'input str),

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `^`
    Power,

    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,

    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
}

impl<'input> Token<'input> {
    /// Get identifier text if this is an identifier
    pub fn as_identifier(&self) -> Option<&'input str> {
        match self {
            Token::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Check if this token is an identifier
    pub fn is_identifier(&self) -> bool {
        matches!(self, Token::Identifier(_))
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Identifier(name) => write!(f, "{name}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Multiply => write!(f, "*"),
            Token::Divide => write!(f, "/"),
            Token::Power => write!(f, "^"),
            Token::Equal => write!(f, "=="),
            Token::NotEqual => write!(f, "!="),
            Token::LessThan => write!(f, "<"),
            Token::LessThanOrEqual => write!(f, "<="),
            Token::GreaterThan => write!(f, ">"),
            Token::GreaterThanOrEqual => write!(f, ">="),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

type TokenResult<'a> = IResult<Span<'a>, Spanned<Token<'a>>, ParseError>;

/// Numbers: `12`, `1.5`, `1.`, `.25`, with optional exponent `1e-3`
fn number(input: Span<'_>) -> TokenResult<'_> {
    let start = input;
    let (input, text) = recognize((
        alt((
            recognize((digit1, opt((char('.'), digit0)))),
            recognize((char('.'), digit1)),
        )),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)?;

    let literal: &str = text.fragment();
    match literal.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok((input, spanned(&start, &input, Token::Number(value)))),
        _ => Err(nom::Err::Failure(ParseError::InvalidLiteral {
            value: literal.to_string(),
            position: position(&start),
        })),
    }
}

/// Identifiers may contain `.` and `:` so qualified statistic names lex as one token
fn identifier<'a>(input: Span<'a>) -> TokenResult<'a> {
    let start = input;
    let (input, text) =
        recognize((satisfy(is_identifier_start), take_while(is_identifier_continue)))
            .parse(input)?;
    let name: &'a str = *text.fragment();
    Ok((input, spanned(&start, &input, Token::Identifier(name))))
}

fn operator(input: Span<'_>) -> TokenResult<'_> {
    let start = input;
    let (input, token) = alt((
        value(Token::LessThanOrEqual, tag("<=")),
        value(Token::GreaterThanOrEqual, tag(">=")),
        value(Token::Equal, tag("==")),
        value(Token::NotEqual, tag("!=")),
        value(Token::Plus, char('+')),
        value(Token::Minus, char('-')),
        value(Token::Multiply, char('*')),
        value(Token::Divide, char('/')),
        value(Token::Power, char('^')),
        value(Token::LessThan, char('<')),
        value(Token::GreaterThan, char('>')),
        value(Token::LeftParen, char('(')),
        value(Token::RightParen, char(')')),
        value(Token::Comma, char(',')),
    ))
    .parse(input)?;
    Ok((input, spanned(&start, &input, token)))
}

fn token(input: Span<'_>) -> TokenResult<'_> {
    alt((number, identifier, operator)).parse(input)
}

/// Tokenize a complete formula
pub fn tokenize(input: &str) -> ParseResult<Vec<Spanned<Token<'_>>>> {
    let mut remaining = Span::new(input);
    let mut tokens = Vec::with_capacity(input.len() / 2 + 1);

    loop {
        let (rest, _) = multispace0::<Span<'_>, ParseError>(remaining).map_err(flatten)?;
        if rest.fragment().is_empty() {
            break;
        }

        match token(rest) {
            Ok((next, tok)) => {
                tokens.push(tok);
                remaining = next;
            }
            Err(nom::Err::Failure(error)) => return Err(error),
            Err(_) => {
                let character = rest.fragment().chars().next().unwrap_or_default();
                return Err(ParseError::UnexpectedCharacter {
                    character,
                    position: position(&rest),
                });
            }
        }
    }

    Ok(tokens)
}

fn flatten(error: nom::Err<ParseError>) -> ParseError {
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => ParseError::UnexpectedEndOfInput { position: 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_tokenizer_basic() {
        assert_eq!(
            kinds("0.5 * issue_rate"),
            vec![
                Token::Number(0.5),
                Token::Multiply,
                Token::Identifier("issue_rate"),
            ]
        );
    }

    #[test]
    fn test_qualified_identifier_is_one_token() {
        assert_eq!(
            kinds("system.cpu.ipc + core::ticks"),
            vec![
                Token::Identifier("system.cpu.ipc"),
                Token::Plus,
                Token::Identifier("core::ticks"),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("12 1.5 .25 1e3 2.5E-1 7."),
            vec![
                Token::Number(12.0),
                Token::Number(1.5),
                Token::Number(0.25),
                Token::Number(1000.0),
                Token::Number(0.25),
                Token::Number(7.0),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("<= >= == != < > ^ ( ) ,"),
            vec![
                Token::LessThanOrEqual,
                Token::GreaterThanOrEqual,
                Token::Equal,
                Token::NotEqual,
                Token::LessThan,
                Token::GreaterThan,
                Token::Power,
                Token::LeftParen,
                Token::RightParen,
                Token::Comma,
            ]
        );
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = tokenize("  ab + 1").unwrap();
        assert_eq!((tokens[0].start, tokens[0].end), (2, 4));
        assert_eq!((tokens[1].start, tokens[1].end), (5, 6));
        assert_eq!((tokens[2].start, tokens[2].end), (7, 8));
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            tokenize("a $ b"),
            Err(ParseError::UnexpectedCharacter {
                character: '$',
                position: 2,
            })
        );
    }

    #[test]
    fn test_overflowing_literal_rejected() {
        assert!(matches!(
            tokenize("1e999"),
            Err(ParseError::InvalidLiteral { position: 0, .. })
        ));
    }

    #[test]
    fn test_whitespace_only() {
        assert!(tokenize(" \t\n ").unwrap().is_empty());
    }
}
