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

//! Parser error types

use crate::span::Span;
use mathexpr_diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticCode};
use nom::error::{ErrorKind, ParseError as NomParseError};
use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with location information
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected token
    #[error("Unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The unexpected token that was found
        token: String,
        /// Position where the token was found
        position: usize,
    },

    /// A character that starts no token
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character
        character: char,
        /// Position of the character
        position: usize,
    },

    /// Expected token
    #[error("Expected {expected} at position {position}, found '{found}'")]
    ExpectedToken {
        /// The expected token description
        expected: String,
        /// What was found instead
        found: String,
        /// Position where the token was expected
        position: usize,
    },

    /// Unexpected end of input at specific position
    #[error("Unexpected end of input at position {position}")]
    UnexpectedEndOfInput {
        /// Position where more input was expected
        position: usize,
    },

    /// Invalid literal value
    #[error("Invalid number literal at position {position}: {value}")]
    InvalidLiteral {
        /// The invalid value that was encountered
        value: String,
        /// Position where the invalid literal was found
        position: usize,
    },

    /// Expression nests deeper than the parser allows
    #[error("Expression nesting exceeds {limit} levels at position {position}")]
    NestingTooDeep {
        /// Maximum nesting depth
        limit: usize,
        /// Position where the limit was hit
        position: usize,
    },

    /// Generic nom error
    #[error("Parse error at position {position}: {kind:?}")]
    NomError {
        /// Position where the parse error occurred
        position: usize,
        /// The nom error kind
        kind: ErrorKind,
    },
}

impl ParseError {
    /// Byte offset the error points at
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedCharacter { position, .. }
            | ParseError::ExpectedToken { position, .. }
            | ParseError::UnexpectedEndOfInput { position }
            | ParseError::InvalidLiteral { position, .. }
            | ParseError::NestingTooDeep { position, .. }
            | ParseError::NomError { position, .. } => *position,
        }
    }

    fn diagnostic_builder(&self) -> DiagnosticBuilder {
        let position = self.position();
        match self {
            ParseError::UnexpectedToken { token, .. } => {
                DiagnosticBuilder::error(DiagnosticCode::UnexpectedToken)
                    .with_message(format!("Unexpected token '{}'", token))
                    .with_offsets(position, position + token.len())
            }
            ParseError::UnexpectedCharacter { character, .. } => {
                DiagnosticBuilder::error(DiagnosticCode::UnexpectedToken)
                    .with_message(format!("Unexpected character '{}'", character))
                    .with_offsets(position, position + character.len_utf8())
            }
            ParseError::ExpectedToken { expected, found, .. } => {
                DiagnosticBuilder::expected_token(expected)
                    .with_message(format!("Expected {}, found '{}'", expected, found))
                    .with_offsets(position, position + found.len())
            }
            ParseError::UnexpectedEndOfInput { .. } => {
                DiagnosticBuilder::error(DiagnosticCode::UnexpectedToken)
                    .with_message("Unexpected end of input")
                    .with_offsets(position, position)
            }
            ParseError::InvalidLiteral { value, .. } => {
                DiagnosticBuilder::error(DiagnosticCode::InvalidNumber)
                    .with_message(format!("Invalid number literal: {}", value))
                    .with_offsets(position, position + value.len())
            }
            ParseError::NestingTooDeep { limit, .. } => {
                DiagnosticBuilder::nesting_too_deep(*limit).with_offsets(position, position)
            }
            ParseError::NomError { .. } => {
                DiagnosticBuilder::error(DiagnosticCode::UnexpectedToken)
                    .with_message(self.to_string())
                    .with_offsets(position, position)
            }
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        self.diagnostic_builder().build()
    }

    /// Convert to a diagnostic that renders the formula it came from
    pub fn to_diagnostic_in(&self, source: &str) -> Diagnostic {
        self.diagnostic_builder().with_source_text(source).build()
    }
}

impl<'a> NomParseError<Span<'a>> for ParseError {
    fn from_error_kind(input: Span<'a>, kind: ErrorKind) -> Self {
        ParseError::NomError {
            position: input.location_offset(),
            kind,
        }
    }

    fn append(_input: Span<'a>, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_points_at_token() {
        let error = ParseError::UnexpectedToken {
            token: ")".to_string(),
            position: 4,
        };
        let diagnostic = error.to_diagnostic_in("1 + )");

        assert_eq!(diagnostic.location.span.start, 4);
        assert_eq!(diagnostic.location.span.end, 5);
        assert_eq!(diagnostic.code_str(), "E001");
    }

    #[test]
    fn test_nesting_diagnostic_code() {
        let error = ParseError::NestingTooDeep {
            limit: 256,
            position: 0,
        };
        let diagnostic = error.to_diagnostic();

        assert_eq!(diagnostic.code, DiagnosticCode::NestingTooDeep);
        assert_eq!(diagnostic.message, "Formula nests deeper than 256 levels");
    }
}
