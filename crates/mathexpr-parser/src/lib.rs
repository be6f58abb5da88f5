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

//! Power-model expression parser
//!
//! This crate provides a nom-based tokenizer and a precedence-climbing parser
//! for arithmetic power formulas, converting text into an Abstract Syntax Tree.

#![warn(missing_docs)]

pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
pub use parser::{MAX_NESTING_DEPTH, Parser, parse_expression};
pub use span::{Span, Spanned};

/// Parse a formula string into an AST
pub fn parse(input: &str) -> ParseResult<mathexpr_ast::ExpressionNode> {
    parse_expression(input)
}
