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

//! Lexical analysis utilities

use crate::span::Spanned;
use crate::tokenizer::Token;

/// Check if a character can start an identifier
pub fn is_identifier_start(c: char) -> bool {
    unicode_xid::UnicodeXID::is_xid_start(c) || c == '_'
}

/// Check if a character can continue an identifier
///
/// `.` and `:` are accepted so that hierarchical statistic names such as
/// `system.cpu.numCycles` stay a single token.
pub fn is_identifier_continue(c: char) -> bool {
    unicode_xid::UnicodeXID::is_xid_continue(c) || c == '.' || c == ':'
}

/// Token stream with lookahead capability
#[derive(Debug)]
pub struct TokenStream<'input> {
    tokens: Vec<Spanned<Token<'input>>>,
    position: usize,
    input_len: usize,
}

impl<'input> TokenStream<'input> {
    /// Create a new token stream over a formula of `input_len` bytes
    pub fn new(tokens: Vec<Spanned<Token<'input>>>, input_len: usize) -> Self {
        Self {
            tokens,
            position: 0,
            input_len,
        }
    }

    /// Peek at the current token without consuming
    pub fn peek(&self) -> Option<&Spanned<Token<'input>>> {
        self.tokens.get(self.position)
    }

    /// Peek at a token n positions ahead
    pub fn peek_ahead(&self, n: usize) -> Option<&Spanned<Token<'input>>> {
        self.tokens.get(self.position + n)
    }

    /// Consume and return the current token
    pub fn next(&mut self) -> Option<Spanned<Token<'input>>> {
        let token = self.tokens.get(self.position).cloned()?;
        self.position += 1;
        Some(token)
    }

    /// Check if we're at the end of the stream
    pub fn is_eof(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Byte offset of the current token, or the input length at EOF
    pub fn offset(&self) -> usize {
        self.peek().map_or(self.input_len, |t| t.start)
    }

    /// Consume a token if it matches the predicate
    pub fn consume_if<F>(&mut self, predicate: F) -> Option<Spanned<Token<'input>>>
    where
        F: FnOnce(&Token<'input>) -> bool,
    {
        match self.peek() {
            Some(token) if predicate(&token.value) => self.next(),
            _ => None,
        }
    }

    /// Number of tokens in the stream
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the stream holds no tokens at all
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
