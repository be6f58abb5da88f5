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

//! Source location tracking for diagnostics

use std::fmt;

/// A byte range in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-width span at `offset`
    pub const fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Location of a diagnostic, optionally with the text it points into
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    /// The span in the source
    pub span: Span,
    /// Source text (the whole formula)
    pub source_text: Option<String>,
}

impl SourceLocation {
    /// Create a location from a span
    pub fn new(span: Span) -> Self {
        Self {
            span,
            source_text: None,
        }
    }

    /// Render the source line with a caret marker under the span
    pub fn render_snippet(&self) -> Option<String> {
        let text = self.source_text.as_ref()?;
        let start = self.span.start.min(text.len());
        let width = self.span.len().max(1);
        Some(format!(
            "  {text}\n  {}{}",
            " ".repeat(text[..start].chars().count()),
            "^".repeat(width)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_span_len() {
        let a = Span::new(2, 5);
        assert_eq!(a.len(), 3);
        assert_eq!(a.to_string(), "2..5");
        assert!(Span::point(3).is_empty());
    }

    #[test]
    fn test_render_snippet() {
        let location = SourceLocation {
            span: Span::new(4, 7),
            source_text: Some("2 * foo".to_string()),
        };
        assert_eq!(
            location.render_snippet().as_deref(),
            Some("  2 * foo\n      ^^^")
        );
    }
}
