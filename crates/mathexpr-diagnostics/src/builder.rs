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

//! Builder pattern for constructing diagnostics

use crate::diagnostic::{Diagnostic, DiagnosticCode, Severity};
use crate::location::{SourceLocation, Span};

/// Builder for constructing diagnostics fluently
#[derive(Debug, Clone)]
pub struct DiagnosticBuilder {
    severity: Severity,
    code: DiagnosticCode,
    message: String,
    location: Option<SourceLocation>,
    context: Option<String>,
}

impl DiagnosticBuilder {
    /// Create a new error diagnostic builder
    pub fn error(code: DiagnosticCode) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: String::new(),
            location: None,
            context: None,
        }
    }

    /// Set the message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the location from a span
    pub fn with_span(mut self, span: Span) -> Self {
        let source_text = self.location.take().and_then(|loc| loc.source_text);
        self.location = Some(SourceLocation { span, source_text });
        self
    }

    /// Set the location from byte offsets
    pub fn with_offsets(self, start: usize, end: usize) -> Self {
        self.with_span(Span::new(start, end))
    }

    /// Attach the formula text the span points into
    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.location.get_or_insert_with(SourceLocation::default).source_text = Some(text.into());
        self
    }

    /// Name the formula the diagnostic is about
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Build the diagnostic
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            severity: self.severity,
            code: self.code,
            message: self.message,
            location: self.location.unwrap_or_default(),
            context: self.context,
        }
    }
}

// Convenience functions for common diagnostics

impl DiagnosticBuilder {
    /// Create an "unknown function" error
    pub fn unknown_function(name: &str) -> Self {
        Self::error(DiagnosticCode::UnknownFunction)
            .with_message(format!("Unknown function '{}'", name))
    }

    /// Create an "undefined variable" error
    pub fn undefined_variable(name: &str) -> Self {
        Self::error(DiagnosticCode::UndefinedVariable)
            .with_message(format!("Undefined variable '{}'", name))
    }

    /// Create an "expected token" error
    pub fn expected_token(token: &str) -> Self {
        Self::error(DiagnosticCode::ExpectedToken(token.to_string()))
            .with_message(format!("Expected '{}'", token))
    }

    /// Create a "nesting too deep" error
    pub fn nesting_too_deep(limit: usize) -> Self {
        Self::error(DiagnosticCode::NestingTooDeep)
            .with_message(format!("Formula nests deeper than {} levels", limit))
    }

    /// Create a "division by zero" error
    pub fn division_by_zero() -> Self {
        Self::error(DiagnosticCode::DivisionByZero).with_message("Division by zero")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diagnostic_builder() {
        let diagnostic = DiagnosticBuilder::error(DiagnosticCode::UnexpectedToken)
            .with_message("Unexpected ')'")
            .with_offsets(4, 5)
            .with_source_text("1 + )")
            .build();

        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.message, "Unexpected ')'");
        assert_eq!(diagnostic.location.span, Span::new(4, 5));
        assert_eq!(diagnostic.location.source_text.as_deref(), Some("1 + )"));
        assert_eq!(diagnostic.context, None);
    }

    #[test]
    fn test_source_text_survives_later_span() {
        let diagnostic = DiagnosticBuilder::undefined_variable("ipc")
            .with_source_text("ipc * 2")
            .with_offsets(0, 3)
            .with_context("pm0 base.dynamic")
            .build();

        assert_eq!(diagnostic.message, "Undefined variable 'ipc'");
        assert_eq!(diagnostic.location.source_text.as_deref(), Some("ipc * 2"));
        assert_eq!(diagnostic.context.as_deref(), Some("pm0 base.dynamic"));
    }
}
