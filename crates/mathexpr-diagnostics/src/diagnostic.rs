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

//! Formula diagnostics
//!
//! A [`Diagnostic`] describes one problem with one formula: what went wrong
//! ([`DiagnosticCode`]), where in the formula text ([`SourceLocation`]) and,
//! when known, which configured formula it is (`context`, for example
//! `system.cpu.power_model.pm0 stage_3.dynamic`).

use crate::location::SourceLocation;
use std::fmt;

/// How a diagnostic affects the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// The formula produced a value anyway (e.g. a degraded zero)
    Warning,
    /// The formula cannot be used
    #[default]
    Error,
}

/// Stage of formula handling a code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Tokenizing and parsing the formula text
    Syntax,
    /// Checking names and call arities against a registry
    Binding,
    /// Computing a value
    Arithmetic,
}

/// Diagnostic codes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticCode {
    /// Token that cannot start or continue an expression
    UnexpectedToken,
    /// A specific token was required
    ExpectedToken(String),
    /// Malformed or out-of-range number literal
    InvalidNumber,
    /// Formula nests deeper than the parser allows
    NestingTooDeep,
    /// Call to a function the registry does not know
    UnknownFunction,
    /// Wrong number of arguments
    InvalidArity,
    /// Variable with no value
    UndefinedVariable,
    /// Right operand of `/` is zero
    DivisionByZero,
    /// Function argument outside its domain, or a non-finite result
    DomainError,
}

impl DiagnosticCode {
    /// Stable short code, e.g. `E007`
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UnexpectedToken => "E001",
            DiagnosticCode::ExpectedToken(_) => "E002",
            DiagnosticCode::InvalidNumber => "E004",
            DiagnosticCode::NestingTooDeep => "E005",
            DiagnosticCode::UnknownFunction => "E007",
            DiagnosticCode::InvalidArity => "E200",
            DiagnosticCode::UndefinedVariable => "E202",
            DiagnosticCode::DivisionByZero => "E300",
            DiagnosticCode::DomainError => "E304",
        }
    }

    /// Phase in which the problem is detected
    pub fn phase(&self) -> Phase {
        match self {
            DiagnosticCode::UnexpectedToken
            | DiagnosticCode::ExpectedToken(_)
            | DiagnosticCode::InvalidNumber
            | DiagnosticCode::NestingTooDeep => Phase::Syntax,
            DiagnosticCode::UnknownFunction
            | DiagnosticCode::InvalidArity
            | DiagnosticCode::UndefinedVariable => Phase::Binding,
            DiagnosticCode::DivisionByZero | DiagnosticCode::DomainError => Phase::Arithmetic,
        }
    }
}

/// A problem found in a formula
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// What went wrong
    pub code: DiagnosticCode,
    /// Human-readable message
    pub message: String,
    /// Span in the formula, with the formula text when available
    pub location: SourceLocation,
    /// Which configured formula this is about
    pub context: Option<String>,
}

impl Diagnostic {
    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Short code, e.g. `E300`
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Name the formula this diagnostic belongs to
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Downgrade to a warning, for failures that were absorbed
    pub fn into_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCode::UnexpectedToken => write!(f, "unexpected token"),
            DiagnosticCode::ExpectedToken(token) => write!(f, "expected '{}'", token),
            DiagnosticCode::InvalidNumber => write!(f, "invalid number"),
            DiagnosticCode::NestingTooDeep => write!(f, "formula nested too deeply"),
            DiagnosticCode::UnknownFunction => write!(f, "unknown function"),
            DiagnosticCode::InvalidArity => write!(f, "invalid number of arguments"),
            DiagnosticCode::UndefinedVariable => write!(f, "undefined variable"),
            DiagnosticCode::DivisionByZero => write!(f, "division by zero"),
            DiagnosticCode::DomainError => write!(f, "domain error"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity, self.code_str())?;
        if let Some(context) = &self.context {
            write!(f, " in {context}")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(snippet) = self.location.render_snippet() {
            write!(f, "\n{snippet}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Span;
    use pretty_assertions::assert_eq;

    fn unknown_foo() -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            code: DiagnosticCode::UnknownFunction,
            message: "Unknown function 'foo'".to_string(),
            location: SourceLocation {
                span: Span::new(0, 3),
                source_text: Some("foo(1)".to_string()),
            },
            context: None,
        }
    }

    #[test]
    fn test_display_with_snippet() {
        let diagnostic = unknown_foo();
        assert!(diagnostic.is_error());
        assert_eq!(diagnostic.code_str(), "E007");
        assert_eq!(
            diagnostic.to_string(),
            "error[E007]: Unknown function 'foo'\n  foo(1)\n  ^^^"
        );
    }

    #[test]
    fn test_context_and_warning() {
        let diagnostic = unknown_foo().with_context("pm0 stage_3.dynamic").into_warning();
        assert!(!diagnostic.is_error());
        assert_eq!(
            diagnostic.to_string(),
            "warning[E007] in pm0 stage_3.dynamic: Unknown function 'foo'\n  foo(1)\n  ^^^"
        );
    }

    #[test]
    fn test_phases() {
        assert_eq!(DiagnosticCode::NestingTooDeep.phase(), Phase::Syntax);
        assert_eq!(DiagnosticCode::InvalidArity.phase(), Phase::Binding);
        assert_eq!(DiagnosticCode::DivisionByZero.phase(), Phase::Arithmetic);
        assert!(Severity::Error > Severity::Warning);
    }
}
