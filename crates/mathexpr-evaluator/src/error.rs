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

// Error types for formula compilation and evaluation

use mathexpr_diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticCode};
use mathexpr_parser::ParseError;
use mathexpr_registry::FunctionError;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors raised while turning formula text into an [`Expression`](crate::Expression)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// The text is not a well-formed formula
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The formula calls an unknown function or passes the wrong number of arguments
    #[error(transparent)]
    Function(#[from] FunctionError),
}

impl ExpressionError {
    /// Convert to a diagnostic that renders the offending formula
    pub fn to_diagnostic(&self, source: &str) -> Diagnostic {
        match self {
            ExpressionError::Parse(error) => error.to_diagnostic_in(source),
            ExpressionError::Function(error) => function_diagnostic(error)
                .with_source_text(source)
                .build(),
        }
    }
}

/// Errors that can occur during formula evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// A free variable has no value
    #[error("Variable '{name}' could not be resolved")]
    UnresolvedVariable {
        /// Variable name
        name: String,
    },

    /// Right operand of `/` evaluated to zero
    #[error("Division by zero in '{expression}'")]
    DivisionByZero {
        /// The division sub-expression
        expression: String,
    },

    /// A sub-expression produced NaN or an infinity
    #[error("Non-finite result {value} from '{expression}'")]
    NonFinite {
        /// The offending sub-expression
        expression: String,
        /// The value produced
        value: f64,
    },

    /// Function evaluation error (domain, arity or unknown name)
    #[error("Function error: {0}")]
    Function(#[from] FunctionError),
}

impl EvaluationError {
    /// Check if this is an arithmetic failure rather than a missing variable
    pub fn is_arithmetic(&self) -> bool {
        !matches!(self, EvaluationError::UnresolvedVariable { .. })
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            EvaluationError::UnresolvedVariable { name } => {
                DiagnosticBuilder::undefined_variable(name).build()
            }
            EvaluationError::DivisionByZero { .. } => DiagnosticBuilder::division_by_zero()
                .with_message(self.to_string())
                .build(),
            EvaluationError::NonFinite { .. } => {
                DiagnosticBuilder::error(DiagnosticCode::DomainError)
                    .with_message(self.to_string())
                    .build()
            }
            EvaluationError::Function(error) => function_diagnostic(error).build(),
        }
    }
}

fn function_diagnostic(error: &FunctionError) -> DiagnosticBuilder {
    match error {
        FunctionError::UnknownFunction { name } => DiagnosticBuilder::unknown_function(name),
        FunctionError::InvalidArity { .. } => {
            DiagnosticBuilder::error(DiagnosticCode::InvalidArity).with_message(error.to_string())
        }
        FunctionError::Domain { .. } => {
            DiagnosticBuilder::error(DiagnosticCode::DomainError).with_message(error.to_string())
        }
    }
}
