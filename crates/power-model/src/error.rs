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

//! Power model error types

use crate::slot::PowerStateSlot;
use mathexpr_diagnostics::{Diagnostic, DiagnosticBuilder};
use mathexpr_evaluator::{EvaluationError, ExpressionError};
use thiserror::Error;

/// Result type for power model operations
pub type PowerResult<T> = Result<T, PowerModelError>;

/// Errors raised by power evaluators and aggregators
///
/// Any of these returned from a strict query or from setup must end the
/// run. Degrading to zero instead is only possible through the tolerant
/// query path, which reports failures as a
/// [`PowerOutcome`](crate::PowerOutcome) rather than an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PowerModelError {
    /// A formula variable has no statistic, constant or automatic value
    #[error("Failed to evaluate '{variable}' in expression '{expression}' of {component}")]
    UnresolvedVariable {
        /// Variable name
        variable: String,
        /// Owning component
        component: String,
        /// Canonical formula text
        expression: String,
    },

    /// A power state slot was registered twice
    #[error("Power state {slot} registered twice on {component}")]
    DuplicateRegistration {
        /// The slot
        slot: PowerStateSlot,
        /// Owning component
        component: String,
    },

    /// A query or thermal update reached an aggregator that is not bound yet
    #[error("{operation} called on {component} before it was bound")]
    UseBeforeBound {
        /// Owning component
        component: String,
        /// The rejected operation
        operation: &'static str,
    },

    /// An evaluator was used or registered before its startup
    #[error("Power evaluator {component} for state {slot} has not been started")]
    EvaluatorNotStarted {
        /// The slot
        slot: PowerStateSlot,
        /// Evaluator name
        component: String,
    },

    /// bind() or register_state() on an aggregator that is already bound
    #[error("Power model {component} is already bound")]
    AlreadyBound {
        /// Owning component
        component: String,
    },

    /// startup() before the statistics registry was finalized
    #[error("Cannot start {component}: statistics registry is not finalized")]
    RegistryNotFinalized {
        /// Evaluator name
        component: String,
    },

    /// Arithmetic failure while evaluating a formula
    #[error("Evaluation of '{expression}' in {component} failed: {source}")]
    Evaluation {
        /// Owning component
        component: String,
        /// Canonical formula text
        expression: String,
        /// Underlying error
        source: EvaluationError,
    },

    /// A configured formula does not parse
    #[error("Invalid {field} formula for {component}: {source}")]
    Parse {
        /// Owning component
        component: String,
        /// Which formula, e.g. `stage_3.dynamic`
        field: String,
        /// Formula text as configured
        formula: String,
        /// Underlying error
        source: ExpressionError,
    },

    /// Malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PowerModelError {
    /// Check if the error comes from evaluating a formula rather than from setup or usage
    pub fn is_evaluation_failure(&self) -> bool {
        matches!(
            self,
            PowerModelError::UnresolvedVariable { .. } | PowerModelError::Evaluation { .. }
        )
    }

    /// Component the error refers to, when there is one
    pub fn component(&self) -> Option<&str> {
        match self {
            PowerModelError::UnresolvedVariable { component, .. }
            | PowerModelError::DuplicateRegistration { component, .. }
            | PowerModelError::UseBeforeBound { component, .. }
            | PowerModelError::EvaluatorNotStarted { component, .. }
            | PowerModelError::AlreadyBound { component }
            | PowerModelError::RegistryNotFinalized { component }
            | PowerModelError::Evaluation { component, .. }
            | PowerModelError::Parse { component, .. } => Some(component),
            PowerModelError::Config(_) => None,
        }
    }

    /// Diagnostic for formula errors, naming the component and, for parse
    /// errors, the formula field
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            PowerModelError::Parse {
                component,
                field,
                formula,
                source,
            } => Some(
                source
                    .to_diagnostic(formula)
                    .with_context(format!("{component} {field}")),
            ),
            PowerModelError::Evaluation {
                component, source, ..
            } => Some(source.to_diagnostic().with_context(component.as_str())),
            PowerModelError::UnresolvedVariable {
                variable,
                component,
                ..
            } => Some(
                DiagnosticBuilder::undefined_variable(variable)
                    .with_context(component.as_str())
                    .build(),
            ),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PowerModelError {
    fn from(error: serde_json::Error) -> Self {
        PowerModelError::Config(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_variable_and_component() {
        let error = PowerModelError::UnresolvedVariable {
            variable: "issue_rate".to_string(),
            component: "system.cpu.power_model.pm0".to_string(),
            expression: "0.5 * issue_rate".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("issue_rate"));
        assert!(message.contains("system.cpu.power_model.pm0"));
        assert!(error.is_evaluation_failure());
    }

    #[test]
    fn test_component() {
        let error = PowerModelError::Evaluation {
            component: "pm".to_string(),
            expression: "1 / x".to_string(),
            source: EvaluationError::DivisionByZero {
                expression: "1 / x".to_string(),
            },
        };
        assert_eq!(error.component(), Some("pm"));
        assert_eq!(PowerModelError::Config("bad".to_string()).component(), None);
        assert!(error.to_diagnostic().is_some_and(|d| d.is_error()));
    }

    #[test]
    fn test_diagnostic_names_formula() {
        let source = mathexpr_evaluator::Expression::parse("1 +").err().unwrap();
        let error = PowerModelError::Parse {
            component: "pm0".to_string(),
            field: "stage_3.dynamic".to_string(),
            formula: "1 +".to_string(),
            source,
        };
        let diagnostic = error.to_diagnostic().unwrap();
        assert_eq!(diagnostic.context.as_deref(), Some("pm0 stage_3.dynamic"));
        assert!(diagnostic.to_string().starts_with("error[E001] in pm0 stage_3.dynamic: "));

        let unresolved = PowerModelError::UnresolvedVariable {
            variable: "ipc".to_string(),
            component: "pm0".to_string(),
            expression: "ipc * 2".to_string(),
        };
        assert_eq!(
            unresolved.to_diagnostic().unwrap().to_string(),
            "error[E202] in pm0: Undefined variable 'ipc'"
        );
        assert_eq!(PowerModelError::Config("bad".to_string()).to_diagnostic(), None);
    }
}
