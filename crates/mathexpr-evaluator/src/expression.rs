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

//! Compiled formula

use crate::engine::{MathExprEngine, standard_registry};
use crate::error::{EvaluationResult, ExpressionError};
use crate::resolver::VariableResolver;
use mathexpr_ast::{ExpressionNode, FunctionCollector};
use mathexpr_parser::parse;
use mathexpr_registry::FunctionRegistry;
use std::fmt;

/// A parsed and validated formula
///
/// The free variables are collected once at parse time; binding them to
/// concrete values is left to whoever evaluates the expression. An empty
/// formula is valid, has no variables and always evaluates to `0.0`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    source: String,
    root: Option<ExpressionNode>,
    variables: Vec<String>,
}

impl Expression {
    /// Parse `source` against the built-in functions
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        Self::parse_with_registry(source, &standard_registry())
    }

    /// Parse `source`, validating every call against `registry`
    pub fn parse_with_registry(
        source: &str,
        registry: &FunctionRegistry,
    ) -> Result<Self, ExpressionError> {
        if source.trim().is_empty() {
            return Ok(Self::empty());
        }

        let root = parse(source)?;
        for (name, arity) in FunctionCollector::collect(&root) {
            registry.validate_call(&name, arity)?;
        }

        let variables = root.variables();
        Ok(Self {
            source: source.to_string(),
            root: Some(root),
            variables,
        })
    }

    /// The empty formula
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if this is the empty formula
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Original formula text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Syntax tree, `None` for the empty formula
    pub fn root(&self) -> Option<&ExpressionNode> {
        self.root.as_ref()
    }

    /// Distinct free variables in order of first appearance
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Evaluate with the built-in functions
    pub fn evaluate(&self, resolver: &dyn VariableResolver) -> EvaluationResult<f64> {
        MathExprEngine::new().evaluate(self, resolver)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{root}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::NoVariables;
    use mathexpr_registry::FunctionError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_formula() {
        for source in ["", "   ", "\t\n"] {
            let expr = Expression::parse(source).unwrap();
            assert!(expr.is_empty());
            assert!(expr.variables().is_empty());
            assert_eq!(expr.evaluate(&NoVariables), Ok(0.0));
            assert_eq!(expr.to_string(), "");
        }
    }

    #[test]
    fn test_variables_collected() {
        let expr = Expression::parse("0.5 * issue_rate * voltage^2").unwrap();
        assert_eq!(expr.variables(), ["issue_rate", "voltage"]);
        assert_eq!(expr.source(), "0.5 * issue_rate * voltage^2");
    }

    #[test]
    fn test_unknown_function_rejected_at_parse() {
        assert_eq!(
            Expression::parse("tanh(x)"),
            Err(ExpressionError::Function(FunctionError::UnknownFunction {
                name: "tanh".to_string()
            }))
        );
        assert!(matches!(
            Expression::parse("sqrt(1, 2)"),
            Err(ExpressionError::Function(FunctionError::InvalidArity { .. }))
        ));
    }

    #[test]
    fn test_custom_registry() {
        let registry = FunctionRegistry::new();
        assert!(Expression::parse_with_registry("abs(x)", &registry).is_err());
        assert!(Expression::parse_with_registry("x + 1", &registry).is_ok());
    }
}
