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

//! Tree-walking evaluation engine

use crate::error::{EvaluationError, EvaluationResult};
use crate::expression::Expression;
use crate::resolver::VariableResolver;
use mathexpr_ast::{BinaryOperator, ExpressionNode, UnaryOperator};
use mathexpr_registry::{FunctionError, FunctionRegistry, create_standard_registry};
use std::sync::{Arc, LazyLock};

static STANDARD_REGISTRY: LazyLock<Arc<FunctionRegistry>> =
    LazyLock::new(|| Arc::new(create_standard_registry()));

/// Shared registry holding the built-in functions
pub fn standard_registry() -> Arc<FunctionRegistry> {
    Arc::clone(&STANDARD_REGISTRY)
}

/// Evaluates formula trees against a function registry
#[derive(Debug, Clone)]
pub struct MathExprEngine {
    registry: Arc<FunctionRegistry>,
}

impl Default for MathExprEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MathExprEngine {
    /// Engine over the built-in functions
    pub fn new() -> Self {
        Self {
            registry: standard_registry(),
        }
    }

    /// Engine over a custom registry
    pub fn with_registry(registry: Arc<FunctionRegistry>) -> Self {
        Self { registry }
    }

    /// Get the function registry
    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    /// Evaluate a compiled expression; an empty expression yields `0.0`
    pub fn evaluate(
        &self,
        expression: &Expression,
        resolver: &dyn VariableResolver,
    ) -> EvaluationResult<f64> {
        let Some(root) = expression.root() else {
            return Ok(0.0);
        };
        let result = self.evaluate_node(root, resolver);
        if let Err(error) = &result {
            log::trace!("evaluation of '{}' failed: {}", expression, error);
        }
        result
    }

    /// Evaluate a raw syntax tree
    pub fn evaluate_node(
        &self,
        node: &ExpressionNode,
        resolver: &dyn VariableResolver,
    ) -> EvaluationResult<f64> {
        let value = match node {
            ExpressionNode::Number(value) => *value,
            ExpressionNode::Variable(name) => {
                resolver
                    .resolve(name)
                    .ok_or_else(|| EvaluationError::UnresolvedVariable { name: name.clone() })?
            }
            ExpressionNode::UnaryOp { op, operand } => {
                let value = self.evaluate_node(operand, resolver)?;
                match op {
                    UnaryOperator::Minus => -value,
                    UnaryOperator::Plus => value,
                }
            }
            ExpressionNode::BinaryOp(data) => {
                let left = self.evaluate_node(&data.left, resolver)?;
                let right = self.evaluate_node(&data.right, resolver)?;
                self.apply_binary(data.op, left, right, node)?
            }
            ExpressionNode::FunctionCall(data) => {
                let args = data
                    .args
                    .iter()
                    .map(|arg| self.evaluate_node(arg, resolver))
                    .collect::<EvaluationResult<Vec<f64>>>()?;
                self.registry.call(&data.name, &args)?
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvaluationError::NonFinite {
                expression: node.to_string(),
                value,
            })
        }
    }

    fn apply_binary(
        &self,
        op: BinaryOperator,
        left: f64,
        right: f64,
        node: &ExpressionNode,
    ) -> EvaluationResult<f64> {
        let truth = |b: bool| if b { 1.0 } else { 0.0 };
        Ok(match op {
            BinaryOperator::Add => left + right,
            BinaryOperator::Subtract => left - right,
            BinaryOperator::Multiply => left * right,
            BinaryOperator::Divide => {
                if right == 0.0 {
                    return Err(EvaluationError::DivisionByZero {
                        expression: node.to_string(),
                    });
                }
                left / right
            }
            BinaryOperator::Power => checked_pow(left, right)?,
            BinaryOperator::Equal => truth(left == right),
            BinaryOperator::NotEqual => truth(left != right),
            BinaryOperator::LessThan => truth(left < right),
            BinaryOperator::LessThanOrEqual => truth(left <= right),
            BinaryOperator::GreaterThan => truth(left > right),
            BinaryOperator::GreaterThanOrEqual => truth(left >= right),
        })
    }
}

fn checked_pow(base: f64, exponent: f64) -> Result<f64, FunctionError> {
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(FunctionError::Domain {
            name: "^".to_string(),
            message: format!("negative base {base} with fractional exponent {exponent}"),
        });
    }
    if base == 0.0 && exponent < 0.0 {
        return Err(FunctionError::Domain {
            name: "^".to_string(),
            message: "zero raised to a negative power".to_string(),
        });
    }
    Ok(base.powf(exponent))
}
