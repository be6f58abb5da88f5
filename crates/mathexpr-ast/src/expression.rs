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

//! Expression AST node definitions

use crate::operator::{Associativity, BinaryOperator, UnaryOperator};
use crate::visitor::VariableCollector;
use smallvec::SmallVec;
use std::fmt;

/// AST representation of an arithmetic power formula
///
/// Large variants are boxed to keep the enum small; leaves (numbers and
/// variables) are by far the most common nodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExpressionNode {
    /// Numeric literal
    Number(f64),

    /// Free variable (statistic name, automatic variable or constant)
    Variable(String),

    /// Unary operation (negation, identity)
    UnaryOp {
        /// The operator
        op: UnaryOperator,
        /// The operand
        operand: Box<ExpressionNode>,
    },

    /// Binary operation (arithmetic, comparison) (boxed for size optimization)
    BinaryOp(Box<BinaryOpData>),

    /// Built-in function call (boxed for size optimization)
    FunctionCall(Box<FunctionCallData>),
}

/// Binary operation data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryOpData {
    /// The operator
    pub op: BinaryOperator,
    /// Left operand
    pub left: ExpressionNode,
    /// Right operand
    pub right: ExpressionNode,
}

/// Function call data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionCallData {
    /// Function name
    pub name: String,
    /// Function arguments (SmallVec for the common case of 1-3 args)
    pub args: SmallVec<[ExpressionNode; 4]>,
}

impl ExpressionNode {
    /// Create a numeric literal
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    /// Create a variable reference
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Create a unary operation expression
    pub fn unary_op(op: UnaryOperator, operand: ExpressionNode) -> Self {
        Self::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create a binary operation expression
    pub fn binary_op(op: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::BinaryOp(Box::new(BinaryOpData { op, left, right }))
    }

    /// Create a function call expression
    pub fn function_call(
        name: impl Into<String>,
        args: impl Into<SmallVec<[ExpressionNode; 4]>>,
    ) -> Self {
        Self::FunctionCall(Box::new(FunctionCallData {
            name: name.into(),
            args: args.into(),
        }))
    }

    /// Check if this expression is a literal
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Get the literal value if this is a numeric literal
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Get variable name if this is a variable expression
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Get binary operation components if this is a binary operation
    pub fn as_binary_op(&self) -> Option<(BinaryOperator, &ExpressionNode, &ExpressionNode)> {
        match self {
            Self::BinaryOp(data) => Some((data.op, &data.left, &data.right)),
            _ => None,
        }
    }

    /// Distinct free variable names, in order of first appearance
    pub fn variables(&self) -> Vec<String> {
        VariableCollector::collect(self)
    }

    /// Estimate the complexity of this expression (node count)
    pub fn complexity(&self) -> usize {
        match self {
            Self::Number(_) | Self::Variable(_) => 1,
            Self::UnaryOp { operand, .. } => 1 + operand.complexity(),
            Self::BinaryOp(data) => 1 + data.left.complexity() + data.right.complexity(),
            Self::FunctionCall(data) => {
                1 + data.args.iter().map(|arg| arg.complexity()).sum::<usize>()
            }
        }
    }

    /// Maximum nesting depth of the tree
    pub fn depth(&self) -> usize {
        match self {
            Self::Number(_) | Self::Variable(_) => 1,
            Self::UnaryOp { operand, .. } => 1 + operand.depth(),
            Self::BinaryOp(data) => 1 + data.left.depth().max(data.right.depth()),
            Self::FunctionCall(data) => {
                1 + data.args.iter().map(|arg| arg.depth()).max().unwrap_or(0)
            }
        }
    }

    fn binding_power(&self) -> u8 {
        match self {
            Self::BinaryOp(data) => data.op.precedence(),
            Self::UnaryOp { .. } => UnaryOperator::PRECEDENCE,
            Self::Number(_) | Self::Variable(_) | Self::FunctionCall(_) => u8::MAX,
        }
    }
}

fn write_operand(
    f: &mut fmt::Formatter<'_>,
    operand: &ExpressionNode,
    parenthesize: bool,
) -> fmt::Result {
    if parenthesize {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

impl fmt::Display for ExpressionNode {
    /// Canonical formula text; reparsing it yields an equal tree
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Variable(name) => f.write_str(name),
            Self::UnaryOp { op, operand } => {
                f.write_str(op.as_str())?;
                write_operand(f, operand, operand.binding_power() < UnaryOperator::PRECEDENCE)
            }
            Self::BinaryOp(data) => {
                let prec = data.op.precedence();
                let assoc = data.op.associativity();
                let left = data.left.binding_power();
                let right = data.right.binding_power();

                write_operand(
                    f,
                    &data.left,
                    left < prec || (left == prec && assoc == Associativity::Right),
                )?;
                write!(f, " {} ", data.op)?;
                write_operand(
                    f,
                    &data.right,
                    right < prec || (right == prec && assoc == Associativity::Left),
                )
            }
            Self::FunctionCall(data) => {
                write!(f, "{}(", data.name)?;
                for (i, arg) in data.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_respects_precedence() {
        // (a + b) * 2
        let expr = ExpressionNode::binary_op(
            BinaryOperator::Multiply,
            ExpressionNode::binary_op(
                BinaryOperator::Add,
                ExpressionNode::variable("a"),
                ExpressionNode::variable("b"),
            ),
            ExpressionNode::number(2.0),
        );
        assert_eq!(expr.to_string(), "(a + b) * 2");
    }

    #[test]
    fn test_display_power_and_unary() {
        let neg_base = ExpressionNode::binary_op(
            BinaryOperator::Power,
            ExpressionNode::unary_op(UnaryOperator::Minus, ExpressionNode::number(2.0)),
            ExpressionNode::number(2.0),
        );
        assert_eq!(neg_base.to_string(), "(-2) ^ 2");

        let neg_power = ExpressionNode::unary_op(
            UnaryOperator::Minus,
            ExpressionNode::binary_op(
                BinaryOperator::Power,
                ExpressionNode::number(2.0),
                ExpressionNode::number(2.0),
            ),
        );
        assert_eq!(neg_power.to_string(), "-2 ^ 2");
    }

    #[test]
    fn test_display_left_associativity() {
        // a - (b - c) must keep its parentheses
        let expr = ExpressionNode::binary_op(
            BinaryOperator::Subtract,
            ExpressionNode::variable("a"),
            ExpressionNode::binary_op(
                BinaryOperator::Subtract,
                ExpressionNode::variable("b"),
                ExpressionNode::variable("c"),
            ),
        );
        assert_eq!(expr.to_string(), "a - (b - c)");
    }

    #[test]
    fn test_function_call_display_and_complexity() {
        let expr = ExpressionNode::function_call(
            "max",
            vec![ExpressionNode::variable("x"), ExpressionNode::number(0.5)],
        );
        assert_eq!(expr.to_string(), "max(x, 0.5)");
        assert_eq!(expr.complexity(), 3);
        assert_eq!(expr.depth(), 2);
    }
}
