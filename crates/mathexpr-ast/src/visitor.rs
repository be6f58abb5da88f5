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

//! Visitor pattern for AST traversal

use crate::expression::ExpressionNode;
use crate::operator::{BinaryOperator, UnaryOperator};

/// Trait for visiting AST nodes
///
/// Every method has a default that keeps walking the tree, so implementors
/// only override the nodes they care about.
pub trait Visitor: Sized {
    /// Visit an expression node
    fn visit_expression(&mut self, expr: &ExpressionNode) {
        walk_expression(self, expr)
    }

    /// Visit a numeric literal
    fn visit_number(&mut self, _value: f64) {}

    /// Visit a variable reference
    fn visit_variable(&mut self, _name: &str) {}

    /// Visit a unary operation
    fn visit_unary_op(&mut self, _op: &UnaryOperator, operand: &ExpressionNode) {
        self.visit_expression(operand);
    }

    /// Visit a binary operation
    fn visit_binary_op(
        &mut self,
        _op: &BinaryOperator,
        left: &ExpressionNode,
        right: &ExpressionNode,
    ) {
        self.visit_expression(left);
        self.visit_expression(right);
    }

    /// Visit a function call
    fn visit_function_call(&mut self, _name: &str, args: &[ExpressionNode]) {
        for arg in args {
            self.visit_expression(arg);
        }
    }
}

/// Default implementation of walking an expression tree
pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &ExpressionNode) {
    match expr {
        ExpressionNode::Number(value) => visitor.visit_number(*value),
        ExpressionNode::Variable(name) => visitor.visit_variable(name),
        ExpressionNode::UnaryOp { op, operand } => visitor.visit_unary_op(op, operand),
        ExpressionNode::BinaryOp(data) => visitor.visit_binary_op(&data.op, &data.left, &data.right),
        ExpressionNode::FunctionCall(data) => visitor.visit_function_call(&data.name, &data.args),
    }
}

/// Collects distinct variable names in order of first appearance
#[derive(Debug, Default)]
pub struct VariableCollector {
    names: Vec<String>,
}

impl VariableCollector {
    /// Collect the free variables of `expr`
    pub fn collect(expr: &ExpressionNode) -> Vec<String> {
        let mut collector = Self::default();
        collector.visit_expression(expr);
        collector.names
    }
}

impl Visitor for VariableCollector {
    fn visit_variable(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }
}

/// Collects the names of every function called in an expression
#[derive(Debug, Default)]
pub struct FunctionCollector {
    names: Vec<(String, usize)>,
}

impl FunctionCollector {
    /// Collect `(name, arity)` for each call site of `expr`
    pub fn collect(expr: &ExpressionNode) -> Vec<(String, usize)> {
        let mut collector = Self::default();
        collector.visit_expression(expr);
        collector.names
    }
}

impl Visitor for FunctionCollector {
    fn visit_function_call(&mut self, name: &str, args: &[ExpressionNode]) {
        self.names.push((name.to_string(), args.len()));
        for arg in args {
            self.visit_expression(arg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_variable_collector_dedups_in_order() {
        // issue_rate * voltage + voltage * temp
        let expr = ExpressionNode::binary_op(
            BinaryOperator::Add,
            ExpressionNode::binary_op(
                BinaryOperator::Multiply,
                ExpressionNode::variable("issue_rate"),
                ExpressionNode::variable("voltage"),
            ),
            ExpressionNode::binary_op(
                BinaryOperator::Multiply,
                ExpressionNode::variable("voltage"),
                ExpressionNode::variable("temp"),
            ),
        );

        assert_eq!(
            VariableCollector::collect(&expr),
            vec!["issue_rate", "voltage", "temp"]
        );
    }

    #[test]
    fn test_function_collector_walks_arguments() {
        let expr = ExpressionNode::function_call(
            "max",
            vec![
                ExpressionNode::function_call("sqrt", vec![ExpressionNode::variable("x")]),
                ExpressionNode::number(1.0),
            ],
        );

        assert_eq!(
            FunctionCollector::collect(&expr),
            vec![("max".to_string(), 2), ("sqrt".to_string(), 1)]
        );
    }
}
