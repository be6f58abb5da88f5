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

//! Pratt parser for power formulas
//!
//! Binding strength comes straight from the AST operator tables:
//!
//! | level | operators                        | associativity |
//! |-------|----------------------------------|---------------|
//! | 1     | `==` `!=` `<` `<=` `>` `>=`      | left          |
//! | 2     | `+` `-`                          | left          |
//! | 3     | `*` `/`                          | left          |
//! | 4     | prefix `-` `+`                   | prefix        |
//! | 5     | `^`                              | right         |
//!
//! Exponentiation binds tighter than prefix minus, so `-2^2` is `-(2^2)`.

use crate::error::{ParseError, ParseResult};
use crate::lexer::TokenStream;
use crate::tokenizer::{Token, tokenize};
use mathexpr_ast::{Associativity, BinaryOperator, ExpressionNode, UnaryOperator};
use smallvec::SmallVec;

/// Maximum depth of the syntax tree, and of parentheses while parsing
pub const MAX_NESTING_DEPTH: usize = 256;

/// A parsed subtree and the number of levels it spans
struct Parsed {
    node: ExpressionNode,
    depth: usize,
}

impl Parsed {
    fn leaf(node: ExpressionNode) -> Self {
        Self { node, depth: 1 }
    }
}

#[inline]
fn token_to_binary_op(token: &Token<'_>) -> Option<BinaryOperator> {
    match token {
        Token::Plus => Some(BinaryOperator::Add),
        Token::Minus => Some(BinaryOperator::Subtract),
        Token::Multiply => Some(BinaryOperator::Multiply),
        Token::Divide => Some(BinaryOperator::Divide),
        Token::Power => Some(BinaryOperator::Power),
        Token::Equal => Some(BinaryOperator::Equal),
        Token::NotEqual => Some(BinaryOperator::NotEqual),
        Token::LessThan => Some(BinaryOperator::LessThan),
        Token::LessThanOrEqual => Some(BinaryOperator::LessThanOrEqual),
        Token::GreaterThan => Some(BinaryOperator::GreaterThan),
        Token::GreaterThanOrEqual => Some(BinaryOperator::GreaterThanOrEqual),
        _ => None,
    }
}

/// Parser over a tokenized formula
pub struct Parser<'input> {
    source: &'input str,
    tokens: TokenStream<'input>,
    depth: usize,
}

impl<'input> Parser<'input> {
    /// Tokenize `source` and prepare to parse it
    pub fn new(source: &'input str) -> ParseResult<Self> {
        let tokens = tokenize(source)?;
        Ok(Self {
            source,
            tokens: TokenStream::new(tokens, source.len()),
            depth: 0,
        })
    }

    /// Parse the whole input as one expression
    pub fn parse(mut self) -> ParseResult<ExpressionNode> {
        let expr = self.parse_expression_with_precedence(0)?;
        if let Some(extra) = self.tokens.peek() {
            return Err(ParseError::UnexpectedToken {
                token: extra.text(self.source).to_string(),
                position: extra.start,
            });
        }
        Ok(expr.node)
    }

    fn nesting_too_deep(&self) -> ParseError {
        ParseError::NestingTooDeep {
            limit: MAX_NESTING_DEPTH,
            position: self.tokens.offset(),
        }
    }

    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(self.nesting_too_deep());
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Wrap `node` whose deepest child is `child_depth` levels deep
    fn node(&self, node: ExpressionNode, child_depth: usize) -> ParseResult<Parsed> {
        let depth = child_depth + 1;
        if depth > MAX_NESTING_DEPTH {
            return Err(self.nesting_too_deep());
        }
        Ok(Parsed { node, depth })
    }

    fn parse_expression_with_precedence(&mut self, min_precedence: u8) -> ParseResult<Parsed> {
        self.enter()?;
        let result = self.parse_binary(min_precedence);
        self.leave();
        result
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Parsed> {
        let mut left = self.parse_prefix()?;

        while let Some(op) = self.tokens.peek().and_then(|t| token_to_binary_op(&t.value)) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.tokens.next();

            let next_min = match op.associativity() {
                Associativity::Left => precedence + 1,
                Associativity::Right => precedence,
            };
            let right = self.parse_expression_with_precedence(next_min)?;
            // a flat chain grows the tree one level per operator
            let child_depth = left.depth.max(right.depth);
            left = self.node(ExpressionNode::binary_op(op, left.node, right.node), child_depth)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Parsed> {
        let op = match self.tokens.peek().map(|t| t.value) {
            Some(Token::Minus) => UnaryOperator::Minus,
            Some(Token::Plus) => UnaryOperator::Plus,
            _ => return self.parse_primary(),
        };
        self.tokens.next();

        let operand = self.parse_expression_with_precedence(UnaryOperator::PRECEDENCE)?;
        match op {
            // unary plus is the identity
            UnaryOperator::Plus => Ok(operand),
            UnaryOperator::Minus => {
                self.node(ExpressionNode::unary_op(op, operand.node), operand.depth)
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Parsed> {
        let Some(token) = self.tokens.next() else {
            return Err(ParseError::UnexpectedEndOfInput {
                position: self.source.len(),
            });
        };

        match token.value {
            Token::Number(value) => Ok(Parsed::leaf(ExpressionNode::number(value))),
            Token::Identifier(name) => {
                if self.tokens.consume_if(|t| *t == Token::LeftParen).is_some() {
                    self.parse_function_call(name)
                } else {
                    Ok(Parsed::leaf(ExpressionNode::variable(name)))
                }
            }
            Token::LeftParen => {
                let inner = self.parse_expression_with_precedence(0)?;
                self.expect(Token::RightParen, "')'")?;
                Ok(inner)
            }
            _ => Err(ParseError::UnexpectedToken {
                token: token.text(self.source).to_string(),
                position: token.start,
            }),
        }
    }

    /// Arguments after the opening parenthesis, up to and including `)`
    fn parse_function_call(&mut self, name: &str) -> ParseResult<Parsed> {
        let mut args: SmallVec<[ExpressionNode; 4]> = SmallVec::new();
        let mut child_depth = 0;

        if self.tokens.consume_if(|t| *t == Token::RightParen).is_none() {
            loop {
                let arg = self.parse_expression_with_precedence(0)?;
                child_depth = child_depth.max(arg.depth);
                args.push(arg.node);
                if self.tokens.consume_if(|t| *t == Token::Comma).is_some() {
                    continue;
                }
                self.expect(Token::RightParen, "',' or ')'")?;
                break;
            }
        }

        self.node(ExpressionNode::function_call(name, args), child_depth)
    }

    fn expect(&mut self, expected: Token<'input>, description: &str) -> ParseResult<()> {
        match self.tokens.peek() {
            Some(token) if token.value == expected => {
                self.tokens.next();
                Ok(())
            }
            Some(token) => Err(ParseError::ExpectedToken {
                expected: description.to_string(),
                found: token.text(self.source).to_string(),
                position: token.start,
            }),
            None => Err(ParseError::UnexpectedEndOfInput {
                position: self.source.len(),
            }),
        }
    }
}

/// Parse a formula into an AST
pub fn parse_expression(input: &str) -> ParseResult<ExpressionNode> {
    let expr = Parser::new(input)?.parse()?;
    log::trace!("parsed formula '{}' -> {}", input, expr);
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(v: f64) -> ExpressionNode {
        ExpressionNode::number(v)
    }

    fn var(name: &str) -> ExpressionNode {
        ExpressionNode::variable(name)
    }

    fn bin(op: BinaryOperator, l: ExpressionNode, r: ExpressionNode) -> ExpressionNode {
        ExpressionNode::binary_op(op, l, r)
    }

    #[test]
    fn test_precedence_ordering() {
        assert_eq!(
            parse_expression("1 + 2 * 3").unwrap(),
            bin(
                BinaryOperator::Add,
                num(1.0),
                bin(BinaryOperator::Multiply, num(2.0), num(3.0))
            )
        );
    }

    #[test]
    fn test_associativity() {
        assert_eq!(
            parse_expression("a - b - c").unwrap(),
            bin(
                BinaryOperator::Subtract,
                bin(BinaryOperator::Subtract, var("a"), var("b")),
                var("c")
            )
        );
        assert_eq!(
            parse_expression("2 ^ 3 ^ 2").unwrap(),
            bin(
                BinaryOperator::Power,
                num(2.0),
                bin(BinaryOperator::Power, num(3.0), num(2.0))
            )
        );
    }

    #[test]
    fn test_power_binds_tighter_than_negation() {
        assert_eq!(
            parse_expression("-2^2").unwrap(),
            ExpressionNode::unary_op(
                UnaryOperator::Minus,
                bin(BinaryOperator::Power, num(2.0), num(2.0))
            )
        );
        assert_eq!(
            parse_expression("2^-1").unwrap(),
            bin(
                BinaryOperator::Power,
                num(2.0),
                ExpressionNode::unary_op(UnaryOperator::Minus, num(1.0))
            )
        );
    }

    #[test]
    fn test_comparison_is_loosest() {
        assert_eq!(
            parse_expression("temp > 50 + 10").unwrap(),
            bin(
                BinaryOperator::GreaterThan,
                var("temp"),
                bin(BinaryOperator::Add, num(50.0), num(10.0))
            )
        );
    }

    #[test]
    fn test_unary_plus_is_identity() {
        assert_eq!(parse_expression("+x").unwrap(), var("x"));
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(
            parse_expression("max(a, 0)").unwrap(),
            ExpressionNode::function_call("max", vec![var("a"), num(0.0)])
        );
        assert_eq!(
            parse_expression("f()").unwrap(),
            ExpressionNode::function_call("f", Vec::new())
        );
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert_eq!(
            parse_expression("a b"),
            Err(ParseError::UnexpectedToken {
                token: "b".to_string(),
                position: 2,
            })
        );
    }

    #[test]
    fn test_unclosed_paren() {
        assert_eq!(
            parse_expression("(a + 1"),
            Err(ParseError::UnexpectedEndOfInput { position: 6 })
        );
        assert_eq!(
            parse_expression("min(a 1)"),
            Err(ParseError::ExpectedToken {
                expected: "',' or ')'".to_string(),
                found: "1".to_string(),
                position: 6,
            })
        );
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_NESTING_DEPTH + 1), ")".repeat(MAX_NESTING_DEPTH + 1));
        assert!(matches!(
            parse_expression(&deep),
            Err(ParseError::NestingTooDeep { .. })
        ));

        let ok = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_expression(&ok).unwrap(), num(1.0));
    }

    #[test]
    fn test_flat_chain_depth_is_limited() {
        let chain = |n: usize| vec!["temp"; n].join(" + ");

        // n operands make n - 1 additions on top of one leaf
        assert!(parse_expression(&chain(MAX_NESTING_DEPTH)).is_ok());
        assert!(matches!(
            parse_expression(&chain(MAX_NESTING_DEPTH + 1)),
            Err(ParseError::NestingTooDeep { limit: MAX_NESTING_DEPTH, .. })
        ));
        assert!(matches!(
            parse_expression(&chain(10_000)),
            Err(ParseError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_prefix_and_call_depth_is_limited() {
        let negations = format!("{}x", "-".repeat(MAX_NESTING_DEPTH));
        assert!(matches!(
            parse_expression(&negations),
            Err(ParseError::NestingTooDeep { .. })
        ));

        let calls = format!("{}x{}", "abs(".repeat(MAX_NESTING_DEPTH), ")".repeat(MAX_NESTING_DEPTH));
        assert!(matches!(
            parse_expression(&calls),
            Err(ParseError::NestingTooDeep { .. })
        ));
    }
}
