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

//! Integration tests for formula parsing

use mathexpr_ast::{ExpressionNode, FunctionCollector};
use mathexpr_parser::{ParseError, parse};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("0.5 * issue_rate * voltage^2", "0.5 * issue_rate * voltage ^ 2")]
#[case("(a+b)*2", "(a + b) * 2")]
#[case("a-(b-c)", "a - (b - c)")]
#[case("-2^2", "-2 ^ 2")]
#[case("(-2)^2", "(-2) ^ 2")]
#[case("max( x ,0.5 )", "max(x, 0.5)")]
#[case("temp>=60", "temp >= 60")]
fn canonical_form(#[case] input: &str, #[case] expected: &str) {
    let expr = parse(input).unwrap();
    assert_eq!(expr.to_string(), expected);
    assert_eq!(parse(expected).unwrap(), expr);
}

#[rstest]
#[case("")]
#[case("1 +")]
#[case("* 2")]
#[case("(1")]
#[case("f(1,")]
#[case("1 # 2")]
#[case("a ) b")]
fn malformed_input_is_rejected(#[case] input: &str) {
    assert!(parse(input).is_err(), "expected '{}' to fail", input);
}

#[test]
fn statistic_names_collected_in_order() {
    let expr = parse("system.cpu.ipc * voltage + system.cpu.ipc / clock_period").unwrap();
    assert_eq!(
        expr.variables(),
        vec!["system.cpu.ipc", "voltage", "clock_period"]
    );
}

#[test]
fn function_arity_is_recorded() {
    let expr = parse("clamp(max(a, b, c), 0, 1)").unwrap();
    assert_eq!(
        FunctionCollector::collect(&expr),
        vec![("clamp".to_string(), 3), ("max".to_string(), 3)]
    );
}

#[test]
fn empty_input_reports_end_of_input() {
    assert_eq!(
        parse("   "),
        Err(ParseError::UnexpectedEndOfInput { position: 3 })
    );
}

#[test]
fn diagnostic_renders_snippet() {
    let source = "voltage * $";
    let error = parse(source).unwrap_err();
    let rendered = error.to_diagnostic_in(source).to_string();

    assert!(rendered.starts_with("error[E001]"), "{}", rendered);
    assert!(rendered.contains("voltage * $"));
    assert!(rendered.contains("          ^"));
}

#[test]
fn literal_forms() {
    assert_eq!(parse(".25").unwrap(), ExpressionNode::number(0.25));
    assert_eq!(parse("1e-3").unwrap(), ExpressionNode::number(0.001));
}
