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

//! Power formula evaluator
//!
//! Walks a parsed formula over `f64`, pulling free variables from a
//! [`VariableResolver`] at evaluation time. Every intermediate result is
//! checked: division by zero, function domain violations and overflow all
//! surface as [`EvaluationError`] values, so a successful evaluation is
//! always a finite number.

#![warn(missing_docs)]

mod engine;
mod error;
mod expression;
mod resolver;

pub use engine::{MathExprEngine, standard_registry};
pub use error::{EvaluationError, EvaluationResult, ExpressionError};
pub use expression::Expression;
pub use resolver::{ChainResolver, NoVariables, VariableResolver, VariableScope};
