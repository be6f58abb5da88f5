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

//! Function registry for power-model formulas
//!
//! Every function a formula may call is registered here by name together
//! with its arity bounds, so that unknown names and wrong argument counts
//! are caught when a formula is parsed rather than when it is evaluated.

#![warn(missing_docs)]

pub mod function;
pub mod functions;
pub mod registry;

pub use function::{FunctionError, FunctionResult, FunctionSignature, MathFunction};
pub use registry::FunctionRegistry;

/// Create a registry holding every built-in function
pub fn create_standard_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    functions::register_builtin_functions(&mut registry);
    registry
}
