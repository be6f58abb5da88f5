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

//! Registry mapping function names to implementations

use crate::function::{FunctionError, FunctionResult, FunctionSignature, MathFunction};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Name-indexed collection of formula functions
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, Arc<dyn MathFunction>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function, replacing any previous one with the same name
    pub fn register<F: MathFunction + 'static>(&mut self, function: F) {
        let name = function.name().to_string();
        self.functions.insert(name, Arc::new(function));
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn MathFunction>> {
        self.functions.get(name)
    }

    /// Check if a function is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered function names, sorted
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Signature of a registered function
    pub fn signature(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name).map(|f| f.signature())
    }

    /// Check that `name` exists and accepts `arity` arguments
    pub fn validate_call(&self, name: &str, arity: usize) -> FunctionResult<()> {
        match self.signature(name) {
            Some(signature) => signature.validate_arity(arity),
            None => Err(FunctionError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }

    /// Call a function by name
    pub fn call(&self, name: &str, args: &[f64]) -> FunctionResult<f64> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| FunctionError::UnknownFunction {
                name: name.to_string(),
            })?;
        function.signature().validate_arity(args.len())?;
        function.evaluate(args)
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if no functions are registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.function_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_standard_registry;
    use pretty_assertions::assert_eq;

    struct Double;

    impl MathFunction for Double {
        fn signature(&self) -> &FunctionSignature {
            static SIG: FunctionSignature = FunctionSignature::fixed("double", 1);
            &SIG
        }

        fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
            Ok(args[0] * 2.0)
        }
    }

    #[test]
    fn test_register_custom_function() {
        let mut registry = FunctionRegistry::new();
        assert!(registry.is_empty());

        registry.register(Double);
        assert!(registry.contains("double"));
        assert_eq!(registry.call("double", &[2.5]), Ok(5.0));
    }

    #[test]
    fn test_unknown_function() {
        let registry = create_standard_registry();
        assert_eq!(
            registry.call("nope", &[1.0]),
            Err(FunctionError::UnknownFunction {
                name: "nope".to_string()
            })
        );
        assert!(registry.validate_call("nope", 1).is_err());
    }

    #[test]
    fn test_arity_checked_before_evaluation() {
        let registry = create_standard_registry();
        assert!(matches!(
            registry.call("pow", &[2.0]),
            Err(FunctionError::InvalidArity { actual: 1, .. })
        ));
        assert!(registry.validate_call("max", 5).is_ok());
    }

    #[test]
    fn test_standard_names() {
        let registry = create_standard_registry();
        assert_eq!(
            registry.function_names(),
            vec!["abs", "ceil", "clamp", "exp", "floor", "log", "log10", "max", "min", "pow", "sqrt"]
        );
    }
}
