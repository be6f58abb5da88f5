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

//! Function trait and error types

use thiserror::Error;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Function evaluation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FunctionError {
    /// Invalid number of arguments
    #[error("Function '{name}' expects {expected}, got {actual}")]
    InvalidArity {
        /// Function name
        name: String,
        /// Human readable arity bounds
        expected: String,
        /// Actual number of arguments
        actual: usize,
    },

    /// Argument outside the function's domain
    #[error("Function '{name}' domain error: {message}")]
    Domain {
        /// Function name
        name: String,
        /// Error message
        message: String,
    },

    /// Function not found
    #[error("Unknown function: {name}")]
    UnknownFunction {
        /// Function name
        name: String,
    },
}

/// Name and arity bounds of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Function name
    pub name: &'static str,
    /// Minimum number of arguments
    pub min_arity: usize,
    /// Maximum number of arguments (None = unbounded)
    pub max_arity: Option<usize>,
}

impl FunctionSignature {
    /// Signature with an exact argument count
    pub const fn fixed(name: &'static str, arity: usize) -> Self {
        Self {
            name,
            min_arity: arity,
            max_arity: Some(arity),
        }
    }

    /// Signature taking `min_arity` or more arguments
    pub const fn variadic(name: &'static str, min_arity: usize) -> Self {
        Self {
            name,
            min_arity,
            max_arity: None,
        }
    }

    /// Check if `count` arguments are acceptable
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_arity && self.max_arity.is_none_or(|max| count <= max)
    }

    fn describe(&self) -> String {
        let plural = |n: usize| if n == 1 { "argument" } else { "arguments" };
        match self.max_arity {
            Some(max) if max == self.min_arity => format!("{} {}", max, plural(max)),
            Some(max) => format!("{} to {} arguments", self.min_arity, max),
            None => format!("at least {} {}", self.min_arity, plural(self.min_arity)),
        }
    }

    /// Validate an argument count against this signature
    pub fn validate_arity(&self, count: usize) -> FunctionResult<()> {
        if self.accepts(count) {
            Ok(())
        } else {
            Err(FunctionError::InvalidArity {
                name: self.name.to_string(),
                expected: self.describe(),
                actual: count,
            })
        }
    }
}

/// A pure numeric function callable from a formula
pub trait MathFunction: Send + Sync {
    /// Get the function name
    fn name(&self) -> &str {
        self.signature().name
    }

    /// Get the function signature
    fn signature(&self) -> &FunctionSignature;

    /// Evaluate the function; `args` has already passed arity validation
    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64>;

    /// Domain error helper
    fn domain_error(&self, message: impl Into<String>) -> FunctionError
    where
        Self: Sized,
    {
        FunctionError::Domain {
            name: self.name().to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_description() {
        let err = FunctionSignature::fixed("sqrt", 1)
            .validate_arity(2)
            .unwrap_err();
        assert_eq!(err.to_string(), "Function 'sqrt' expects 1 argument, got 2");

        let err = FunctionSignature::variadic("max", 1)
            .validate_arity(0)
            .unwrap_err();
        assert_eq!(err.to_string(), "Function 'max' expects at least 1 argument, got 0");
    }

    #[test]
    fn test_accepts() {
        let sig = FunctionSignature::variadic("min", 1);
        assert!(!sig.accepts(0));
        assert!(sig.accepts(1));
        assert!(sig.accepts(12));
        assert!(FunctionSignature::fixed("pow", 2).accepts(2));
    }
}
