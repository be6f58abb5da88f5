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

//! Late-bound variable lookup
//!
//! A formula names its inputs but does not own them. At evaluation time the
//! engine asks a [`VariableResolver`] for each free variable; returning
//! `None` makes the evaluation fail with an unresolved-variable error.

use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Source of values for the free variables of a formula
pub trait VariableResolver {
    /// Current value of `name`, or `None` if it is unknown
    fn resolve(&self, name: &str) -> Option<f64>;

    /// Try `self` first, then `fallback`
    fn chain<R: VariableResolver>(self, fallback: R) -> ChainResolver<Self, R>
    where
        Self: Sized,
    {
        ChainResolver {
            primary: self,
            fallback,
        }
    }
}

impl<R: VariableResolver + ?Sized> VariableResolver for &R {
    fn resolve(&self, name: &str) -> Option<f64> {
        (**self).resolve(name)
    }
}

impl<S: BuildHasher> VariableResolver for HashMap<String, f64, S> {
    fn resolve(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl VariableResolver for BTreeMap<String, f64> {
    fn resolve(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl VariableResolver for [(&str, f64)] {
    fn resolve(&self, name: &str) -> Option<f64> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

impl<const N: usize> VariableResolver for [(&str, f64); N] {
    fn resolve(&self, name: &str) -> Option<f64> {
        self.as_slice().resolve(name)
    }
}

/// Resolver that knows no variables
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl VariableResolver for NoVariables {
    fn resolve(&self, _name: &str) -> Option<f64> {
        None
    }
}

/// Two resolvers consulted in order
#[derive(Debug, Clone)]
pub struct ChainResolver<A, B> {
    primary: A,
    fallback: B,
}

impl<A: VariableResolver, B: VariableResolver> VariableResolver for ChainResolver<A, B> {
    fn resolve(&self, name: &str) -> Option<f64> {
        self.primary
            .resolve(name)
            .or_else(|| self.fallback.resolve(name))
    }
}

/// Owned set of named values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableScope {
    variables: FxHashMap<String, f64>,
}

impl VariableScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.variables.insert(name.into(), value)
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// Get a variable
    pub fn get(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    /// Remove a variable
    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.variables.remove(name)
    }

    /// Check if a variable is defined
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Check if the scope is empty
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl VariableResolver for VariableScope {
    fn resolve(&self, name: &str) -> Option<f64> {
        self.get(name)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for VariableScope {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            variables: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_set_and_resolve() {
        let mut scope = VariableScope::new().with("voltage", 1.0);
        assert_eq!(scope.resolve("voltage"), Some(1.0));
        assert_eq!(scope.set("voltage", 0.9), Some(1.0));
        assert_eq!(scope.resolve("voltage"), Some(0.9));
        assert_eq!(scope.remove("voltage"), Some(0.9));
        assert!(scope.is_empty());
    }

    #[test]
    fn test_chain_prefers_primary() {
        let primary: VariableScope = [("temp", 45.0)].into_iter().collect();
        let fallback = [("temp", 99.0), ("k", 2.0)];
        let chain = (&primary).chain(&fallback);

        assert_eq!(chain.resolve("temp"), Some(45.0));
        assert_eq!(chain.resolve("k"), Some(2.0));
        assert_eq!(chain.resolve("missing"), None);
    }

    #[test]
    fn test_no_variables() {
        assert_eq!(NoVariables.resolve("anything"), None);
    }
}
