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

//! Result of a tolerant power query

use crate::error::{PowerModelError, PowerResult};

/// Value of a tolerant evaluation together with its outcome
///
/// A failed evaluation carries the value `0.0` and the error that caused
/// it; consumers should treat that zero as "no valid sample" rather than as
/// a measured zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerOutcome {
    value: f64,
    error: Option<PowerModelError>,
}

impl PowerOutcome {
    /// Successful evaluation
    pub fn ok(value: f64) -> Self {
        Self { value, error: None }
    }

    /// Failed evaluation, reported as zero
    pub fn failed(error: PowerModelError) -> Self {
        Self {
            value: 0.0,
            error: Some(error),
        }
    }

    /// Power in watts (`0.0` on failure)
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Check if the evaluation failed
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// The failure cause, if any
    pub fn error(&self) -> Option<&PowerModelError> {
        self.error.as_ref()
    }

    /// `(value, failed)` pair
    pub fn as_tuple(&self) -> (f64, bool) {
        (self.value, self.is_failed())
    }

    /// Convert back into a strict result
    pub fn into_result(self) -> PowerResult<f64> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }
}

impl From<PowerResult<f64>> for PowerOutcome {
    fn from(result: PowerResult<f64>) -> Self {
        match result {
            Ok(value) => PowerOutcome::ok(value),
            Err(error) => PowerOutcome::failed(error),
        }
    }
}

impl From<PowerOutcome> for (f64, bool) {
    fn from(outcome: PowerOutcome) -> Self {
        outcome.as_tuple()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_outcome_is_zero() {
        let outcome = PowerOutcome::failed(PowerModelError::Config("x".to_string()));
        assert_eq!(outcome.as_tuple(), (0.0, true));
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn test_from_result() {
        let outcome: PowerOutcome = Ok(1.5).into();
        let pair: (f64, bool) = outcome.into();
        assert_eq!(pair, (1.5, false));
    }
}
