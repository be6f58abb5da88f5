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

//! Sign, rounding and clamping functions

use crate::function::{FunctionResult, FunctionSignature, MathFunction};

/// abs() function - absolute value
pub struct AbsFunction;

impl MathFunction for AbsFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIG: FunctionSignature = FunctionSignature::fixed("abs", 1);
        &SIG
    }

    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
        Ok(args[0].abs())
    }
}

/// floor() function - round toward negative infinity
pub struct FloorFunction;

impl MathFunction for FloorFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIG: FunctionSignature = FunctionSignature::fixed("floor", 1);
        &SIG
    }

    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
        Ok(args[0].floor())
    }
}

/// ceil() function - round toward positive infinity
pub struct CeilFunction;

impl MathFunction for CeilFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIG: FunctionSignature = FunctionSignature::fixed("ceil", 1);
        &SIG
    }

    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
        Ok(args[0].ceil())
    }
}

/// clamp(x, lo, hi) function - restrict x to [lo, hi]
pub struct ClampFunction;

impl MathFunction for ClampFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIG: FunctionSignature = FunctionSignature::fixed("clamp", 3);
        &SIG
    }

    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
        let (x, lo, hi) = (args[0], args[1], args[2]);
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(self.domain_error(format!("lower bound {lo} exceeds upper bound {hi}")));
        }
        Ok(x.clamp(lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding() {
        assert_eq!(FloorFunction.evaluate(&[-1.5]), Ok(-2.0));
        assert_eq!(CeilFunction.evaluate(&[1.2]), Ok(2.0));
        assert_eq!(AbsFunction.evaluate(&[-3.0]), Ok(3.0));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(ClampFunction.evaluate(&[5.0, 0.0, 1.0]), Ok(1.0));
        assert_eq!(ClampFunction.evaluate(&[-5.0, 0.0, 1.0]), Ok(0.0));
        assert!(ClampFunction.evaluate(&[0.5, 1.0, 0.0]).is_err());
    }
}
