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

//! Exponential, logarithmic and root functions

use crate::function::{FunctionResult, FunctionSignature, MathFunction};

/// sqrt() function - square root of a non-negative number
pub struct SqrtFunction;

impl MathFunction for SqrtFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIG: FunctionSignature = FunctionSignature::fixed("sqrt", 1);
        &SIG
    }

    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
        let x = args[0];
        if x < 0.0 {
            return Err(self.domain_error(format!("square root of negative number {x}")));
        }
        Ok(x.sqrt())
    }
}

/// exp() function - e raised to the argument
pub struct ExpFunction;

impl MathFunction for ExpFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIG: FunctionSignature = FunctionSignature::fixed("exp", 1);
        &SIG
    }

    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
        Ok(args[0].exp())
    }
}

/// log() function - natural logarithm
pub struct LogFunction;

impl MathFunction for LogFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIG: FunctionSignature = FunctionSignature::fixed("log", 1);
        &SIG
    }

    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
        let x = args[0];
        if x <= 0.0 {
            return Err(self.domain_error(format!("logarithm of non-positive number {x}")));
        }
        Ok(x.ln())
    }
}

/// log10() function - base-10 logarithm
pub struct Log10Function;

impl MathFunction for Log10Function {
    fn signature(&self) -> &FunctionSignature {
        static SIG: FunctionSignature = FunctionSignature::fixed("log10", 1);
        &SIG
    }

    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
        let x = args[0];
        if x <= 0.0 {
            return Err(self.domain_error(format!("logarithm of non-positive number {x}")));
        }
        Ok(x.log10())
    }
}

/// pow() function - same as the `^` operator
pub struct PowFunction;

impl MathFunction for PowFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIG: FunctionSignature = FunctionSignature::fixed("pow", 2);
        &SIG
    }

    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
        let (base, exponent) = (args[0], args[1]);
        if base < 0.0 && exponent.fract() != 0.0 {
            return Err(self.domain_error(format!(
                "negative base {base} with fractional exponent {exponent}"
            )));
        }
        if base == 0.0 && exponent < 0.0 {
            return Err(self.domain_error("zero raised to a negative power"));
        }
        Ok(base.powf(exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::FunctionError;

    #[test]
    fn test_sqrt_domain() {
        assert_eq!(SqrtFunction.evaluate(&[9.0]), Ok(3.0));
        assert!(matches!(
            SqrtFunction.evaluate(&[-1.0]),
            Err(FunctionError::Domain { .. })
        ));
    }

    #[test]
    fn test_log_domain() {
        assert_eq!(LogFunction.evaluate(&[1.0]), Ok(0.0));
        assert_eq!(Log10Function.evaluate(&[1000.0]), Ok(3.0));
        assert!(LogFunction.evaluate(&[0.0]).is_err());
        assert!(Log10Function.evaluate(&[-5.0]).is_err());
    }

    #[test]
    fn test_pow() {
        assert_eq!(PowFunction.evaluate(&[2.0, 10.0]), Ok(1024.0));
        assert_eq!(PowFunction.evaluate(&[-2.0, 3.0]), Ok(-8.0));
        assert!(PowFunction.evaluate(&[-2.0, 0.5]).is_err());
        assert!(PowFunction.evaluate(&[0.0, -1.0]).is_err());
    }

    #[test]
    fn test_exp() {
        assert_eq!(ExpFunction.evaluate(&[0.0]), Ok(1.0));
    }
}
