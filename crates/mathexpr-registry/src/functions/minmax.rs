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

//! min() and max() over one or more arguments

use crate::function::{FunctionResult, FunctionSignature, MathFunction};

/// min() function - smallest argument
pub struct MinFunction;

impl MathFunction for MinFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIG: FunctionSignature = FunctionSignature::variadic("min", 1);
        &SIG
    }

    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
        Ok(args.iter().copied().fold(f64::INFINITY, f64::min))
    }
}

/// max() function - largest argument
pub struct MaxFunction;

impl MathFunction for MaxFunction {
    fn signature(&self) -> &FunctionSignature {
        static SIG: FunctionSignature = FunctionSignature::variadic("max", 1);
        &SIG
    }

    fn evaluate(&self, args: &[f64]) -> FunctionResult<f64> {
        Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }
}
