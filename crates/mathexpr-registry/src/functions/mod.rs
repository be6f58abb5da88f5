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

//! Built-in formula functions

mod exponential;
mod minmax;
mod rounding;

pub use exponential::{ExpFunction, Log10Function, LogFunction, PowFunction, SqrtFunction};
pub use minmax::{MaxFunction, MinFunction};
pub use rounding::{AbsFunction, CeilFunction, ClampFunction, FloorFunction};

use crate::registry::FunctionRegistry;

/// Register all built-in functions
pub fn register_builtin_functions(registry: &mut FunctionRegistry) {
    registry.register(AbsFunction);
    registry.register(CeilFunction);
    registry.register(ClampFunction);
    registry.register(ExpFunction);
    registry.register(FloorFunction);
    registry.register(LogFunction);
    registry.register(Log10Function);
    registry.register(MaxFunction);
    registry.register(MinFunction);
    registry.register(PowFunction);
    registry.register(SqrtFunction);
}
