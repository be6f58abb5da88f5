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

//! Simulation statistics registry
//!
//! Components register named statistics (scalars, vectors and formulas)
//! during setup. Once setup is over the registry is finalized, after which
//! consumers such as power models resolve statistics by fully-qualified name
//! and read their current values whenever they need them.
//!
//! Resolved handles are weak: removing a statistic from the registry makes
//! every handle to it report "no value" instead of a stale number.

#![warn(missing_docs)]

mod error;
mod registry;
mod stat;

pub use error::{StatsError, StatsResult};
pub use registry::StatsRegistry;
pub use stat::{ScalarStat, StatHandle, StatKind, VectorStat};
