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

use thiserror::Error;

/// Result type for registry operations
pub type StatsResult<T> = Result<T, StatsError>;

/// Errors raised while registering statistics
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// A statistic with this name already exists
    #[error("Statistic '{name}' is already registered")]
    DuplicateStat {
        /// Statistic name
        name: String,
    },

    /// Registration attempted after finalize()
    #[error("Cannot register '{name}': statistics registry is finalized")]
    RegistryFinalized {
        /// Statistic name
        name: String,
    },

    /// Empty or malformed statistic name
    #[error("Invalid statistic name '{name}'")]
    InvalidName {
        /// Statistic name
        name: String,
    },
}
