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

//! Expression-driven power models with thermal feedback
//!
//! A power model answers "how much dynamic or static power does this
//! component draw in state X" by evaluating user-supplied formulas over
//! simulation statistics, the current temperature and the operating point
//! of the component's clock domain.
//!
//! ```no_run
//! use power_model::prelude::*;
//! use simstats::StatsRegistry;
//! use std::sync::Arc;
//!
//! # fn main() -> PowerResult<()> {
//! let stats = Arc::new(StatsRegistry::new());
//! stats.finalize();
//!
//! let params = PowerModelParams::new("system.cpu.power_model").with_state(
//!     PowerStateSlot::Base,
//!     LeafPowerParams::new("system.cpu.power_model.pm0")
//!         .with_formula(PowerStateSlot::Base, PowerKind::Static, "0.01 * temp"),
//! );
//! let model = PowerModelBuilder::new(params).build(&stats)?;
//! let _watts = model.get_power(PowerStateSlot::Base, PowerKind::Static)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod aggregator;
pub mod builder;
pub mod clocked;
pub mod config;
pub mod error;
pub mod getters;
pub mod leaf;
pub mod outcome;
pub mod probe;
pub mod report;
pub mod slot;

pub use aggregator::{BindState, PowerAggregator};
pub use builder::PowerModelBuilder;
pub use clocked::{ClockDomain, ClockedObject};
pub use config::{LeafPowerParams, PowerModelParams, SlotFormulas, StateParams};
pub use error::{PowerModelError, PowerResult};
pub use getters::{NamedPowerGetters, PowerModelState};
pub use leaf::{DEFAULT_TEMPERATURE, LeafPowerEvaluator, SlotExpressions, is_automatic_variable};
pub use outcome::PowerOutcome;
pub use probe::{ProbeListener, ProbeManager, ProbePoint, THERMAL_UPDATE, ThermalProbeListener};
pub use report::{PowerSample, PowerStatsReporter, ReportScope};
pub use slot::{PowerKind, PowerModelType, PowerStateSlot};

/// Commonly used types
pub mod prelude {
    pub use crate::{
        ClockDomain, ClockedObject, LeafPowerEvaluator, LeafPowerParams, NamedPowerGetters,
        PowerAggregator, PowerKind, PowerModelBuilder, PowerModelError, PowerModelParams,
        PowerModelState, PowerModelType, PowerOutcome, PowerResult, PowerStateSlot,
    };
}
