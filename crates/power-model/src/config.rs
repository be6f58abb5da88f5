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

//! Serializable power model parameters

use crate::error::PowerResult;
use crate::leaf::DEFAULT_TEMPERATURE;
use crate::slot::{PowerKind, PowerModelType, PowerStateSlot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Formula text of one slot; missing entries are empty formulas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFormulas {
    /// Dynamic power formula
    #[serde(default)]
    pub dynamic: String,
    /// Static power formula
    #[serde(default, rename = "static")]
    pub static_power: String,
}

impl SlotFormulas {
    /// Formula text for `kind`
    pub fn get(&self, kind: PowerKind) -> &str {
        match kind {
            PowerKind::Dynamic => &self.dynamic,
            PowerKind::Static => &self.static_power,
        }
    }
}

/// Parameters of one leaf evaluator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeafPowerParams {
    /// Evaluator name, e.g. `system.cpu.power_model.pm0`
    pub name: String,
    /// Formulas keyed by slot
    #[serde(default)]
    pub expressions: BTreeMap<PowerStateSlot, SlotFormulas>,
    /// Named constants usable in every formula
    #[serde(default)]
    pub constants: BTreeMap<String, f64>,
}

impl LeafPowerParams {
    /// Parameters without formulas
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set one formula
    pub fn with_formula(
        mut self,
        slot: PowerStateSlot,
        kind: PowerKind,
        formula: impl Into<String>,
    ) -> Self {
        let entry = self.expressions.entry(slot).or_default();
        match kind {
            PowerKind::Dynamic => entry.dynamic = formula.into(),
            PowerKind::Static => entry.static_power = formula.into(),
        }
        self
    }

    /// Define a constant
    pub fn with_constant(mut self, name: impl Into<String>, value: f64) -> Self {
        self.constants.insert(name.into(), value);
        self
    }

    /// Formula text for one slot and kind, empty when not configured
    pub fn formula(&self, slot: PowerStateSlot, kind: PowerKind) -> &str {
        self.expressions
            .get(&slot)
            .map(|formulas| formulas.get(kind))
            .unwrap_or_default()
    }
}

/// A leaf evaluator registered for a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateParams {
    /// Slot the evaluator serves
    pub slot: PowerStateSlot,
    /// The evaluator
    pub model: LeafPowerParams,
}

fn default_ambient_temp() -> f64 {
    DEFAULT_TEMPERATURE
}

/// Parameters of a complete power model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerModelParams {
    /// Component name
    pub name: String,
    /// Which kinds of power are reported
    #[serde(default)]
    pub pm_type: PowerModelType,
    /// Temperature until the first thermal update
    #[serde(default = "default_ambient_temp")]
    pub ambient_temp: f64,
    /// Registered states
    #[serde(default)]
    pub states: Vec<StateParams>,
}

impl Default for PowerModelParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            pm_type: PowerModelType::All,
            ambient_temp: DEFAULT_TEMPERATURE,
            states: Vec::new(),
        }
    }
}

impl PowerModelParams {
    /// Parameters without states
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> PowerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> PowerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restrict reported kinds
    pub fn with_type(mut self, pm_type: PowerModelType) -> Self {
        self.pm_type = pm_type;
        self
    }

    /// Set the ambient temperature
    pub fn with_ambient_temp(mut self, ambient_temp: f64) -> Self {
        self.ambient_temp = ambient_temp;
        self
    }

    /// Add a state
    pub fn with_state(mut self, slot: PowerStateSlot, model: LeafPowerParams) -> Self {
        self.states.push(StateParams { slot, model });
        self
    }
}
