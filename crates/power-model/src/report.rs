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

//! Statistics export of power model values
//!
//! Every model exposes twenty energy statistics, one per slot and kind,
//! named `<component>.dynamic_energy`, `<component>.static_energy_gc`,
//! `<component>.dynamic_energy_3` and so on. Sampling uses the tolerant
//! query path so a single failing formula cannot abort a statistics dump.

use crate::getters::PowerModelState;
use crate::slot::{PowerKind, PowerStateSlot};
use serde::Serialize;

/// What a reported value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    /// A single leaf evaluator
    Object,
    /// A power state of an aggregated model
    PowerState,
}

impl ReportScope {
    fn subject(self) -> &'static str {
        match self {
            ReportScope::Object => "for this object (J)",
            ReportScope::PowerState => "for this power state",
        }
    }
}

/// One exported value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerSample {
    /// Full statistic name
    pub name: String,
    /// Human readable description
    pub desc: String,
    /// Sampled value, `0.0` when evaluation failed
    pub value: f64,
    /// Whether the value came from a successful evaluation
    pub valid: bool,
}

/// Statistic name of one slot and kind of `component`
pub fn stat_name(component: &str, slot: PowerStateSlot, kind: PowerKind) -> String {
    format!("{}.{}_energy{}", component, kind.as_str(), slot.stat_suffix())
}

fn stat_desc(scope: ReportScope, slot: PowerStateSlot, kind: PowerKind) -> String {
    let kind = match kind {
        PowerKind::Dynamic => "Dynamic",
        PowerKind::Static => "Static",
    };
    match slot {
        PowerStateSlot::Base => format!("{} energy {}", kind, scope.subject()),
        PowerStateSlot::Gc => format!("{} energy during gc {}", kind, scope.subject()),
        stage => format!(
            "{} energy during stage {} {}",
            kind,
            stage.stage_number().unwrap_or_default(),
            scope.subject()
        ),
    }
}

/// Samples the twenty energy statistics of a model
#[derive(Debug, Clone)]
pub struct PowerStatsReporter {
    component: String,
    scope: ReportScope,
}

impl PowerStatsReporter {
    /// Reporter for `component` in `scope`
    pub fn new(component: impl Into<String>, scope: ReportScope) -> Self {
        Self {
            component: component.into(),
            scope,
        }
    }

    /// Reporter named after a model
    pub fn for_model(model: &dyn PowerModelState, scope: ReportScope) -> Self {
        Self::new(model.name(), scope)
    }

    /// Statistic names in reporting order
    pub fn names(&self) -> Vec<String> {
        PowerKind::ALL
            .into_iter()
            .flat_map(|kind| {
                PowerStateSlot::ALL
                    .into_iter()
                    .map(move |slot| stat_name(&self.component, slot, kind))
            })
            .collect()
    }

    /// Sample every statistic of `model`
    pub fn sample(&self, model: &dyn PowerModelState) -> Vec<PowerSample> {
        let mut samples = Vec::with_capacity(PowerStateSlot::COUNT * PowerKind::ALL.len());
        for kind in PowerKind::ALL {
            for slot in PowerStateSlot::ALL {
                let outcome = model.power_tolerant(slot, kind);
                if let Some(error) = outcome.error() {
                    let name = stat_name(&self.component, slot, kind);
                    match error.to_diagnostic() {
                        Some(diagnostic) => log::warn!("{}: {}", name, diagnostic.into_warning()),
                        None => log::warn!("{}: {}", name, error),
                    }
                }
                samples.push(PowerSample {
                    name: stat_name(&self.component, slot, kind),
                    desc: stat_desc(self.scope, slot, kind),
                    value: outcome.value(),
                    valid: !outcome.is_failed(),
                });
            }
        }
        samples
    }

    /// Sample as a JSON array
    pub fn to_json(&self, model: &dyn PowerModelState) -> serde_json::Value {
        serde_json::json!(self.sample(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stat_names() {
        assert_eq!(
            stat_name("system.cpu", PowerStateSlot::Base, PowerKind::Dynamic),
            "system.cpu.dynamic_energy"
        );
        assert_eq!(
            stat_name("system.cpu", PowerStateSlot::Gc, PowerKind::Static),
            "system.cpu.static_energy_gc"
        );
        assert_eq!(
            stat_name("system.cpu", PowerStateSlot::Stage3, PowerKind::Dynamic),
            "system.cpu.dynamic_energy_3"
        );
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(
            stat_desc(ReportScope::Object, PowerStateSlot::Base, PowerKind::Dynamic),
            "Dynamic energy for this object (J)"
        );
        assert_eq!(
            stat_desc(ReportScope::Object, PowerStateSlot::Stage6, PowerKind::Static),
            "Static energy during stage 6 for this object (J)"
        );
        assert_eq!(
            stat_desc(ReportScope::PowerState, PowerStateSlot::Gc, PowerKind::Dynamic),
            "Dynamic energy during gc for this power state"
        );
    }

    #[test]
    fn test_names_cover_every_slot_and_kind() {
        let names = PowerStatsReporter::new("pm", ReportScope::Object).names();
        assert_eq!(names.len(), 20);
        assert_eq!(names[0], "pm.dynamic_energy");
        assert_eq!(names[10], "pm.static_energy");
        assert_eq!(names[19], "pm.static_energy_7");
    }
}
