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

//! Expression-driven leaf power model
//!
//! A [`LeafPowerEvaluator`] holds one dynamic and one static formula for
//! each of the ten power state slots. Free variables in those formulas are
//! resolved, in order, against:
//!
//! 1. automatic variables: `temp`, and `voltage` / `clock_period` when a
//!    clocked object is attached,
//! 2. configured constants,
//! 3. statistics bound once at [`startup`](LeafPowerEvaluator::startup).
//!
//! Statistic names are first qualified with the component basename (the
//! evaluator name minus its last two components) and fall back to the bare
//! name.

use crate::clocked::ClockedObject;
use crate::error::{PowerModelError, PowerResult};
use crate::outcome::PowerOutcome;
use crate::slot::{PowerKind, PowerStateSlot};
use mathexpr_evaluator::{EvaluationError, Expression, MathExprEngine, VariableResolver};
use rustc_hash::FxHashMap;
use simstats::{StatHandle, StatsRegistry};
use std::fmt;
use std::sync::Arc;

/// Temperature in Celsius before the first thermal update
pub const DEFAULT_TEMPERATURE: f64 = 25.0;

const TEMP: &str = "temp";
const VOLTAGE: &str = "voltage";
const CLOCK_PERIOD: &str = "clock_period";

/// Check if `name` is supplied by the evaluator itself rather than a statistic
pub fn is_automatic_variable(name: &str) -> bool {
    matches!(name, TEMP | VOLTAGE | CLOCK_PERIOD)
}

/// Dynamic and static formula of one slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotExpressions {
    /// Dynamic power formula
    pub dynamic: Expression,
    /// Static power formula
    pub static_power: Expression,
}

impl SlotExpressions {
    /// Formula for `kind`
    pub fn get(&self, kind: PowerKind) -> &Expression {
        match kind {
            PowerKind::Dynamic => &self.dynamic,
            PowerKind::Static => &self.static_power,
        }
    }

    fn get_mut(&mut self, kind: PowerKind) -> &mut Expression {
        match kind {
            PowerKind::Dynamic => &mut self.dynamic,
            PowerKind::Static => &mut self.static_power,
        }
    }
}

/// Statistic handles bound at startup; never modified afterwards
struct StatBindings {
    registry: Arc<StatsRegistry>,
    handles: FxHashMap<String, StatHandle>,
}

/// Power model evaluating one formula per slot and kind
pub struct LeafPowerEvaluator {
    name: String,
    basename: String,
    expressions: [SlotExpressions; PowerStateSlot::COUNT],
    constants: FxHashMap<String, f64>,
    bindings: Option<StatBindings>,
    temperature: f64,
    clocked_object: Option<Arc<dyn ClockedObject>>,
    engine: MathExprEngine,
}

/// Qualifying prefix for statistic names: `system.cpu.power_model.pm0` -> `system.cpu.`
fn component_basename(name: &str) -> String {
    name.rsplitn(3, '.')
        .nth(2)
        .map(|base| format!("{base}."))
        .unwrap_or_default()
}

impl LeafPowerEvaluator {
    /// Create an evaluator whose formulas are all empty
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            basename: component_basename(&name),
            name,
            expressions: Default::default(),
            constants: FxHashMap::default(),
            bindings: None,
            temperature: DEFAULT_TEMPERATURE,
            clocked_object: None,
            engine: MathExprEngine::new(),
        }
    }

    /// Set the formula for one slot and kind
    pub fn with_expression(mut self, slot: PowerStateSlot, kind: PowerKind, expr: Expression) -> Self {
        *self.expressions[slot.index()].get_mut(kind) = expr;
        self
    }

    /// Define a named constant
    pub fn with_constant(mut self, name: impl Into<String>, value: f64) -> Self {
        self.constants.insert(name.into(), value);
        self
    }

    /// Use a custom evaluation engine
    pub fn with_engine(mut self, engine: MathExprEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Evaluator name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix used to qualify statistic names
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Formula for `slot` and `kind`
    pub fn expression(&self, slot: PowerStateSlot, kind: PowerKind) -> &Expression {
        self.expressions[slot.index()].get(kind)
    }

    /// Current temperature in Celsius
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Overwrite the live temperature; the value is not validated
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    /// Attach the clocked object supplying `voltage` and `clock_period`
    pub fn set_clocked_object(&mut self, clocked_object: Arc<dyn ClockedObject>) {
        self.clocked_object = Some(clocked_object);
    }

    /// Check if [`startup`](Self::startup) has completed
    pub fn is_started(&self) -> bool {
        self.bindings.is_some()
    }

    /// Names of the statistics bound at startup, sorted
    pub fn bound_statistics(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .bindings
            .iter()
            .flat_map(|b| b.handles.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names
    }

    fn lookup_stat(&self, registry: &StatsRegistry, name: &str) -> Option<StatHandle> {
        registry
            .resolve(&format!("{}{}", self.basename, name))
            .or_else(|| registry.resolve(name))
    }

    /// Bind every statistic referenced by any formula
    ///
    /// Requires a finalized registry. Fails on the first variable that is
    /// neither automatic, a constant, nor a registered statistic. Calling it
    /// again after a successful startup does nothing.
    ///
    /// `temp`, `voltage` and `clock_period` are never looked up here, even
    /// with no clocked object attached yet: the object may be attached
    /// later. A formula using `voltage` with neither a clocked object nor a
    /// `voltage` constant therefore starts fine and fails with
    /// [`UnresolvedVariable`](PowerModelError::UnresolvedVariable) at its
    /// first evaluation.
    pub fn startup(&mut self, registry: &Arc<StatsRegistry>) -> PowerResult<()> {
        if self.is_started() {
            log::debug!("{}: startup already done", self.name);
            return Ok(());
        }
        if !registry.is_finalized() {
            return Err(PowerModelError::RegistryNotFinalized {
                component: self.name.clone(),
            });
        }

        let mut handles = FxHashMap::default();
        for slot_exprs in &self.expressions {
            for kind in PowerKind::ALL {
                let expr = slot_exprs.get(kind);
                for var in expr.variables() {
                    if is_automatic_variable(var)
                        || self.constants.contains_key(var)
                        || handles.contains_key(var)
                    {
                        continue;
                    }
                    let handle = self.lookup_stat(registry, var).ok_or_else(|| {
                        PowerModelError::UnresolvedVariable {
                            variable: var.clone(),
                            component: self.name.clone(),
                            expression: expr.to_string(),
                        }
                    })?;
                    log::debug!("{}: '{}' bound to statistic '{}'", self.name, var, handle.name());
                    handles.insert(var.clone(), handle);
                }
            }
        }

        log::debug!("{}: started with {} bound statistics", self.name, handles.len());
        self.bindings = Some(StatBindings {
            registry: Arc::clone(registry),
            handles,
        });
        Ok(())
    }

    fn variable_value(&self, name: &str) -> Option<f64> {
        match (name, &self.clocked_object) {
            (TEMP, _) => return Some(self.temperature),
            (VOLTAGE, Some(clocked)) => return Some(clocked.voltage()),
            (CLOCK_PERIOD, Some(clocked)) => return Some(clocked.clock_period()),
            _ => {}
        }
        if let Some(value) = self.constants.get(name) {
            return Some(*value);
        }
        self.bindings.as_ref()?.handles.get(name)?.value()
    }

    /// Current value of a variable or statistic by name
    ///
    /// Answers automatic variables, constants and bound statistics; any
    /// other name is looked up in the registry at call time.
    pub fn stat_value(&self, name: &str) -> PowerResult<f64> {
        self.variable_value(name)
            .or_else(|| {
                let bindings = self.bindings.as_ref()?;
                self.lookup_stat(&bindings.registry, name)?.value()
            })
            .ok_or_else(|| PowerModelError::UnresolvedVariable {
                variable: name.to_string(),
                component: self.name.clone(),
                expression: name.to_string(),
            })
    }

    fn evaluation_error(&self, expr: &Expression, error: EvaluationError) -> PowerModelError {
        match error {
            EvaluationError::UnresolvedVariable { name } => PowerModelError::UnresolvedVariable {
                variable: name,
                component: self.name.clone(),
                expression: expr.to_string(),
            },
            source => PowerModelError::Evaluation {
                component: self.name.clone(),
                expression: expr.to_string(),
                source,
            },
        }
    }

    /// Evaluate one formula; any failure is returned as an error
    ///
    /// Empty formulas yield `0.0` without consulting any variable.
    pub fn evaluate_strict(&self, slot: PowerStateSlot, kind: PowerKind) -> PowerResult<f64> {
        let expr = self.expression(slot, kind);
        if expr.is_empty() {
            return Ok(0.0);
        }
        if !self.is_started() {
            return Err(PowerModelError::EvaluatorNotStarted {
                slot,
                component: self.name.clone(),
            });
        }

        self.engine
            .evaluate(expr, &LeafScope(self))
            .map_err(|error| self.evaluation_error(expr, error))
    }

    /// Evaluate one formula, reporting failure as `(0.0, failed)`
    pub fn evaluate_tolerant(&self, slot: PowerStateSlot, kind: PowerKind) -> PowerOutcome {
        let outcome = PowerOutcome::from(self.evaluate_strict(slot, kind));
        if let Some(error) = outcome.error() {
            log::debug!("{}: {} {} power unavailable: {}", self.name, slot, kind, error);
        }
        outcome
    }
}

/// Resolver view of an evaluator during one evaluation
struct LeafScope<'a>(&'a LeafPowerEvaluator);

impl VariableResolver for LeafScope<'_> {
    fn resolve(&self, name: &str) -> Option<f64> {
        self.0.variable_value(name)
    }
}

impl fmt::Debug for LeafPowerEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafPowerEvaluator")
            .field("name", &self.name)
            .field("started", &self.is_started())
            .field("temperature", &self.temperature)
            .field("constants", &self.constants)
            .finish_non_exhaustive()
    }
}
