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

//! Per-component power model composed of leaf evaluators
//!
//! A [`PowerAggregator`] owns at most one [`LeafPowerEvaluator`] per power
//! state slot. It starts out unbound: states are registered, then
//! [`bind`](PowerAggregator::bind) closes the set. Queries and thermal
//! updates are only accepted once bound.

use crate::clocked::ClockedObject;
use crate::error::{PowerModelError, PowerResult};
use crate::getters::PowerModelState;
use crate::leaf::{DEFAULT_TEMPERATURE, LeafPowerEvaluator};
use crate::outcome::PowerOutcome;
use crate::slot::{PowerKind, PowerModelType, PowerStateSlot};
use mathexpr_evaluator::EvaluationError;
use std::fmt;
use std::sync::Arc;

/// Lifecycle of an aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindState {
    /// Accepting state registrations
    Unbound,
    /// Registration closed; queries allowed
    Bound,
}

/// Power model facade for one simulated component
pub struct PowerAggregator {
    name: String,
    model_type: PowerModelType,
    states: [Option<LeafPowerEvaluator>; PowerStateSlot::COUNT],
    state: BindState,
    temperature: f64,
    clocked_object: Option<Arc<dyn ClockedObject>>,
}

impl PowerAggregator {
    /// Create an unbound aggregator reporting both kinds at the default ambient temperature
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_type: PowerModelType::All,
            states: Default::default(),
            state: BindState::Unbound,
            temperature: DEFAULT_TEMPERATURE,
            clocked_object: None,
        }
    }

    /// Restrict which kinds of power are reported
    pub fn with_model_type(mut self, model_type: PowerModelType) -> Self {
        self.model_type = model_type;
        self
    }

    /// Temperature applied to states until the first thermal update
    pub fn with_ambient_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Component name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Which kinds of power are reported
    pub fn model_type(&self) -> PowerModelType {
        self.model_type
    }

    /// Lifecycle state
    pub fn bind_state(&self) -> BindState {
        self.state
    }

    /// Check if the aggregator is bound
    pub fn is_bound(&self) -> bool {
        self.state == BindState::Bound
    }

    /// Last temperature applied to the states
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Evaluator registered for `slot`
    pub fn state(&self, slot: PowerStateSlot) -> Option<&LeafPowerEvaluator> {
        self.states[slot.index()].as_ref()
    }

    /// Slots with a registered evaluator
    pub fn registered_slots(&self) -> Vec<PowerStateSlot> {
        PowerStateSlot::ALL
            .into_iter()
            .filter(|slot| self.states[slot.index()].is_some())
            .collect()
    }

    /// Register the evaluator for one power state
    ///
    /// The evaluator must already be started. It inherits the aggregator's
    /// current temperature and clocked object.
    pub fn register_state(
        &mut self,
        slot: PowerStateSlot,
        mut evaluator: LeafPowerEvaluator,
    ) -> PowerResult<()> {
        if self.is_bound() {
            return Err(PowerModelError::AlreadyBound {
                component: self.name.clone(),
            });
        }
        if self.states[slot.index()].is_some() {
            return Err(PowerModelError::DuplicateRegistration {
                slot,
                component: self.name.clone(),
            });
        }
        if !evaluator.is_started() {
            return Err(PowerModelError::EvaluatorNotStarted {
                slot,
                component: evaluator.name().to_string(),
            });
        }

        evaluator.set_temperature(self.temperature);
        if let Some(clocked) = &self.clocked_object {
            evaluator.set_clocked_object(Arc::clone(clocked));
        }
        log::debug!("{}: registered {} for state {}", self.name, evaluator.name(), slot);
        self.states[slot.index()] = Some(evaluator);
        Ok(())
    }

    /// Close registration; the Unbound -> Bound transition happens once
    pub fn bind(&mut self) -> PowerResult<()> {
        if self.is_bound() {
            return Err(PowerModelError::AlreadyBound {
                component: self.name.clone(),
            });
        }
        self.state = BindState::Bound;
        log::debug!(
            "{}: bound with {} power states",
            self.name,
            self.registered_slots().len()
        );
        Ok(())
    }

    fn require_bound(&self, operation: &'static str) -> PowerResult<()> {
        if self.is_bound() {
            Ok(())
        } else {
            Err(PowerModelError::UseBeforeBound {
                component: self.name.clone(),
                operation,
            })
        }
    }

    /// Attach the clocked object to this model and every registered state
    pub fn set_clocked_object(&mut self, clocked_object: Arc<dyn ClockedObject>) {
        for evaluator in self.states.iter_mut().flatten() {
            evaluator.set_clocked_object(Arc::clone(&clocked_object));
        }
        self.clocked_object = Some(clocked_object);
    }

    /// Power of `slot` from the evaluator registered for it
    ///
    /// Unregistered slots and filtered-out kinds yield `0.0`.
    pub fn get_power(&self, slot: PowerStateSlot, kind: PowerKind) -> PowerResult<f64> {
        self.require_bound("get_power")?;
        if !self.model_type.includes(kind) {
            return Ok(0.0);
        }
        match self.state(slot) {
            Some(evaluator) => evaluator.evaluate_strict(slot, kind),
            None => Ok(0.0),
        }
    }

    /// Tolerant variant of [`get_power`](Self::get_power)
    pub fn get_power_tolerant(&self, slot: PowerStateSlot, kind: PowerKind) -> PowerOutcome {
        if let Err(error) = self.require_bound("get_power_tolerant") {
            return PowerOutcome::failed(error);
        }
        if !self.model_type.includes(kind) {
            return PowerOutcome::ok(0.0);
        }
        match self.state(slot) {
            Some(evaluator) => evaluator.evaluate_tolerant(slot, kind),
            None => PowerOutcome::ok(0.0),
        }
    }

    /// Sum of `weights[slot] * power(slot, kind)` over registered slots
    ///
    /// Typically the weights are the fraction of time spent in each state.
    /// Non-positive weights are skipped without evaluating their formula.
    /// A sum that overflows is reported as a non-finite evaluation error.
    pub fn weighted_power(
        &self,
        kind: PowerKind,
        weights: &[f64; PowerStateSlot::COUNT],
    ) -> PowerResult<f64> {
        self.require_bound("weighted_power")?;
        let mut total = 0.0;
        for slot in PowerStateSlot::ALL {
            let weight = weights[slot.index()];
            if weight > 0.0 {
                total += weight * self.get_power(slot, kind)?;
            }
        }
        if !total.is_finite() {
            let expression = format!("weighted {} power", kind);
            return Err(PowerModelError::Evaluation {
                component: self.name.clone(),
                source: EvaluationError::NonFinite {
                    expression: expression.clone(),
                    value: total,
                },
                expression,
            });
        }
        Ok(total)
    }

    /// Broadcast a temperature sample to every registered state
    pub fn on_temperature_update(&mut self, temperature: f64) -> PowerResult<()> {
        self.require_bound("on_temperature_update")?;
        self.temperature = temperature;
        for evaluator in self.states.iter_mut().flatten() {
            evaluator.set_temperature(temperature);
        }
        log::trace!("{}: temperature now {} C", self.name, temperature);
        Ok(())
    }
}

impl fmt::Debug for PowerAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PowerAggregator")
            .field("name", &self.name)
            .field("model_type", &self.model_type)
            .field("state", &self.state)
            .field("temperature", &self.temperature)
            .field("states", &self.registered_slots())
            .finish_non_exhaustive()
    }
}

impl PowerModelState for PowerAggregator {
    fn name(&self) -> &str {
        &self.name
    }

    fn power(&self, slot: PowerStateSlot, kind: PowerKind) -> PowerResult<f64> {
        self.get_power(slot, kind)
    }

    fn power_tolerant(&self, slot: PowerStateSlot, kind: PowerKind) -> PowerOutcome {
        self.get_power_tolerant(slot, kind)
    }

    fn set_temperature(&mut self, temperature: f64) -> PowerResult<()> {
        self.on_temperature_update(temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clocked::ClockDomain;
    use mathexpr_evaluator::Expression;
    use simstats::StatsRegistry;

    fn started(name: &str, slot: PowerStateSlot, dynamic: &str, static_power: &str) -> LeafPowerEvaluator {
        let mut leaf = LeafPowerEvaluator::new(name)
            .with_expression(slot, PowerKind::Dynamic, Expression::parse(dynamic).unwrap())
            .with_expression(slot, PowerKind::Static, Expression::parse(static_power).unwrap());
        let registry = StatsRegistry::new();
        registry.finalize();
        leaf.startup(&Arc::new(registry)).unwrap();
        leaf
    }

    #[test]
    fn test_unbound_rejects_queries() {
        let mut model = PowerAggregator::new("system.cpu.power_model");
        assert_eq!(model.bind_state(), BindState::Unbound);
        assert!(matches!(
            model.get_power(PowerStateSlot::Base, PowerKind::Dynamic),
            Err(PowerModelError::UseBeforeBound { operation: "get_power", .. })
        ));
        assert!(matches!(
            model.on_temperature_update(50.0),
            Err(PowerModelError::UseBeforeBound { .. })
        ));
        assert!(
            model
                .get_power_tolerant(PowerStateSlot::Base, PowerKind::Dynamic)
                .is_failed()
        );
    }

    #[test]
    fn test_registration_rules() {
        let mut model = PowerAggregator::new("pm");
        model
            .register_state(PowerStateSlot::Base, started("pm0", PowerStateSlot::Base, "1", "2"))
            .unwrap();

        assert_eq!(
            model.register_state(PowerStateSlot::Base, started("pm1", PowerStateSlot::Base, "1", "2")),
            Err(PowerModelError::DuplicateRegistration {
                slot: PowerStateSlot::Base,
                component: "pm".to_string()
            })
        );
        assert!(matches!(
            model.register_state(PowerStateSlot::Gc, LeafPowerEvaluator::new("pm2")),
            Err(PowerModelError::EvaluatorNotStarted { slot: PowerStateSlot::Gc, .. })
        ));

        model.bind().unwrap();
        assert!(matches!(model.bind(), Err(PowerModelError::AlreadyBound { .. })));
        assert!(matches!(
            model.register_state(PowerStateSlot::Gc, started("pm3", PowerStateSlot::Gc, "1", "1")),
            Err(PowerModelError::AlreadyBound { .. })
        ));
    }

    #[test]
    fn test_model_type_filters_kind() {
        let mut model = PowerAggregator::new("pm").with_model_type(PowerModelType::StaticOnly);
        model
            .register_state(PowerStateSlot::Base, started("pm0", PowerStateSlot::Base, "3", "4"))
            .unwrap();
        model.bind().unwrap();

        assert_eq!(model.get_power(PowerStateSlot::Base, PowerKind::Dynamic), Ok(0.0));
        assert_eq!(model.get_power(PowerStateSlot::Base, PowerKind::Static), Ok(4.0));
    }

    #[test]
    fn test_ambient_temperature_seeds_states() {
        let mut model = PowerAggregator::new("pm").with_ambient_temperature(30.0);
        model
            .register_state(PowerStateSlot::Base, started("pm0", PowerStateSlot::Base, "temp", ""))
            .unwrap();
        model.bind().unwrap();

        assert_eq!(model.get_power(PowerStateSlot::Base, PowerKind::Dynamic), Ok(30.0));
        assert_eq!(model.get_power(PowerStateSlot::Base, PowerKind::Static), Ok(0.0));
    }

    #[test]
    fn test_weighted_power() {
        let mut model = PowerAggregator::new("pm");
        model
            .register_state(PowerStateSlot::Base, started("pm0", PowerStateSlot::Base, "10", ""))
            .unwrap();
        model
            .register_state(PowerStateSlot::Stage0, started("pm1", PowerStateSlot::Stage0, "1 / 0", ""))
            .unwrap();
        model
            .register_state(PowerStateSlot::Stage1, started("pm2", PowerStateSlot::Stage1, "4", ""))
            .unwrap();
        model.bind().unwrap();

        let mut weights = [0.0; PowerStateSlot::COUNT];
        weights[PowerStateSlot::Base.index()] = 0.25;
        weights[PowerStateSlot::Stage1.index()] = 0.75;
        assert_eq!(model.weighted_power(PowerKind::Dynamic, &weights), Ok(5.5));

        weights[PowerStateSlot::Stage0.index()] = 0.1;
        assert!(model.weighted_power(PowerKind::Dynamic, &weights).is_err());
    }

    #[test]
    fn test_weighted_power_overflow_is_an_error() {
        let mut model = PowerAggregator::new("pm");
        model
            .register_state(PowerStateSlot::Base, started("pm0", PowerStateSlot::Base, "1e308", ""))
            .unwrap();
        model
            .register_state(PowerStateSlot::Gc, started("pm1", PowerStateSlot::Gc, "1e308", ""))
            .unwrap();
        model.bind().unwrap();

        let weights = [1.0; PowerStateSlot::COUNT];
        assert_eq!(model.get_power(PowerStateSlot::Base, PowerKind::Dynamic), Ok(1e308));
        let error = model.weighted_power(PowerKind::Dynamic, &weights).unwrap_err();
        assert!(matches!(
            &error,
            PowerModelError::Evaluation {
                source: EvaluationError::NonFinite { .. },
                ..
            }
        ));
        assert!(error.is_evaluation_failure());
    }

    #[test]
    fn test_clocked_object_reaches_registered_states() {
        let mut model = PowerAggregator::new("pm");
        model
            .register_state(
                PowerStateSlot::Base,
                started("pm0", PowerStateSlot::Base, "voltage^2 + 0 * clock_period", ""),
            )
            .unwrap();
        model.bind().unwrap();
        assert!(matches!(
            model.get_power(PowerStateSlot::Base, PowerKind::Dynamic),
            Err(PowerModelError::UnresolvedVariable { .. })
        ));

        model.set_clocked_object(Arc::new(ClockDomain::new(2.0, 1.0e9)));
        assert_eq!(model.get_power(PowerStateSlot::Base, PowerKind::Dynamic), Ok(4.0));

        // states registered later inherit it too
        let mut late = PowerAggregator::new("pm_late");
        late.set_clocked_object(Arc::new(ClockDomain::new(3.0, 1.0e9)));
        late.register_state(PowerStateSlot::Gc, started("pm1", PowerStateSlot::Gc, "voltage", ""))
            .unwrap();
        late.bind().unwrap();
        assert_eq!(late.get_power(PowerStateSlot::Gc, PowerKind::Dynamic), Ok(3.0));
    }
}
