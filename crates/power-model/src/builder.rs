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

//! Construction of bound power models from parameters

use crate::aggregator::PowerAggregator;
use crate::clocked::ClockedObject;
use crate::config::{LeafPowerParams, PowerModelParams};
use crate::error::{PowerModelError, PowerResult};
use crate::leaf::LeafPowerEvaluator;
use crate::slot::{PowerKind, PowerStateSlot};
use mathexpr_evaluator::{Expression, MathExprEngine, standard_registry};
use mathexpr_registry::FunctionRegistry;
use parking_lot::Mutex;
use simstats::StatsRegistry;
use std::sync::Arc;

impl LeafPowerEvaluator {
    /// Parse every formula of `params` against the built-in functions
    pub fn from_params(params: &LeafPowerParams) -> PowerResult<Self> {
        Self::from_params_with_functions(params, &standard_registry())
    }

    /// Parse every formula of `params`, resolving calls through `functions`
    ///
    /// The first formula that fails to parse is reported with its slot and
    /// kind, e.g. `stage_3.dynamic`.
    pub fn from_params_with_functions(
        params: &LeafPowerParams,
        functions: &Arc<FunctionRegistry>,
    ) -> PowerResult<Self> {
        let mut evaluator = LeafPowerEvaluator::new(params.name.as_str())
            .with_engine(MathExprEngine::with_registry(Arc::clone(functions)));

        for slot in PowerStateSlot::ALL {
            for kind in PowerKind::ALL {
                let formula = params.formula(slot, kind);
                let expr = Expression::parse_with_registry(formula, functions).map_err(
                    |source| PowerModelError::Parse {
                        component: params.name.clone(),
                        field: format!("{}.{}", slot, kind),
                        formula: formula.to_string(),
                        source,
                    },
                )?;
                evaluator = evaluator.with_expression(slot, kind, expr);
            }
        }
        for (name, value) in &params.constants {
            evaluator = evaluator.with_constant(name.as_str(), *value);
        }
        Ok(evaluator)
    }
}

/// Builds a bound [`PowerAggregator`] from [`PowerModelParams`]
pub struct PowerModelBuilder {
    params: PowerModelParams,
    functions: Arc<FunctionRegistry>,
    clocked_object: Option<Arc<dyn ClockedObject>>,
}

impl PowerModelBuilder {
    /// Builder using the built-in functions
    pub fn new(params: PowerModelParams) -> Self {
        Self {
            params,
            functions: standard_registry(),
            clocked_object: None,
        }
    }

    /// Builder from JSON parameters
    pub fn from_json(json: &str) -> PowerResult<Self> {
        Ok(Self::new(PowerModelParams::from_json(json)?))
    }

    /// Resolve formula calls through a custom function registry
    pub fn with_functions(mut self, functions: Arc<FunctionRegistry>) -> Self {
        self.functions = functions;
        self
    }

    /// Supply `voltage` and `clock_period` from `clocked_object`
    pub fn with_clocked_object(mut self, clocked_object: Arc<dyn ClockedObject>) -> Self {
        self.clocked_object = Some(clocked_object);
        self
    }

    /// Parse, start and register every state, then bind
    ///
    /// `stats` must be finalized.
    pub fn build(&self, stats: &Arc<StatsRegistry>) -> PowerResult<PowerAggregator> {
        let params = &self.params;
        let mut model = PowerAggregator::new(params.name.as_str())
            .with_model_type(params.pm_type)
            .with_ambient_temperature(params.ambient_temp);
        if let Some(clocked) = &self.clocked_object {
            model.set_clocked_object(Arc::clone(clocked));
        }

        for state in &params.states {
            let mut evaluator =
                LeafPowerEvaluator::from_params_with_functions(&state.model, &self.functions)?;
            evaluator.startup(stats)?;
            model.register_state(state.slot, evaluator)?;
        }
        model.bind()?;
        Ok(model)
    }

    /// [`build`](Self::build) into a shareable handle for probe listeners
    pub fn build_shared(&self, stats: &Arc<StatsRegistry>) -> PowerResult<Arc<Mutex<PowerAggregator>>> {
        Ok(Arc::new(Mutex::new(self.build(stats)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_field() {
        let params = LeafPowerParams::new("pm0").with_formula(
            PowerStateSlot::Stage3,
            PowerKind::Dynamic,
            "1 + * 2",
        );
        let error = LeafPowerEvaluator::from_params(&params).unwrap_err();
        match &error {
            PowerModelError::Parse { field, formula, .. } => {
                assert_eq!(field, "stage_3.dynamic");
                assert_eq!(formula, "1 + * 2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(error.to_diagnostic().is_some());
    }

    #[test]
    fn test_overlong_formula_rejected() {
        let formula = vec!["temp"; 1000].join(" + ");
        let params =
            LeafPowerParams::new("pm0").with_formula(PowerStateSlot::Base, PowerKind::Dynamic, formula);
        let error = LeafPowerEvaluator::from_params(&params).unwrap_err();
        let diagnostic = error.to_diagnostic().unwrap();
        assert_eq!(diagnostic.code, mathexpr_diagnostics::DiagnosticCode::NestingTooDeep);
        assert_eq!(diagnostic.context.as_deref(), Some("pm0 base.dynamic"));
    }

    #[test]
    fn test_unknown_function_rejected() {
        let params = LeafPowerParams::new("pm0").with_formula(
            PowerStateSlot::Base,
            PowerKind::Static,
            "leakage(temp)",
        );
        assert!(matches!(
            LeafPowerEvaluator::from_params(&params),
            Err(PowerModelError::Parse { .. })
        ));
    }

    #[test]
    fn test_build_requires_finalized_stats() {
        let stats = Arc::new(StatsRegistry::new());
        let params = PowerModelParams::new("pm").with_state(
            PowerStateSlot::Base,
            LeafPowerParams::new("pm.leaf").with_formula(PowerStateSlot::Base, PowerKind::Dynamic, "1"),
        );
        let error = PowerModelBuilder::new(params).build(&stats).unwrap_err();
        assert!(matches!(error, PowerModelError::RegistryNotFinalized { .. }));
    }
}
