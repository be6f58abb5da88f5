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

//! Capability interface and the named getter surface

use crate::error::PowerResult;
use crate::leaf::LeafPowerEvaluator;
use crate::outcome::PowerOutcome;
use crate::slot::{PowerKind, PowerStateSlot};

/// Anything that reports power per slot and follows a temperature signal
pub trait PowerModelState {
    /// Name used for reporting
    fn name(&self) -> &str;

    /// Power in watts; failures are errors
    fn power(&self, slot: PowerStateSlot, kind: PowerKind) -> PowerResult<f64>;

    /// Power in watts; failures degrade to a flagged zero
    fn power_tolerant(&self, slot: PowerStateSlot, kind: PowerKind) -> PowerOutcome {
        self.power(slot, kind).into()
    }

    /// Apply a temperature sample in Celsius
    fn set_temperature(&mut self, temperature: f64) -> PowerResult<()>;
}

impl PowerModelState for LeafPowerEvaluator {
    fn name(&self) -> &str {
        LeafPowerEvaluator::name(self)
    }

    fn power(&self, slot: PowerStateSlot, kind: PowerKind) -> PowerResult<f64> {
        self.evaluate_strict(slot, kind)
    }

    fn power_tolerant(&self, slot: PowerStateSlot, kind: PowerKind) -> PowerOutcome {
        self.evaluate_tolerant(slot, kind)
    }

    fn set_temperature(&mut self, temperature: f64) -> PowerResult<()> {
        LeafPowerEvaluator::set_temperature(self, temperature);
        Ok(())
    }
}

macro_rules! named_getters {
    ($($(#[$doc:meta])* $getter:ident => ($slot:ident, $kind:ident);)*) => {
        /// Fixed-name accessors, one per slot and kind
        ///
        /// Implemented for every [`PowerModelState`].
        pub trait NamedPowerGetters: PowerModelState {
            $(
                $(#[$doc])*
                fn $getter(&self) -> PowerResult<f64> {
                    self.power(PowerStateSlot::$slot, PowerKind::$kind)
                }
            )*
        }
    };
}

named_getters! {
    /// Dynamic power in the base state
    dynamic_power => (Base, Dynamic);
    /// Dynamic power during garbage collection
    dynamic_power_gc => (Gc, Dynamic);
    /// Dynamic power during stage 0
    dynamic_power_0 => (Stage0, Dynamic);
    /// Dynamic power during stage 1
    dynamic_power_1 => (Stage1, Dynamic);
    /// Dynamic power during stage 2
    dynamic_power_2 => (Stage2, Dynamic);
    /// Dynamic power during stage 3
    dynamic_power_3 => (Stage3, Dynamic);
    /// Dynamic power during stage 4
    dynamic_power_4 => (Stage4, Dynamic);
    /// Dynamic power during stage 5
    dynamic_power_5 => (Stage5, Dynamic);
    /// Dynamic power during stage 6
    dynamic_power_6 => (Stage6, Dynamic);
    /// Dynamic power during stage 7
    dynamic_power_7 => (Stage7, Dynamic);
    /// Static power in the base state
    static_power => (Base, Static);
    /// Static power during garbage collection
    static_power_gc => (Gc, Static);
    /// Static power during stage 0
    static_power_0 => (Stage0, Static);
    /// Static power during stage 1
    static_power_1 => (Stage1, Static);
    /// Static power during stage 2
    static_power_2 => (Stage2, Static);
    /// Static power during stage 3
    static_power_3 => (Stage3, Static);
    /// Static power during stage 4
    static_power_4 => (Stage4, Static);
    /// Static power during stage 5
    static_power_5 => (Stage5, Static);
    /// Static power during stage 6
    static_power_6 => (Stage6, Static);
    /// Static power during stage 7
    static_power_7 => (Stage7, Static);
}

impl<T: PowerModelState + ?Sized> NamedPowerGetters for T {}
