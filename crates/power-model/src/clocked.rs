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

//! Clocked objects supplying voltage and clock period

use parking_lot::RwLock;

/// The hardware component a power model belongs to
///
/// Supplies the `voltage` and `clock_period` automatic variables.
pub trait ClockedObject: Send + Sync {
    /// Current supply voltage in volts
    fn voltage(&self) -> f64;

    /// Current clock period in seconds
    fn clock_period(&self) -> f64;
}

/// Clocked object whose operating point can be changed at runtime
#[derive(Debug)]
pub struct ClockDomain {
    operating_point: RwLock<OperatingPoint>,
}

#[derive(Debug, Clone, Copy)]
struct OperatingPoint {
    voltage: f64,
    clock_period: f64,
}

impl ClockDomain {
    /// Create a domain at `voltage` volts and `frequency_hz`
    pub fn new(voltage: f64, frequency_hz: f64) -> Self {
        Self {
            operating_point: RwLock::new(OperatingPoint {
                voltage,
                clock_period: 1.0 / frequency_hz,
            }),
        }
    }

    /// Change the supply voltage
    pub fn set_voltage(&self, voltage: f64) {
        self.operating_point.write().voltage = voltage;
    }

    /// Change the clock frequency
    pub fn set_frequency(&self, frequency_hz: f64) {
        self.operating_point.write().clock_period = 1.0 / frequency_hz;
    }
}

impl ClockedObject for ClockDomain {
    fn voltage(&self) -> f64 {
        self.operating_point.read().voltage
    }

    fn clock_period(&self) -> f64 {
        self.operating_point.read().clock_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dvfs_changes_are_visible() {
        let domain = ClockDomain::new(1.0, 1e9);
        assert_eq!(domain.clock_period(), 1e-9);

        domain.set_voltage(0.8);
        domain.set_frequency(5e8);
        assert_eq!(domain.voltage(), 0.8);
        assert_eq!(domain.clock_period(), 2e-9);
    }
}
