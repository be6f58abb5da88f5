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

//! Probe points and the thermal feedback listener
//!
//! A [`ProbeManager`] owns named notification points. Listeners attached to
//! a point are called in attachment order with every value delivered to it.
//! [`ThermalProbeListener`] connects a temperature point to a shared
//! [`PowerAggregator`].

use crate::aggregator::PowerAggregator;
use crate::error::{PowerModelError, PowerResult};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Name of the temperature probe point of a subsystem
pub const THERMAL_UPDATE: &str = "thermalUpdate";

/// Receiver of probe notifications
pub trait ProbeListener<T>: Send + Sync {
    /// Listener name, unique per probe point
    fn name(&self) -> &str;

    /// Handle one notification
    fn notify(&self, arg: &T) -> PowerResult<()>;
}

/// Named notification point
pub struct ProbePoint<T> {
    name: String,
    listeners: Vec<Arc<dyn ProbeListener<T>>>,
}

impl<T> ProbePoint<T> {
    /// Create a point without listeners
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listeners: Vec::new(),
        }
    }

    /// Point name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach a listener
    pub fn add_listener(&mut self, listener: Arc<dyn ProbeListener<T>>) {
        log::debug!("probe '{}': attached listener '{}'", self.name, listener.name());
        self.listeners.push(listener);
    }

    /// Detach a listener by name
    pub fn remove_listener(&mut self, name: &str) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.name() != name);
        before != self.listeners.len()
    }

    /// Number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver `arg` to every listener
    ///
    /// A failing listener does not stop delivery to the others; the first
    /// failure is returned once all listeners have been called.
    pub fn notify(&self, arg: &T) -> PowerResult<()> {
        let mut first_error = None;
        for listener in &self.listeners {
            if let Err(error) = listener.notify(arg) {
                log::error!(
                    "probe '{}': listener '{}' failed: {}",
                    self.name,
                    listener.name(),
                    error
                );
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Probe points of one subsystem, carrying temperature samples
pub struct ProbeManager {
    owner: String,
    points: FxHashMap<String, ProbePoint<f64>>,
}

impl ProbeManager {
    /// Create a manager without points
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            points: FxHashMap::default(),
        }
    }

    /// Create a manager with the standard `thermalUpdate` point
    pub fn with_thermal_point(owner: impl Into<String>) -> Self {
        let mut manager = Self::new(owner);
        manager.add_point(THERMAL_UPDATE);
        manager
    }

    /// Owning subsystem name
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get or create a point
    pub fn add_point(&mut self, name: &str) -> &mut ProbePoint<f64> {
        self.points
            .entry(name.to_string())
            .or_insert_with(|| ProbePoint::new(name))
    }

    /// Look up a point
    pub fn point(&self, name: &str) -> Option<&ProbePoint<f64>> {
        self.points.get(name)
    }

    /// Attach a listener to an existing point
    pub fn add_listener(
        &mut self,
        point: &str,
        listener: Arc<dyn ProbeListener<f64>>,
    ) -> PowerResult<()> {
        let target = self
            .points
            .get_mut(point)
            .ok_or_else(|| missing_point(&self.owner, point))?;
        target.add_listener(listener);
        Ok(())
    }

    /// Deliver a sample to a point
    pub fn notify(&self, point: &str, value: f64) -> PowerResult<()> {
        self.points
            .get(point)
            .ok_or_else(|| missing_point(&self.owner, point))?
            .notify(&value)
    }
}

fn missing_point(owner: &str, point: &str) -> PowerModelError {
    PowerModelError::Config(format!("No probe point '{}' on {}", point, owner))
}

/// Forwards temperature samples to a power model
pub struct ThermalProbeListener {
    name: String,
    model: Arc<Mutex<PowerAggregator>>,
}

impl ThermalProbeListener {
    /// Create a listener for `model`
    pub fn new(model: Arc<Mutex<PowerAggregator>>) -> Self {
        let name = format!("{}.thermalListener", model.lock().name());
        Self { name, model }
    }

    /// Create a listener for `model` and attach it to `point` of `manager`
    pub fn attach(
        model: &Arc<Mutex<PowerAggregator>>,
        manager: &mut ProbeManager,
        point: &str,
    ) -> PowerResult<Arc<ThermalProbeListener>> {
        let listener = Arc::new(Self::new(Arc::clone(model)));
        manager.add_listener(point, listener.clone())?;
        Ok(listener)
    }
}

impl ProbeListener<f64> for ThermalProbeListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, temperature: &f64) -> PowerResult<()> {
        self.model.lock().on_temperature_update(*temperature)
    }
}
