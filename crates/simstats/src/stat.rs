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

//! Statistic storage and handles

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Kind of a registered statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    /// Single counter or value
    Scalar,
    /// Per-bucket values; reads yield the total
    Vector,
    /// Value computed on demand from other state
    Formula,
}

pub(crate) enum StatValue {
    Scalar(RwLock<f64>),
    Vector(RwLock<Vec<f64>>),
    Formula(Box<dyn Fn() -> f64 + Send + Sync>),
}

pub(crate) struct Stat {
    name: String,
    desc: String,
    value: StatValue,
    removed: AtomicBool,
}

impl Stat {
    pub(crate) fn new(name: String, desc: String, value: StatValue) -> Self {
        Self {
            name,
            desc,
            value,
            removed: AtomicBool::new(false),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn desc(&self) -> &str {
        &self.desc
    }

    pub(crate) fn kind(&self) -> StatKind {
        match self.value {
            StatValue::Scalar(_) => StatKind::Scalar,
            StatValue::Vector(_) => StatKind::Vector,
            StatValue::Formula(_) => StatKind::Formula,
        }
    }

    pub(crate) fn read(&self) -> f64 {
        match &self.value {
            StatValue::Scalar(v) => *v.read(),
            StatValue::Vector(v) => v.read().iter().sum(),
            StatValue::Formula(f) => f(),
        }
    }

    pub(crate) fn mark_removed(&self) {
        self.removed.store(true, Ordering::Release);
    }

    fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stat")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Writer side of a scalar statistic, held by the component that owns it
#[derive(Debug, Clone)]
pub struct ScalarStat(pub(crate) Arc<Stat>);

impl ScalarStat {
    fn cell(&self) -> Option<&RwLock<f64>> {
        match &self.0.value {
            StatValue::Scalar(cell) => Some(cell),
            _ => None,
        }
    }

    /// Overwrite the value
    pub fn set(&self, value: f64) {
        if let Some(cell) = self.cell() {
            *cell.write() = value;
        }
    }

    /// Add to the value
    pub fn add(&self, delta: f64) {
        if let Some(cell) = self.cell() {
            *cell.write() += delta;
        }
    }

    /// Increment by one
    pub fn inc(&self) {
        self.add(1.0);
    }

    /// Current value
    pub fn value(&self) -> f64 {
        self.0.read()
    }

    /// Statistic name
    pub fn name(&self) -> &str {
        self.0.name()
    }
}

/// Writer side of a vector statistic
#[derive(Debug, Clone)]
pub struct VectorStat(pub(crate) Arc<Stat>);

impl VectorStat {
    fn cells(&self) -> Option<&RwLock<Vec<f64>>> {
        match &self.0.value {
            StatValue::Vector(cells) => Some(cells),
            _ => None,
        }
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.cells().map_or(0, |cells| cells.read().len())
    }

    /// Check if the vector has no buckets
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite one bucket; out-of-range indices are ignored
    pub fn set(&self, index: usize, value: f64) {
        if let Some(cells) = self.cells() {
            if let Some(cell) = cells.write().get_mut(index) {
                *cell = value;
            }
        }
    }

    /// Add to one bucket; out-of-range indices are ignored
    pub fn add(&self, index: usize, delta: f64) {
        if let Some(cells) = self.cells() {
            if let Some(cell) = cells.write().get_mut(index) {
                *cell += delta;
            }
        }
    }

    /// Value of one bucket
    pub fn get(&self, index: usize) -> Option<f64> {
        self.cells().and_then(|cells| cells.read().get(index).copied())
    }

    /// Sum of all buckets
    pub fn total(&self) -> f64 {
        self.0.read()
    }

    /// Statistic name
    pub fn name(&self) -> &str {
        self.0.name()
    }
}

/// Reader side of any statistic, obtained by resolving its name
///
/// The handle does not keep the statistic alive.
#[derive(Debug, Clone)]
pub struct StatHandle {
    name: String,
    stat: Weak<Stat>,
}

impl StatHandle {
    pub(crate) fn new(stat: &Arc<Stat>) -> Self {
        Self {
            name: stat.name().to_string(),
            stat: Arc::downgrade(stat),
        }
    }

    /// Fully-qualified statistic name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value, `None` once the statistic has been removed
    pub fn value(&self) -> Option<f64> {
        let stat = self.stat.upgrade()?;
        if stat.is_removed() {
            return None;
        }
        Some(stat.read())
    }

    /// Check if the statistic still exists
    pub fn is_live(&self) -> bool {
        self.stat.upgrade().is_some_and(|stat| !stat.is_removed())
    }

    /// Statistic description, if it still exists
    pub fn desc(&self) -> Option<String> {
        self.stat.upgrade().map(|stat| stat.desc().to_string())
    }

    /// Statistic kind, if it still exists
    pub fn kind(&self) -> Option<StatKind> {
        self.stat.upgrade().map(|stat| stat.kind())
    }
}
