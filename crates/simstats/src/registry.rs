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

//! Name-indexed statistics registry

use crate::error::{StatsError, StatsResult};
use crate::stat::{ScalarStat, Stat, StatHandle, StatValue, VectorStat};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Registry of simulation statistics keyed by fully-qualified name
///
/// Registration is only allowed before [`finalize`](Self::finalize); lookups
/// are allowed at any time but are only meaningful once the registry has
/// been finalized and every component has registered its statistics.
#[derive(Debug, Default)]
pub struct StatsRegistry {
    stats: RwLock<FxHashMap<String, Arc<Stat>>>,
    finalized: AtomicBool,
}

impl StatsRegistry {
    /// Create an empty, open registry
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, name: &str, desc: &str, value: StatValue) -> StatsResult<Arc<Stat>> {
        if name.is_empty() || name.starts_with('.') || name.ends_with('.') {
            return Err(StatsError::InvalidName {
                name: name.to_string(),
            });
        }
        if self.is_finalized() {
            return Err(StatsError::RegistryFinalized {
                name: name.to_string(),
            });
        }

        let mut stats = self.stats.write();
        if stats.contains_key(name) {
            return Err(StatsError::DuplicateStat {
                name: name.to_string(),
            });
        }

        let stat = Arc::new(Stat::new(name.to_string(), desc.to_string(), value));
        stats.insert(name.to_string(), Arc::clone(&stat));
        log::debug!("registered statistic '{}' ({:?})", name, stat.kind());
        Ok(stat)
    }

    /// Register a scalar statistic starting at zero
    pub fn scalar(&self, name: &str, desc: &str) -> StatsResult<ScalarStat> {
        self.insert(name, desc, StatValue::Scalar(RwLock::new(0.0)))
            .map(ScalarStat)
    }

    /// Register a vector statistic with `size` zeroed buckets
    pub fn vector(&self, name: &str, desc: &str, size: usize) -> StatsResult<VectorStat> {
        self.insert(name, desc, StatValue::Vector(RwLock::new(vec![0.0; size])))
            .map(VectorStat)
    }

    /// Register a statistic computed by `compute` whenever it is read
    pub fn formula<F>(&self, name: &str, desc: &str, compute: F) -> StatsResult<StatHandle>
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.insert(name, desc, StatValue::Formula(Box::new(compute)))
            .map(|stat| StatHandle::new(&stat))
    }

    /// Close registration; later registrations fail
    pub fn finalize(&self) {
        if !self.finalized.swap(true, Ordering::AcqRel) {
            log::debug!("statistics registry finalized with {} entries", self.len());
        }
    }

    /// Check if registration is closed
    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }

    /// Resolve a statistic by fully-qualified name
    pub fn resolve(&self, name: &str) -> Option<StatHandle> {
        self.stats.read().get(name).map(StatHandle::new)
    }

    /// Current value of a statistic by name
    pub fn value(&self, name: &str) -> Option<f64> {
        self.resolve(name).and_then(|handle| handle.value())
    }

    /// Check if a statistic is registered
    pub fn contains(&self, name: &str) -> bool {
        self.stats.read().contains_key(name)
    }

    /// Remove a statistic; existing handles stop yielding values
    pub fn remove(&self, name: &str) -> bool {
        match self.stats.write().remove(name) {
            Some(stat) => {
                stat.mark_removed();
                log::debug!("removed statistic '{}'", name);
                true
            }
            None => false,
        }
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stats.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered statistics
    pub fn len(&self) -> usize {
        self.stats.read().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.stats.read().is_empty()
    }
}
