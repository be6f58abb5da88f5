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

//! Power states and power kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PowerModelError;

/// One of the ten evaluation slots of a power model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerStateSlot {
    /// Baseline operation
    Base,
    /// Garbage collection
    Gc,
    /// Pipeline/activity stage 0
    #[serde(rename = "stage_0")]
    Stage0,
    /// Pipeline/activity stage 1
    #[serde(rename = "stage_1")]
    Stage1,
    /// Pipeline/activity stage 2
    #[serde(rename = "stage_2")]
    Stage2,
    /// Pipeline/activity stage 3
    #[serde(rename = "stage_3")]
    Stage3,
    /// Pipeline/activity stage 4
    #[serde(rename = "stage_4")]
    Stage4,
    /// Pipeline/activity stage 5
    #[serde(rename = "stage_5")]
    Stage5,
    /// Pipeline/activity stage 6
    #[serde(rename = "stage_6")]
    Stage6,
    /// Pipeline/activity stage 7
    #[serde(rename = "stage_7")]
    Stage7,
}

impl PowerStateSlot {
    /// Number of slots
    pub const COUNT: usize = 10;

    /// Every slot in index order
    pub const ALL: [PowerStateSlot; Self::COUNT] = [
        PowerStateSlot::Base,
        PowerStateSlot::Gc,
        PowerStateSlot::Stage0,
        PowerStateSlot::Stage1,
        PowerStateSlot::Stage2,
        PowerStateSlot::Stage3,
        PowerStateSlot::Stage4,
        PowerStateSlot::Stage5,
        PowerStateSlot::Stage6,
        PowerStateSlot::Stage7,
    ];

    /// Position in [`ALL`](Self::ALL)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Slot at `index`, if any
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stage slot `n` (0..=7)
    pub fn stage(n: usize) -> Option<Self> {
        if n < 8 { Self::from_index(n + 2) } else { None }
    }

    /// Stage number for stage slots
    pub fn stage_number(self) -> Option<usize> {
        self.index().checked_sub(2)
    }

    /// Suffix of the boundary getter names: `""`, `"Gc"`, `"_0"` .. `"_7"`
    pub fn getter_suffix(self) -> &'static str {
        match self {
            PowerStateSlot::Base => "",
            PowerStateSlot::Gc => "Gc",
            PowerStateSlot::Stage0 => "_0",
            PowerStateSlot::Stage1 => "_1",
            PowerStateSlot::Stage2 => "_2",
            PowerStateSlot::Stage3 => "_3",
            PowerStateSlot::Stage4 => "_4",
            PowerStateSlot::Stage5 => "_5",
            PowerStateSlot::Stage6 => "_6",
            PowerStateSlot::Stage7 => "_7",
        }
    }

    /// Suffix of the reported statistic names: `""`, `"_gc"`, `"_0"` .. `"_7"`
    pub fn stat_suffix(self) -> &'static str {
        match self {
            PowerStateSlot::Gc => "_gc",
            other => other.getter_suffix(),
        }
    }

    /// External getter name, e.g. `getDynamicPower_3` or `getStaticPowerGc`
    pub fn getter_name(self, kind: PowerKind) -> String {
        let prefix = match kind {
            PowerKind::Dynamic => "getDynamicPower",
            PowerKind::Static => "getStaticPower",
        };
        format!("{}{}", prefix, self.getter_suffix())
    }

    /// Configuration key, e.g. `stage_3`
    pub fn as_str(self) -> &'static str {
        match self {
            PowerStateSlot::Base => "base",
            PowerStateSlot::Gc => "gc",
            PowerStateSlot::Stage0 => "stage_0",
            PowerStateSlot::Stage1 => "stage_1",
            PowerStateSlot::Stage2 => "stage_2",
            PowerStateSlot::Stage3 => "stage_3",
            PowerStateSlot::Stage4 => "stage_4",
            PowerStateSlot::Stage5 => "stage_5",
            PowerStateSlot::Stage6 => "stage_6",
            PowerStateSlot::Stage7 => "stage_7",
        }
    }
}

impl fmt::Display for PowerStateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerStateSlot {
    type Err = PowerModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PowerModelError::Config(format!("Invalid power state slot: {}", s)))
    }
}

/// Dynamic or static component of power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerKind {
    /// Activity-dependent power
    Dynamic,
    /// Leakage power
    Static,
}

impl PowerKind {
    /// Both kinds, dynamic first
    pub const ALL: [PowerKind; 2] = [PowerKind::Dynamic, PowerKind::Static];

    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            PowerKind::Dynamic => "dynamic",
            PowerKind::Static => "static",
        }
    }
}

impl fmt::Display for PowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kinds of power a model reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerModelType {
    /// Both dynamic and static
    #[default]
    #[serde(rename = "all")]
    All,
    /// Static only; dynamic queries yield zero
    #[serde(rename = "static")]
    StaticOnly,
    /// Dynamic only; static queries yield zero
    #[serde(rename = "dynamic")]
    DynamicOnly,
}

impl PowerModelType {
    /// Check if `kind` is reported
    pub fn includes(self, kind: PowerKind) -> bool {
        match self {
            PowerModelType::All => true,
            PowerModelType::StaticOnly => kind == PowerKind::Static,
            PowerModelType::DynamicOnly => kind == PowerKind::Dynamic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_round_trip() {
        for (i, slot) in PowerStateSlot::ALL.into_iter().enumerate() {
            assert_eq!(slot.index(), i);
            assert_eq!(PowerStateSlot::from_index(i), Some(slot));
        }
        assert_eq!(PowerStateSlot::from_index(10), None);
    }

    #[test]
    fn test_stages() {
        assert_eq!(PowerStateSlot::stage(0), Some(PowerStateSlot::Stage0));
        assert_eq!(PowerStateSlot::stage(7), Some(PowerStateSlot::Stage7));
        assert_eq!(PowerStateSlot::stage(8), None);
        assert_eq!(PowerStateSlot::Stage5.stage_number(), Some(5));
        assert_eq!(PowerStateSlot::Gc.stage_number(), None);
    }

    #[test]
    fn test_getter_names() {
        assert_eq!(
            PowerStateSlot::Base.getter_name(PowerKind::Dynamic),
            "getDynamicPower"
        );
        assert_eq!(
            PowerStateSlot::Gc.getter_name(PowerKind::Static),
            "getStaticPowerGc"
        );
        assert_eq!(
            PowerStateSlot::Stage3.getter_name(PowerKind::Static),
            "getStaticPower_3"
        );
        assert_eq!(PowerStateSlot::Gc.stat_suffix(), "_gc");
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!("STAGE_3".parse::<PowerStateSlot>().unwrap(), PowerStateSlot::Stage3);
        assert!("stage_8".parse::<PowerStateSlot>().is_err());
    }

    #[test]
    fn test_model_type_filter() {
        assert!(PowerModelType::All.includes(PowerKind::Static));
        assert!(!PowerModelType::DynamicOnly.includes(PowerKind::Static));
        assert!(!PowerModelType::StaticOnly.includes(PowerKind::Dynamic));
    }
}
