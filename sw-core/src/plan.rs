//! Register plan selection
//!
//! A category names what the user wants to see; the plan is the smallest set
//! of registers that answers it, each with the index parameters the installed
//! tool release expects. Release differences live in one ordered rule table.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sw_error::{Result, SwitchInfoError};
use tracing::trace;

use crate::codec::{decimal_to_hex, ClockStyle};
use crate::constants::{params, thermal, versions};
use crate::register::RegisterName;
use crate::version::{ToolVersion, VersionRange};

/// Output category requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Inventory,
    Status,
    Vitals,
    #[default]
    All,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Inventory, Category::Status, Category::Vitals, Category::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Inventory => "inventory",
            Category::Status => "status",
            Category::Vitals => "vitals",
            Category::All => "all",
        }
    }

    pub fn registers(&self) -> &'static [RegisterName] {
        use RegisterName::*;
        match self {
            Category::Inventory => &[Mgir, Msgi, Spzr, Msps],
            Category::Status => &[Mgir, Mgpir, Msps, Mtmp, Mtcap, Mfcr, Fore],
            Category::Vitals => &[Mgir, Mgpir, Msps, Mtmp, Mtcap, Mfcr],
            Category::All => &[Mgir, Mgpir, Msgi, Msps, Spzr, Mtmp, Mtcap, Mfcr, Fore],
        }
    }

    /// Module temperatures are never read for inventory
    pub fn allows_module_temps(&self) -> bool {
        !matches!(self, Category::Inventory)
    }

    pub fn clock_style(&self) -> ClockStyle {
        match self {
            Category::Vitals => ClockStyle::Hours,
            _ => ClockStyle::Days,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SwitchInfoError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                SwitchInfoError::configuration(format!(
                    "unknown output category '{}' (expected inventory, status, vitals or all)",
                    s
                ))
            })
    }
}

/// Ordered `key=value` list passed to `--indexes`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexParams(Vec<(String, String)>);

impl IndexParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// `key=0x<hex>`
    pub fn with_hex(self, key: &str, value: u64) -> Self {
        self.with(key, format!("0x{}", decimal_to_hex(value)))
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.0.push((key.to_string(), value.into()));
    }

    pub fn prepend(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(0, (key.to_string(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl fmt::Display for IndexParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum RuleAction {
    Append(&'static str, &'static str),
    Prepend(&'static str, &'static str),
}

/// One release-dependent adjustment of index parameters
#[derive(Debug, Clone, Copy)]
struct VersionRule {
    versions: VersionRange,
    registers: &'static [RegisterName],
    action: RuleAction,
}

/// Evaluated top to bottom; every matching rule applies
const VERSION_RULES: &[VersionRule] = &[
    VersionRule {
        versions: VersionRange::at_least(ToolVersion::from_tuple(versions::SLOT_INDEX_FROM)),
        registers: &[RegisterName::Mgpir, RegisterName::Mtmp, RegisterName::Mtcap, RegisterName::Mfsm],
        action: RuleAction::Append(params::SLOT_INDEX, "0x0"),
    },
    VersionRule {
        versions: VersionRange::between(
            ToolVersion::from_tuple(versions::MODULE_BASE_FROM),
            ToolVersion::from_tuple(versions::MODULE_BASE_UNTIL),
        ),
        registers: &[RegisterName::Mgir],
        action: RuleAction::Append(params::MODULE_BASE, "0x0"),
    },
    VersionRule {
        versions: VersionRange::at_least(ToolVersion::from_tuple(versions::ROUTER_ENTITY_FROM)),
        registers: &[RegisterName::Spzr],
        action: RuleAction::Prepend(params::ROUTER_ENTITY, "0x0"),
    },
];

/// Parameters every release needs
pub fn base_params(register: RegisterName) -> IndexParams {
    match register {
        RegisterName::Mtmp => IndexParams::new().with_hex(params::SENSOR_INDEX, thermal::ASIC_SENSOR_INDEX as u64),
        RegisterName::Spzr => IndexParams::new().with(params::SWID, "0x0"),
        _ => IndexParams::new(),
    }
}

/// Apply the release rules to `base`
pub fn index_params_for(register: RegisterName, base: IndexParams, version: ToolVersion) -> IndexParams {
    let mut out = base;
    for rule in VERSION_RULES {
        if !rule.registers.contains(&register) || !rule.versions.contains(version) {
            continue;
        }
        trace!("{} at tool {}: applying {:?}", register, version, rule.action);
        match rule.action {
            RuleAction::Append(key, value) => out.push(key, value),
            RuleAction::Prepend(key, value) => out.prepend(key, value),
        }
    }
    out
}

/// MTMP parameters for a pluggable module (1-based)
pub fn module_temperature_params(module: u32, version: ToolVersion) -> IndexParams {
    let sensor = thermal::MODULE_SENSOR_BASE as u64 + module.saturating_sub(1) as u64;
    index_params_for(
        RegisterName::Mtmp,
        IndexParams::new().with_hex(params::SENSOR_INDEX, sensor),
        version,
    )
}

/// MFSM parameters for a tachometer
pub fn fan_speed_params(tacho: u32, version: ToolVersion) -> IndexParams {
    index_params_for(
        RegisterName::Mfsm,
        IndexParams::new().with_hex(params::TACHO, tacho as u64),
        version,
    )
}

/// Registers to fetch, in plan order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterPlan {
    entries: BTreeMap<RegisterName, IndexParams>,
}

impl RegisterPlan {
    pub fn contains(&self, register: RegisterName) -> bool {
        self.entries.contains_key(&register)
    }

    pub fn params(&self, register: RegisterName) -> Option<&IndexParams> {
        self.entries.get(&register)
    }

    pub fn registers(&self) -> impl Iterator<Item = RegisterName> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegisterName, &IndexParams)> {
        self.entries.iter().map(|(r, p)| (*r, p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn plan_for(category: Category, version: ToolVersion) -> RegisterPlan {
    let entries = category
        .registers()
        .iter()
        .map(|&r| (r, index_params_for(r, base_params(r), version)))
        .collect();
    RegisterPlan { entries }
}
