//! Register tool version handling
//!
//! Tool behaviour changes between releases, so versions are parsed into a
//! numeric triple and compared as tuples (`4.9.0 < 4.10.0`).

use std::fmt;

use serde::{Deserialize, Serialize};
use sw_error::{Result, SwitchInfoError};

/// `major.minor.patch` of the register tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ToolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ToolVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    pub const fn from_tuple(t: (u32, u32, u32)) -> Self {
        Self::new(t.0, t.1, t.2)
    }

    /// Find the first `N.N.N` in tool output such as
    /// `mlxreg, mft 4.22.1-11, built on Oct 12 2022, 10:02:12. Git SHA Hash: N/A`
    pub fn parse(text: &str) -> Result<Self> {
        let re = regex::Regex::new(r"(\d+)\.(\d+)\.(\d+)")
            .map_err(|e| SwitchInfoError::Generic(e.to_string()))?;
        let caps = re.captures(text).ok_or_else(|| {
            SwitchInfoError::dependency(format!("no version number in '{}'", text.trim()))
        })?;

        let component = |i: usize| -> Result<u32> {
            caps[i].parse().map_err(|_| {
                SwitchInfoError::dependency(format!("version component '{}' out of range", &caps[i]))
            })
        };
        Ok(Self::new(component(1)?, component(2)?, component(3)?))
    }

    /// Fail with a dependency error when older than `minimum`
    pub fn ensure_at_least(&self, minimum: ToolVersion, purpose: &str) -> Result<()> {
        if *self < minimum {
            return Err(SwitchInfoError::dependency(format!(
                "register tool {} is too old for {} (need {} or newer)",
                self, purpose, minimum
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Half-open version interval; unbounded ends are `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    pub from: Option<ToolVersion>,
    pub until: Option<ToolVersion>,
}

impl VersionRange {
    pub const fn at_least(from: ToolVersion) -> Self {
        Self { from: Some(from), until: None }
    }

    pub const fn between(from: ToolVersion, until: ToolVersion) -> Self {
        Self { from: Some(from), until: Some(until) }
    }

    pub fn contains(&self, v: ToolVersion) -> bool {
        self.from.map_or(true, |from| v >= from) && self.until.map_or(true, |until| v < until)
    }
}
