/*
 * This file is part of switchinfo.
 *
 * Copyright (C) 2025 switchinfo contributors
 *
 * switchinfo is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * switchinfo is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with switchinfo. If not, see <https://www.gnu.org/licenses/>.
 */

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sw_core::constants::tools;
use sw_core::Category;
use sw_error::{Result, SwitchInfoError};
use tracing::debug;

const MAX_TIMEOUT_SECS: u64 = 3600;

fn default_mlxreg() -> String { tools::MLXREG.to_string() }
fn default_smpquery() -> String { tools::SMPQUERY.to_string() }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Register tool binary
    #[serde(default = "default_mlxreg")]
    pub mlxreg_path: String,
    /// Port-count tool binary
    #[serde(default = "default_smpquery")]
    pub smpquery_path: String,
    /// Per-query timeout; unset waits forever
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
    /// Category printed when `-o` is not given
    #[serde(default)]
    pub default_output: Category,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mlxreg_path: default_mlxreg(),
            smpquery_path: default_smpquery(),
            fetch_timeout_secs: None,
            default_output: Category::All,
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("switchinfo").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("switchinfo")
            .join("config.json");
    }
    system_config_path()
}

pub fn system_config_path() -> PathBuf { PathBuf::from("/etc/switchinfo/config.json") }

pub fn validate_settings(cfg: &Settings) -> Result<()> {
    if cfg.mlxreg_path.trim().is_empty() {
        return Err(SwitchInfoError::configuration("mlxreg_path must not be empty"));
    }
    if cfg.smpquery_path.trim().is_empty() {
        return Err(SwitchInfoError::configuration("smpquery_path must not be empty"));
    }
    if let Some(secs) = cfg.fetch_timeout_secs {
        if !(1..=MAX_TIMEOUT_SECS).contains(&secs) {
            return Err(SwitchInfoError::configuration(format!(
                "fetch_timeout_secs must be within 1..={} (got {})",
                MAX_TIMEOUT_SECS, secs
            )));
        }
    }
    Ok(())
}

fn read_settings(path: &Path) -> Result<Option<Settings>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SwitchInfoError::configuration(format!("cannot read {}: {}", path.display(), e)));
        }
    };
    let cfg: Settings = serde_json::from_str(&data)
        .map_err(|e| SwitchInfoError::configuration(format!("{}: parse error: {}", path.display(), e)))?;
    validate_settings(&cfg)?;
    Ok(Some(cfg))
}

/// Load settings from `explicit`, or the user file, or the system file.
/// An explicit path must exist; the implicit ones fall back to defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        return read_settings(path)?.ok_or_else(|| {
            SwitchInfoError::configuration(format!("config file {} does not exist", path.display()))
        });
    }

    for path in [config_path(), system_config_path()] {
        if let Some(cfg) = read_settings(&path)? {
            debug!("Loaded settings from {}", path.display());
            return Ok(cfg);
        }
    }
    debug!("No config file found, using defaults");
    Ok(Settings::default())
}
