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

use std::path::Path;

use regex::Regex;
use sw_error::{Result, SwitchInfoError};
use tracing::{debug, warn};

const LID_DECIMAL: &str = r"^lid-(\d+)$";
const LID_HEX: &str = r"^lid-0[xX]([0-9a-fA-F]+)$";
const MST_PATH: &str = r"^/dev/mst/SW_MT\d+_.*_lid-0[xX]([0-9a-fA-F]+)$";

fn pattern(re: &str) -> Result<Regex> {
    Regex::new(re).map_err(|e| SwitchInfoError::Generic(e.to_string()))
}

/// A validated `-d` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    /// Passed to the register tool unchanged
    pub name: String,
    pub lid: u32,
}

pub fn parse_device(name: &str) -> Result<DeviceTarget> {
    let lid = if let Some(caps) = pattern(LID_HEX)?.captures(name) {
        u32::from_str_radix(&caps[1], 16).ok()
    } else if let Some(caps) = pattern(LID_DECIMAL)?.captures(name) {
        caps[1].parse::<u32>().ok()
    } else if let Some(caps) = pattern(MST_PATH)?.captures(name) {
        if !Path::new(name).exists() {
            return Err(SwitchInfoError::device(format!("device {} does not exist", name)));
        }
        u32::from_str_radix(&caps[1], 16).ok()
    } else {
        return Err(SwitchInfoError::device(format!(
            "'{}' is not a valid device; use lid-<N>, lid-0x<HEX> or an /dev/mst/SW_MT*_lid-0x<HEX> path",
            name
        )));
    };

    // Unicast LIDs are 16 bits wide and never 0
    let lid = lid
        .filter(|lid| (1..=0xffff).contains(lid))
        .ok_or_else(|| SwitchInfoError::device(format!("'{}' does not carry a valid LID", name)))?;

    debug!("Device {} resolves to LID {}", name, lid);
    Ok(DeviceTarget { name: name.to_string(), lid })
}

/// Register access needs root
pub fn require_root() -> Result<()> {
    // SAFETY: geteuid and getuid only return the process's user IDs.
    let euid = unsafe { libc::geteuid() };
    let uid = unsafe { libc::getuid() };

    if euid != 0 {
        return Err(SwitchInfoError::PermissionDenied(
            "switchinfo must run as root (euid=0) to access switch registers".to_string(),
        ));
    }
    if uid != 0 {
        warn!("Running as setuid root");
    }
    Ok(())
}
