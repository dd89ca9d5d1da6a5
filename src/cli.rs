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

//! Command Line Interface

use std::path::PathBuf;

use clap::Parser;
use sw_core::constants::description;
use sw_core::{Category, SnapshotRequest};
use sw_error::{Result, SwitchInfoError};

use crate::config::Settings;
use crate::render::OutputFormat;
use crate::runner::Action;

#[derive(Parser, Debug)]
#[command(name = "switchinfo")]
#[command(version)]
#[command(about = "Inventory, status and vitals of unmanaged switches")]
#[command(long_about = "switchinfo - in-band hardware report for unmanaged switches

Reads the switch registers through mlxreg and prints identity, power
supply, temperature and fan information. Must run as root.

EXAMPLES:
    switchinfo -d lid-5                         Everything, as a table
    switchinfo -d lid-0x1a -o vitals -p         Vitals as key:value lines
    switchinfo -d lid-5 -o status -T            Status with module temperatures
    switchinfo -d lid-5 -j                      Full snapshot as JSON
    switchinfo -d lid-5 -s \"rack-12\"            Set the node description

ENVIRONMENT VARIABLES:
    SWITCHINFO_LOG=debug    Diagnostic log level (stderr)

FILES:
    ~/.config/switchinfo/config.json     Tool paths and defaults
    /etc/switchinfo/config.json          System-wide fallback
    /var/log/switchinfo/events.json      Event log (with --logging)")]
pub struct Cli {
    /// Switch to query: lid-<N>, lid-0x<HEX> or /dev/mst/SW_MT..._lid-0x<HEX>
    #[arg(short = 'd', long = "device", value_name = "DEV")]
    pub device: String,

    /// Output category
    #[arg(short = 'o', long = "output", value_name = "CATEGORY", value_parser = parse_category)]
    pub output: Option<Category>,

    /// Include per-module temperatures (status, vitals, all)
    #[arg(short = 'T', long = "module-temps")]
    pub module_temps: bool,

    /// Set the node description instead of reading
    #[arg(short = 's', long = "set-description", value_name = "TEXT")]
    pub set_description: Option<String>,

    /// Print key:value lines for monitoring
    #[arg(short = 'p', long = "parseable")]
    pub parseable: bool,

    /// Print the snapshot as JSON
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Per-query timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append events to the JSON event log
    #[arg(long)]
    pub logging: bool,

    /// More diagnostics on stderr (-v debug, -vv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_category(s: &str) -> std::result::Result<Category, String> {
    s.parse::<Category>().map_err(|e| e.to_string())
}

impl Cli {
    /// Reject option combinations that mix reading and writing
    pub fn validate(&self) -> Result<()> {
        if let Some(text) = &self.set_description {
            let conflicts: Vec<&str> = [
                (self.output.is_some(), "-o"),
                (self.module_temps, "-T"),
                (self.parseable, "-p"),
                (self.json, "-j"),
            ]
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, flag)| *flag)
            .collect();
            if !conflicts.is_empty() {
                return Err(SwitchInfoError::configuration(format!(
                    "-s cannot be combined with {}",
                    conflicts.join(", ")
                )));
            }
            if text.chars().count() > description::MAX_LEN {
                return Err(SwitchInfoError::configuration(format!(
                    "node description must be at most {} characters",
                    description::MAX_LEN
                )));
            }
            if !text.is_ascii() {
                return Err(SwitchInfoError::configuration("node description must be ASCII"));
            }
        }
        if self.parseable && self.json {
            return Err(SwitchInfoError::configuration("-p and -j are mutually exclusive"));
        }
        if self.timeout == Some(0) {
            return Err(SwitchInfoError::configuration("--timeout must be at least 1 second"));
        }
        Ok(())
    }

    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.parseable {
            OutputFormat::Parseable
        } else {
            OutputFormat::Table
        }
    }

    pub fn action(&self, settings: &Settings) -> Action {
        match &self.set_description {
            Some(text) => Action::SetDescription(text.clone()),
            None => Action::Query {
                request: SnapshotRequest::new(self.output.unwrap_or(settings.default_output))
                    .with_module_temps(self.module_temps),
                format: self.format(),
            },
        }
    }

    /// tracing filter directive
    pub fn log_level(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}
