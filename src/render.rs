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

//! Snapshot rendering
//!
//! Three output shapes share one walk over the snapshot: a table for people,
//! `key:value` lines for monitoring scripts, and JSON.

use std::fmt::Display;

use sw_core::decode::PsuScope;
use sw_core::{Category, PowerSupplyUnit, RegisterName, Snapshot};
use sw_error::Result;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Parseable,
    Json,
}

pub fn render(snapshot: &Snapshot, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
        OutputFormat::Table => {
            let mut out = TableWriter::default();
            walk(snapshot, &mut out);
            Ok(out.finish())
        }
        OutputFormat::Parseable => {
            let mut out = KeyValueWriter::default();
            walk(snapshot, &mut out);
            Ok(out.finish())
        }
    }
}

/// Receives the snapshot one row at a time
trait Sink {
    fn section(&mut self, title: &str);
    /// `key` is the parseable name, `label` the table name
    fn row(&mut self, key: &str, label: &str, value: Option<String>);
}

#[derive(Default)]
struct TableWriter {
    sections: Vec<(String, Vec<(String, String)>)>,
}

impl Sink for TableWriter {
    fn section(&mut self, title: &str) {
        self.sections.push((title.to_string(), Vec::new()));
    }

    fn row(&mut self, _key: &str, label: &str, value: Option<String>) {
        if self.sections.is_empty() {
            self.section("General");
        }
        if let Some((_, rows)) = self.sections.last_mut() {
            rows.push((label.to_string(), value.unwrap_or_else(|| NOT_AVAILABLE.to_string())));
        }
    }
}

impl TableWriter {
    fn finish(self) -> String {
        let width = self
            .sections
            .iter()
            .flat_map(|(_, rows)| rows.iter().map(|(label, _)| label.len()))
            .max()
            .unwrap_or(0);

        let mut blocks = Vec::new();
        for (title, rows) in self.sections.into_iter().filter(|(_, rows)| !rows.is_empty()) {
            let mut block = format!("{}\n{}\n", title, "-".repeat(title.len()));
            for (label, value) in rows {
                block.push_str(&format!("{:<width$} : {}\n", label, value, width = width));
            }
            blocks.push(block);
        }
        blocks.join("\n")
    }
}

#[derive(Default)]
struct KeyValueWriter {
    out: String,
}

impl Sink for KeyValueWriter {
    fn section(&mut self, _title: &str) {}

    fn row(&mut self, key: &str, _label: &str, value: Option<String>) {
        if let Some(value) = value {
            self.out.push_str(&format!("{}:{}\n", key, value));
        }
    }
}

impl KeyValueWriter {
    fn finish(self) -> String {
        self.out
    }
}

fn text<T: Display>(value: &Option<T>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

fn walk(snapshot: &Snapshot, out: &mut dyn Sink) {
    let category = snapshot.category;
    let reads = |r: RegisterName| category.registers().contains(&r);
    let id = &snapshot.identity;

    out.section("General");
    if reads(RegisterName::Msgi) {
        out.row("part_number", "Part Number", id.part_number.clone());
        out.row("serial_number", "Serial Number", id.serial_number.clone());
        out.row("product_name", "Product Name", id.product_name.clone());
        out.row("revision", "Revision", id.revision.clone());
    }
    if matches!(category, Category::Inventory | Category::All) {
        out.row("psid", "PSID", id.psid.clone());
    }
    if reads(RegisterName::Spzr) {
        out.row("guid", "GUID", id.guid.clone());
        out.row("node_description", "Node Description", id.node_description.clone());
    }
    if category != Category::Vitals {
        out.row("firmware", "Firmware Version", text(&id.firmware));
    }
    if reads(RegisterName::Mgpir) {
        out.row("port_count", "Ports", text(&id.port_count));
    }
    if category != Category::Inventory {
        let uptime = snapshot.uptime.map(|u| u.render(category.clock_style()));
        out.row("uptime", "Uptime", uptime);
    }

    out.section("Power Supplies");
    let scope = PsuScope::for_category(category);
    for unit in &snapshot.power_supplies {
        power_supply(unit, scope, out);
    }

    if reads(RegisterName::Mtmp) {
        out.section("Temperatures");
        let thermal = snapshot.thermal.as_ref();
        let celsius = |v: Option<i32>| v.map(|c| format!("{} C", c));
        out.row("asic_temp", "ASIC Temperature", celsius(thermal.and_then(|t| t.asic_celsius)));
        out.row("max_temp", "Max Temperature", celsius(thermal.and_then(|t| t.max_celsius)));
        out.row("sensor_count", "Sensors", thermal.and_then(|t| t.sensor_count).map(|n| n.to_string()));
        if let Some(thermal) = thermal {
            for (module, c) in &thermal.modules {
                out.row(&format!("module{}_temp", module), &format!("Module {}", module), Some(format!("{} C", c)));
            }
        }
    }

    if reads(RegisterName::Mfcr) {
        out.section("Fans");
        if reads(RegisterName::Fore) {
            out.row("fan_alarm", "Fan Status", text(&snapshot.fan_alarm));
        }
        if let Some(fans) = &snapshot.fans {
            for (tacho, rpm) in &fans.rpm {
                out.row(&format!("fan{}_rpm", tacho), &format!("Fan {}", tacho), Some(format!("{} RPM", rpm)));
            }
        }
    }
}

/// PSUs are numbered from 1 on output
fn power_supply(unit: &PowerSupplyUnit, scope: PsuScope, out: &mut dyn Sink) {
    let n = unit.index + 1;
    let key = |field: &str| format!("psu{}_{}", n, field);
    let label = |field: &str| format!("PSU {} {}", n, field);

    if scope.status {
        out.row(&key("presence"), &label("Presence"), text(&unit.presence));
        out.row(&key("dc_power"), &label("DC Power"), text(&unit.dc_power));
        out.row(&key("fan"), &label("Fan"), text(&unit.fan));
    }
    if scope.inventory {
        out.row(&key("part_number"), &label("Part Number"), unit.part_number.clone());
        out.row(&key("serial_number"), &label("Serial Number"), unit.serial_number.clone());
    }
    if scope.power {
        out.row(&key("power"), &label("Power"), unit.power_watts.map(|w| format!("{} W", w)));
    }
}
