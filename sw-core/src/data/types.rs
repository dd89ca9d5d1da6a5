//! Snapshot data types
//!
//! Everything a run reports. Values the hardware did not provide are `None`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::{seconds_to_clock, ClockStyle};
use crate::plan::Category;

/// Two-state health flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Ok,
    Error,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Ok => f.write_str("OK"),
            Health::Error => f.write_str("ERROR"),
        }
    }
}

/// FORE summary: `Ok` when no fan is out of its limits
pub type FanAlarmStatus = Health;

/// Firmware release triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub major: u64,
    pub minor: u64,
    pub sub_minor: u64,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}.{:04}", self.major, self.minor, self.sub_minor)
    }
}

/// Identity and inventory strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub part_number: Option<String>,
    pub serial_number: Option<String>,
    pub product_name: Option<String>,
    pub revision: Option<String>,
    pub psid: Option<String>,
    /// 16 lowercase hex digits
    pub guid: Option<String>,
    pub firmware: Option<FirmwareVersion>,
    pub node_description: Option<String>,
    pub port_count: Option<u32>,
}

/// One power supply slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSupplyUnit {
    /// 0-based, as numbered by the register
    pub index: u32,
    pub presence: Option<Health>,
    pub dc_power: Option<Health>,
    /// `None` when the unit has no fan or status was not requested
    pub fan: Option<Health>,
    pub part_number: Option<String>,
    pub serial_number: Option<String>,
    pub power_watts: Option<u64>,
}

impl PowerSupplyUnit {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            presence: None,
            dc_power: None,
            fan: None,
            part_number: None,
            serial_number: None,
            power_watts: None,
        }
    }
}

/// Temperatures in whole degrees Celsius
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermalReading {
    pub asic_celsius: Option<i32>,
    pub max_celsius: Option<i32>,
    pub sensor_count: Option<u64>,
    /// Module number (1-based) to temperature; seated modules only
    pub modules: BTreeMap<u32, i32>,
}

/// Active tachometers and their speeds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanReading {
    pub rpm: BTreeMap<u32, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uptime {
    pub seconds: u64,
}

impl Uptime {
    pub fn render(&self, style: ClockStyle) -> String {
        seconds_to_clock(self.seconds, style)
    }
}

/// Result of one query run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub category: Category,
    pub identity: DeviceIdentity,
    pub uptime: Option<Uptime>,
    pub power_supplies: Vec<PowerSupplyUnit>,
    pub thermal: Option<ThermalReading>,
    pub fans: Option<FanReading>,
    pub fan_alarm: Option<FanAlarmStatus>,
}

impl Snapshot {
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            identity: DeviceIdentity::default(),
            uptime: None,
            power_supplies: Vec::new(),
            thermal: None,
            fans: None,
            fan_alarm: None,
        }
    }
}
