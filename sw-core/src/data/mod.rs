//! Snapshot data model

mod types;

pub use types::{
    DeviceIdentity, FanAlarmStatus, FanReading, FirmwareVersion, Health, PowerSupplyUnit, Snapshot,
    ThermalReading, Uptime,
};
