//! Per-entity register decoders
//!
//! Each decoder takes already fetched dumps and returns typed values. None
//! of them talk to the hardware except `ports`, which may ask the
//! port-count source when MGPIR is of no help.

pub mod fan;
pub mod identity;
pub mod ports;
pub mod psu;
pub mod thermal;

pub use fan::{active_tachometers, correct_rpm, decode_fan_alarm, decode_fan_speed, tachometers_from_mask};
pub use identity::{apply_msgi, decode_firmware, decode_guid, decode_node_description, decode_psid, decode_uptime};
pub use ports::{even_port_count, modules_from_mgpir, resolve_port_count};
pub use psu::{decode_power_supplies, PsuScope};
pub use thermal::{decode_asic, decode_module_temperature, raw_to_celsius};
