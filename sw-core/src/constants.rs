//! Constants for switchinfo
//!
//! Centralizes register layout constants, version thresholds, and tool
//! defaults. Add new magic numbers here rather than inline.

/// External tool defaults
pub mod tools {
    /// Register access tool binary
    pub const MLXREG: &str = "mlxreg";

    /// In-band management query tool used for the port count fallback
    pub const SMPQUERY: &str = "smpquery";

    /// Prefix the vendor tools put on error lines
    pub const ERROR_PREFIX: &str = "-E-";

    /// Prefix the vendor tools put on informational lines
    pub const INFO_PREFIX: &str = "-I-";
}

/// Tool version gates, as (major, minor, patch)
pub mod versions {
    /// Oldest tool release that can read every register we plan
    pub const READ_MINIMUM: (u32, u32, u32) = (4, 14, 0);

    /// Oldest tool release that accepts the SPZR node description write
    pub const WRITE_MINIMUM: (u32, u32, u32) = (4, 18, 0);

    /// Releases from here on want `slot_index` on slot-aware registers
    pub const SLOT_INDEX_FROM: (u32, u32, u32) = (4, 21, 0);

    /// MGIR needs `module_base` inside [MODULE_BASE_FROM, MODULE_BASE_UNTIL)
    pub const MODULE_BASE_FROM: (u32, u32, u32) = (4, 21, 0);
    pub const MODULE_BASE_UNTIL: (u32, u32, u32) = (4, 22, 0);

    /// Releases from here on want `router_entity` ahead of the SPZR index
    pub const ROUTER_ENTITY_FROM: (u32, u32, u32) = (4, 23, 0);
}

/// Index parameter names understood by the register tool
pub mod params {
    pub const SENSOR_INDEX: &str = "sensor_index";
    pub const SLOT_INDEX: &str = "slot_index";
    pub const MODULE_BASE: &str = "module_base";
    pub const ROUTER_ENTITY: &str = "router_entity";
    pub const SWID: &str = "swid";
    pub const TACHO: &str = "tacho";
}

/// Thermal register constants
pub mod thermal {
    /// MTMP reports temperature in units of 1/8 degree Celsius
    pub const RAW_UNITS_PER_DEGREE: i32 = 8;

    /// MTMP sensor index of the first pluggable module
    pub const MODULE_SENSOR_BASE: u32 = 64;

    /// ASIC sensor index
    pub const ASIC_SENSOR_INDEX: u32 = 0;

    /// Most module cages queried for temperature; larger port counts are capped
    pub const MAX_MODULES: u32 = 128;
}

/// Fan register constants
pub mod fan {
    /// Speeds above this are reported at twice the real rate by some fan models
    pub const RPM_HALVING_THRESHOLD: u64 = 10_000;

    /// Name of the active-tachometer bitmask field in MFCR
    pub const TACHO_ACTIVE_FIELD: &str = "tacho_active";
}

/// Power supply register layout (MSPS, one `psuN[0..15]` word family per unit)
pub mod psu {
    pub const STATUS_WORD: u32 = 0;
    pub const FAN_WORD: u32 = 1;

    /// Nibble positions count from the most significant hex digit of a word
    pub const PRESENCE_NIBBLE: usize = 0;
    pub const DC_NIBBLE: usize = 7;
    pub const FAN_NIBBLE: usize = 7;

    pub const PART_NUMBER_WORDS: std::ops::RangeInclusive<u32> = 2..=5;
    pub const SERIAL_NUMBER_WORDS: std::ops::RangeInclusive<u32> = 6..=9;
    pub const POWER_WORD: u32 = 10;

    /// Conventional valid bit carried in the power word
    pub const POWER_VALID_MASK: u64 = 0x8000_0000;
}

/// Node description (SPZR) constants
pub mod description {
    /// Longest description the register can hold, in characters
    pub const MAX_LEN: usize = 64;

    /// Number of 32-bit words the description occupies
    pub const WORD_COUNT: usize = 16;

    /// Field family name
    pub const FIELD: &str = "node_description";
}
