//! Power supply decoding (MSPS)
//!
//! Each unit owns a `psuN[0..15]` word family. Status flags live in single
//! hex digits of words 0 and 1 and are mapped through fixed lookup tables;
//! a digit outside its table is a decode error rather than a guess.

use sw_error::{Result, SwitchInfoError};
use tracing::debug;

use crate::codec::{hex_to_decimal, word_nibble};
use crate::constants::psu;
use crate::data::{Health, PowerSupplyUnit};
use crate::plan::Category;
use crate::register::{FieldPattern, RawRegister};

/// Nibble value to status; `None` means "not applicable"
type NibbleTable = &'static [(u8, Option<Health>)];

const PRESENCE_TABLE: NibbleTable = &[(5, Some(Health::Ok)), (0, Some(Health::Error))];
const DC_TABLE: NibbleTable = &[(1, Some(Health::Ok)), (0, Some(Health::Error))];
const FAN_TABLE: NibbleTable = &[
    (2, Some(Health::Ok)),
    (0, Some(Health::Error)),
    (1, Some(Health::Error)),
    (3, None),
];

fn lookup(table: NibbleTable, nibble: u8, what: &str, unit: u32) -> Result<Option<Health>> {
    table
        .iter()
        .find(|(value, _)| *value == nibble)
        .map(|(_, health)| *health)
        .ok_or_else(|| SwitchInfoError::decode(format!("PSU {}: unknown {} pattern 0x{:x}", unit, what, nibble)))
}

/// Which parts of each unit the category reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsuScope {
    pub status: bool,
    pub power: bool,
    pub inventory: bool,
}

impl PsuScope {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Inventory => Self { status: false, power: false, inventory: true },
            Category::Status => Self { status: true, power: false, inventory: false },
            Category::Vitals => Self { status: true, power: true, inventory: false },
            Category::All => Self { status: true, power: true, inventory: true },
        }
    }
}

struct UnitWords<'a> {
    msps: &'a RawRegister,
    stem: String,
}

impl<'a> UnitWords<'a> {
    fn word(&self, n: u32) -> Option<&'a str> {
        self.msps.field(&format!("{}[{}]", self.stem, n))
    }

    fn text(&self, range: std::ops::RangeInclusive<u32>) -> Result<Option<String>> {
        self.msps.text(&FieldPattern::family_range(&self.stem, range))
    }
}

/// Power draw in watts; the valid bit is masked off and 0 means unknown
pub fn power_from_word(raw: u64) -> Option<u64> {
    match raw & !psu::POWER_VALID_MASK {
        0 => None,
        watts => Some(watts),
    }
}

fn decode_unit(msps: &RawRegister, index: u32, scope: PsuScope) -> Result<PowerSupplyUnit> {
    let words = UnitWords {
        msps,
        stem: format!("psu{}", index),
    };
    let mut unit = PowerSupplyUnit::new(index);

    // A word missing from the dump leaves its flags unreported
    if scope.status {
        if let Some(status) = words.word(psu::STATUS_WORD) {
            unit.presence = lookup(PRESENCE_TABLE, word_nibble(status, psu::PRESENCE_NIBBLE)?, "presence", index)?;
            unit.dc_power = lookup(DC_TABLE, word_nibble(status, psu::DC_NIBBLE)?, "dc power", index)?;
        } else {
            debug!("PSU {}: no status word in MSPS", index);
        }
        if let Some(fan) = words.word(psu::FAN_WORD) {
            unit.fan = lookup(FAN_TABLE, word_nibble(fan, psu::FAN_NIBBLE)?, "fan", index)?;
        }
    }

    if scope.inventory {
        unit.part_number = words.text(psu::PART_NUMBER_WORDS)?;
        unit.serial_number = words.text(psu::SERIAL_NUMBER_WORDS)?;
    }

    if scope.power {
        if let Some(raw) = words.word(psu::POWER_WORD) {
            unit.power_watts = power_from_word(hex_to_decimal(raw)?);
        }
    }

    Ok(unit)
}

/// Every unit found in the dump, ordered by index
pub fn decode_power_supplies(msps: &RawRegister, scope: PsuScope) -> Result<Vec<PowerSupplyUnit>> {
    let indices = msps.instance_indices("psu");
    debug!("MSPS reports {} power supplies: {:?}", indices.len(), indices);
    indices.into_iter().map(|idx| decode_unit(msps, idx, scope)).collect()
}
