//! Fan decoding (MFCR, MFSM, FORE)

use sw_error::{Result, SwitchInfoError};
use tracing::debug;

use crate::codec::bitmask_to_binary_string;
use crate::constants::fan;
use crate::data::{FanAlarmStatus, Health};
use crate::register::{RawRegister, RegisterDefinition};

/// 1-based tachometer indices of the set bits, counted from the MSB of a
/// `width`-bit mask
pub fn tachometers_from_mask(mask: u64, width: u32) -> Vec<u32> {
    bitmask_to_binary_string(mask, width)
        .chars()
        .zip(1u32..)
        .filter(|(bit, _)| *bit == '1')
        .map(|(_, position)| position)
        .collect()
}

/// Active tachometers from MFCR, using the mask width MFCR declares
pub fn active_tachometers(mfcr: &RawRegister, definition: &RegisterDefinition) -> Result<Vec<u32>> {
    let Some(mask) = mfcr.number(fan::TACHO_ACTIVE_FIELD)? else {
        debug!("MFCR has no {} field, no fans reported", fan::TACHO_ACTIVE_FIELD);
        return Ok(Vec::new());
    };
    let width = definition.size_of(fan::TACHO_ACTIVE_FIELD).ok_or_else(|| {
        SwitchInfoError::decode(format!("MFCR definition lacks {}", fan::TACHO_ACTIVE_FIELD))
    })?;
    Ok(tachometers_from_mask(mask, width))
}

/// Speeds above the threshold are reported doubled
pub fn correct_rpm(raw: u64) -> u64 {
    if raw > fan::RPM_HALVING_THRESHOLD {
        raw / 2
    } else {
        raw
    }
}

pub fn decode_fan_speed(mfsm: &RawRegister) -> Result<Option<u64>> {
    Ok(mfsm.number("rpm")?.map(correct_rpm))
}

/// `Ok` when no fan is under or over its limit; absent when FORE reports neither
pub fn decode_fan_alarm(fore: &RawRegister) -> Result<Option<FanAlarmStatus>> {
    let under = fore.number("fan_under_limit")?;
    let over = fore.number("fan_over_limit")?;
    if under.is_none() && over.is_none() {
        return Ok(None);
    }

    let tripped = under.unwrap_or(0).count_ones() + over.unwrap_or(0).count_ones();
    Ok(Some(if tripped == 0 { Health::Ok } else { Health::Error }))
}
