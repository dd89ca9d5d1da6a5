//! Temperature decoding (MTMP, MTCAP)

use sw_error::Result;

use crate::constants::thermal;
use crate::data::ThermalReading;
use crate::register::RawRegister;

/// 16-bit two's complement eighths of a degree, truncated toward zero
pub fn raw_to_celsius(raw: u64) -> i32 {
    let signed = (raw & 0xffff) as u16 as i16;
    i32::from(signed) / thermal::RAW_UNITS_PER_DEGREE
}

/// ASIC temperature, its recorded maximum and the MTCAP sensor count
pub fn decode_asic(mtmp: &RawRegister, mtcap: Option<&RawRegister>) -> Result<ThermalReading> {
    let sensor_count = match mtcap {
        Some(cap) => cap.number("sensor_count")?,
        None => None,
    };

    Ok(ThermalReading {
        asic_celsius: mtmp.number("temperature")?.map(raw_to_celsius),
        max_celsius: mtmp.number("max_temperature")?.map(raw_to_celsius),
        sensor_count,
        modules: Default::default(),
    })
}

/// A module reading of 0 means the cage is empty
pub fn decode_module_temperature(mtmp: &RawRegister) -> Result<Option<i32>> {
    Ok(match mtmp.number("temperature")? {
        Some(0) | None => None,
        Some(raw) => Some(raw_to_celsius(raw)),
    })
}
