//! Identity decoding (MSGI, MGIR, SPZR)

use sw_error::Result;

use crate::codec::parse_word;
use crate::constants::description;
use crate::data::{DeviceIdentity, FirmwareVersion, Uptime};
use crate::register::{FieldPattern, RawRegister};

/// Serial, part number, product name and revision from MSGI
pub fn apply_msgi(identity: &mut DeviceIdentity, msgi: &RawRegister) -> Result<()> {
    identity.serial_number = msgi.text(&FieldPattern::family("serial_number"))?;
    identity.part_number = msgi.text(&FieldPattern::family("part_number"))?;
    identity.product_name = msgi.text(&FieldPattern::family("product_name"))?;
    identity.revision = msgi.text(&FieldPattern::family("revision"))?;
    Ok(())
}

pub fn decode_psid(mgir: &RawRegister) -> Result<Option<String>> {
    mgir.text(&FieldPattern::family("psid"))
}

/// `extended_major.extended_minor.extended_sub_minor`; `None` unless all three are present
pub fn decode_firmware(mgir: &RawRegister) -> Result<Option<FirmwareVersion>> {
    let major = mgir.number("extended_major")?;
    let minor = mgir.number("extended_minor")?;
    let sub_minor = mgir.number("extended_sub_minor")?;

    Ok(match (major, minor, sub_minor) {
        (Some(major), Some(minor), Some(sub_minor)) => Some(FirmwareVersion { major, minor, sub_minor }),
        _ => None,
    })
}

pub fn decode_uptime(mgir: &RawRegister) -> Result<Option<Uptime>> {
    Ok(mgir.number("uptime")?.map(|seconds| Uptime { seconds }))
}

/// Two 32-bit halves, high word first, as 16 hex digits
pub fn decode_guid(spzr: &RawRegister) -> Result<Option<String>> {
    let Some(words) = spzr.extract(&FieldPattern::family_range("node_guid", 0..=1)) else {
        return Ok(None);
    };
    let [high, low] = words.as_slice() else {
        return Ok(None);
    };
    Ok(Some(format!("{:08x}{:08x}", parse_word(high)?, parse_word(low)?)))
}

pub fn decode_node_description(spzr: &RawRegister) -> Result<Option<String>> {
    let last = description::WORD_COUNT as u32 - 1;
    spzr.text(&FieldPattern::family_range(description::FIELD, 0..=last))
}
