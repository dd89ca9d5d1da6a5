//! Port/module count (MGPIR, with an in-band fallback)

use sw_error::Result;
use tracing::{debug, warn};

use crate::register::RawRegister;
use crate::tool::PortCountSource;

/// `num_of_modules` when MGPIR reports a usable non-zero value
pub fn modules_from_mgpir(mgpir: &RawRegister) -> Option<u32> {
    match mgpir.number("num_of_modules") {
        Ok(Some(0)) | Ok(None) => None,
        Ok(Some(n)) => u32::try_from(n).ok(),
        Err(e) => {
            warn!("ignoring MGPIR num_of_modules: {}", e);
            None
        }
    }
}

/// The protocol reports one port more than the front panel on some models
pub fn even_port_count(reported: u32) -> u32 {
    if reported % 2 == 1 {
        reported - 1
    } else {
        reported
    }
}

/// MGPIR first, else the port-count source
pub fn resolve_port_count(mgpir: Option<&RawRegister>, fallback: &dyn PortCountSource) -> Result<u32> {
    if let Some(n) = mgpir.and_then(modules_from_mgpir) {
        return Ok(n);
    }
    debug!("MGPIR gave no module count, asking the port-count source");
    Ok(even_port_count(fallback.port_count()?))
}
