//! switchinfo core library
//!
//! Register decoding and snapshot assembly for unmanaged switches queried
//! in-band through the vendor register tool.
//!
//! # Module Structure
//!
//! - `codec` / `register` - hex words, packed ASCII and register dumps
//! - `plan` / `version` - which registers to read, with which index parameters
//! - `decode/` - one decoder per entity (identity, PSU, thermal, fan, ports)
//! - `assemble` - concurrent fetch and snapshot assembly
//! - `write` - node description write
//! - `tool` - external tool adapters
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sw_core::{Assembler, Category, MlxregTool, RegisterTool, SmpQuery, SnapshotRequest};
//!
//! # async fn run() -> sw_error::Result<()> {
//! let tool = Arc::new(MlxregTool::new("mlxreg", "lid-5"));
//! let version = tool.version()?;
//! let ports = Arc::new(SmpQuery::new("smpquery", 5));
//! let snapshot = Assembler::new(tool, ports, version)
//!     .collect(SnapshotRequest::new(Category::Vitals))
//!     .await?;
//! println!("{:?}", snapshot.uptime);
//! # Ok(())
//! # }
//! ```

// Grouped modules
pub mod data;
pub mod decode;

// Standalone modules
pub mod assemble;
pub mod codec;
pub mod constants;
pub mod plan;
pub mod register;
pub mod tool;
pub mod version;
pub mod write;

pub use assemble::{Assembler, FetchKey, SnapshotRequest};
pub use codec::ClockStyle;
pub use data::{
    DeviceIdentity, FanAlarmStatus, FanReading, FirmwareVersion, Health, PowerSupplyUnit, Snapshot,
    ThermalReading, Uptime,
};
pub use plan::{index_params_for, plan_for, Category, IndexParams, RegisterPlan};
pub use register::{FieldPattern, RawRegister, RegisterDefinition, RegisterName};
pub use tool::{MlxregTool, PortCountSource, RegisterTool, SmpQuery};
pub use version::ToolVersion;
pub use write::NodeDescriptionWrite;
