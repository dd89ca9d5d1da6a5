//! External tool adapters
//!
//! The register tool and the port-count tool are black boxes behind two
//! traits. The process-backed implementations shell out to `mlxreg` and
//! `smpquery`; tests substitute mocks or recording fakes.

use std::io;
use std::process::{Command, Output};

use sw_error::{Result, SwitchInfoError};
use tracing::{debug, trace};

use crate::constants::tools;
use crate::plan::IndexParams;
use crate::register::{RawRegister, RegisterDefinition, RegisterName};
use crate::version::ToolVersion;

/// Register access for one device
#[cfg_attr(test, mockall::automock)]
pub trait RegisterTool: Send + Sync {
    /// Read a register with the given index parameters
    fn get(&self, register: RegisterName, indexes: &IndexParams) -> Result<RawRegister>;

    /// Field layout of a register
    fn definition(&self, register: RegisterName) -> Result<RegisterDefinition>;

    /// Write `values` into the register instance selected by `indexes`
    fn set(&self, register: RegisterName, indexes: &IndexParams, values: &IndexParams) -> Result<()>;

    fn version(&self) -> Result<ToolVersion>;
}

/// Fallback source for the switch port count
#[cfg_attr(test, mockall::automock)]
pub trait PortCountSource: Send + Sync {
    fn port_count(&self) -> Result<u32>;
}

fn spawn_error(binary: &str, e: io::Error) -> SwitchInfoError {
    if e.kind() == io::ErrorKind::NotFound {
        SwitchInfoError::dependency(format!("{} not found: {}", binary, e))
    } else {
        SwitchInfoError::Io(e)
    }
}

/// The tool's own error text, preferring `-E-` lines
fn failure_message(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if let Some(line) = stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|l| l.starts_with(tools::ERROR_PREFIX))
    {
        return line.to_string();
    }

    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    match output.status.code() {
        Some(code) => format!("exited with status {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// `mlxreg` bound to one device
#[derive(Debug, Clone)]
pub struct MlxregTool {
    binary: String,
    device: String,
}

impl MlxregTool {
    pub fn new(binary: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            device: device.into(),
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    fn run(&self, register: RegisterName, args: &[String]) -> Result<String> {
        debug!("{} -d {} --reg_name {} {}", self.binary, self.device, register, args.join(" "));

        let output = Command::new(&self.binary)
            .args(["-d", &self.device, "--reg_name", register.as_str()])
            .args(args)
            .output()
            .map_err(|e| spawn_error(&self.binary, e))?;

        if !output.status.success() {
            return Err(SwitchInfoError::register_fetch(register.as_str(), failure_message(&output)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!("{} output:\n{}", register, stdout);
        Ok(stdout)
    }
}

impl RegisterTool for MlxregTool {
    fn get(&self, register: RegisterName, indexes: &IndexParams) -> Result<RawRegister> {
        let mut args = vec!["--get".to_string()];
        if !indexes.is_empty() {
            args.push("--indexes".to_string());
            args.push(indexes.to_string());
        }
        let stdout = self.run(register, &args)?;
        RawRegister::parse(register, &stdout)
    }

    fn definition(&self, register: RegisterName) -> Result<RegisterDefinition> {
        let stdout = self.run(register, &["--show_reg".to_string()])?;
        RegisterDefinition::parse(register, &stdout)
    }

    fn set(&self, register: RegisterName, indexes: &IndexParams, values: &IndexParams) -> Result<()> {
        let mut args = Vec::new();
        if !indexes.is_empty() {
            args.push("--indexes".to_string());
            args.push(indexes.to_string());
        }
        args.push("--set".to_string());
        args.push(values.to_string());
        args.push("--yes".to_string());

        let stdout = self.run(register, &args)?;
        if let Some(line) = stdout.lines().map(str::trim).find(|l| l.starts_with(tools::ERROR_PREFIX)) {
            return Err(SwitchInfoError::register_fetch(register.as_str(), line));
        }
        Ok(())
    }

    fn version(&self) -> Result<ToolVersion> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|e| spawn_error(&self.binary, e))?;

        if !output.status.success() {
            return Err(SwitchInfoError::dependency(format!(
                "{} --version failed: {}",
                self.binary,
                failure_message(&output)
            )));
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let version = ToolVersion::parse(&text)?;
        debug!("{} reports version {}", self.binary, version);
        Ok(version)
    }
}

/// Read `NumPorts` out of `smpquery nodeinfo` output (`NumPorts:........41`)
pub fn parse_num_ports(text: &str) -> Result<u32> {
    let re = regex::Regex::new(r"NumPorts:\.*\s*(\d+)").map_err(|e| SwitchInfoError::Generic(e.to_string()))?;
    let caps = re
        .captures(text)
        .ok_or_else(|| SwitchInfoError::decode("no NumPorts line in nodeinfo output"))?;
    caps[1]
        .parse()
        .map_err(|_| SwitchInfoError::decode(format!("NumPorts value '{}' out of range", &caps[1])))
}

/// `smpquery nodeinfo` against one LID
#[derive(Debug, Clone)]
pub struct SmpQuery {
    binary: String,
    lid: u32,
}

impl SmpQuery {
    pub fn new(binary: impl Into<String>, lid: u32) -> Self {
        Self {
            binary: binary.into(),
            lid,
        }
    }
}

impl PortCountSource for SmpQuery {
    fn port_count(&self) -> Result<u32> {
        debug!("{} nodeinfo {}", self.binary, self.lid);
        let output = Command::new(&self.binary)
            .args(["nodeinfo", &self.lid.to_string()])
            .output()
            .map_err(|e| spawn_error(&self.binary, e))?;

        if !output.status.success() {
            return Err(SwitchInfoError::register_fetch("nodeinfo", failure_message(&output)));
        }
        parse_num_ports(&String::from_utf8_lossy(&output.stdout))
    }
}
