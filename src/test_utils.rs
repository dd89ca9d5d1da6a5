/*
 * Test utilities for switchinfo
 *
 * Scripted stand-ins for the register tool and the port-count source, and
 * helpers that build register dumps in the tool's `field value` format.
 */

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use sw_core::{
    IndexParams, PortCountSource, RawRegister, RegisterDefinition, RegisterName, RegisterTool, ToolVersion,
};
use sw_error::{Result, SwitchInfoError};

/// Render `(field, value)` pairs as tool output
pub fn dump(fields: &[(&str, &str)]) -> String {
    fields.iter().map(|(f, v)| format!("{} {}\n", f, v)).collect()
}

/// Answers from canned dumps; registers without one fail like the tool does
pub struct ScriptedTool {
    version: ToolVersion,
    version_delay: Option<Duration>,
    dumps: HashMap<RegisterName, String>,
    definitions: HashMap<RegisterName, String>,
    fetched: Mutex<Vec<RegisterName>>,
    writes: Mutex<Vec<String>>,
}

impl ScriptedTool {
    pub fn new(version: ToolVersion) -> Self {
        Self {
            version,
            version_delay: None,
            dumps: HashMap::new(),
            definitions: HashMap::new(),
            fetched: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, register: RegisterName, text: String) -> Self {
        self.dumps.insert(register, text);
        self
    }

    /// Make `version()` stall like a hung tool
    pub fn with_version_delay(mut self, delay: Duration) -> Self {
        self.version_delay = Some(delay);
        self
    }

    pub fn with_definition(mut self, register: RegisterName, text: &str) -> Self {
        self.definitions.insert(register, text.to_string());
        self
    }

    /// Registers read so far, in call order
    pub fn fetched(&self) -> Vec<RegisterName> {
        self.fetched.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// `--set` payloads so far
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl RegisterTool for ScriptedTool {
    fn get(&self, register: RegisterName, _indexes: &IndexParams) -> Result<RawRegister> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(register);
        }
        match self.dumps.get(&register) {
            Some(text) => RawRegister::parse(register, text),
            None => Err(SwitchInfoError::register_fetch(register.as_str(), "-E- Register access failed")),
        }
    }

    fn definition(&self, register: RegisterName) -> Result<RegisterDefinition> {
        match self.definitions.get(&register) {
            Some(text) => RegisterDefinition::parse(register, text),
            None => Err(SwitchInfoError::register_fetch(register.as_str(), "-E- No definition")),
        }
    }

    fn set(&self, _register: RegisterName, _indexes: &IndexParams, values: &IndexParams) -> Result<()> {
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(values.to_string());
        }
        Ok(())
    }

    fn version(&self) -> Result<ToolVersion> {
        if let Some(delay) = self.version_delay {
            std::thread::sleep(delay);
        }
        Ok(self.version)
    }
}

pub struct ScriptedPorts {
    answer: Option<u32>,
}

impl ScriptedPorts {
    pub fn answering(ports: u32) -> Self {
        Self { answer: Some(ports) }
    }

    pub fn failing() -> Self {
        Self { answer: None }
    }
}

impl PortCountSource for ScriptedPorts {
    fn port_count(&self) -> Result<u32> {
        self.answer
            .ok_or_else(|| SwitchInfoError::dependency("smpquery not available in tests"))
    }
}
