/*
 * Integration tests for switchinfo
 *
 * These drive whole invocations (command line, action, register plan,
 * decoding and rendering) against a recording fake of the register tool.
 */

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use clap::Parser;
use sw_core::{
    Category, IndexParams, PortCountSource, RawRegister, RegisterDefinition, RegisterName, RegisterTool,
    SnapshotRequest, ToolVersion,
};
use sw_error::{Result, SwitchInfoError};
use switchinfo::cli::Cli;
use switchinfo::config::{load_settings, Settings};
use switchinfo::render::OutputFormat;
use switchinfo::runner::{execute, Action};

type Answer = dyn Fn(RegisterName, &IndexParams) -> Option<String> + Send + Sync;

struct RecordingTool {
    version: ToolVersion,
    answer: Box<Answer>,
    gets: Mutex<Vec<(RegisterName, String)>>,
    sets: Mutex<Vec<(String, String)>>,
}

impl RecordingTool {
    fn new(version: ToolVersion, answer: impl Fn(RegisterName, &IndexParams) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            version,
            answer: Box::new(answer),
            gets: Mutex::new(Vec::new()),
            sets: Mutex::new(Vec::new()),
        }
    }

    fn registers_read(&self) -> BTreeSet<RegisterName> {
        self.gets.lock().unwrap().iter().map(|(r, _)| *r).collect()
    }

    fn gets(&self) -> Vec<(RegisterName, String)> {
        self.gets.lock().unwrap().clone()
    }

    fn sets(&self) -> Vec<(String, String)> {
        self.sets.lock().unwrap().clone()
    }
}

impl RegisterTool for RecordingTool {
    fn get(&self, register: RegisterName, indexes: &IndexParams) -> Result<RawRegister> {
        self.gets.lock().unwrap().push((register, indexes.to_string()));
        match (self.answer)(register, indexes) {
            Some(text) => RawRegister::parse(register, &text),
            None => Err(SwitchInfoError::register_fetch(register.as_str(), "-E- Failed to send access register: ME_REG_ACCESS_BAD_PARAM")),
        }
    }

    fn definition(&self, register: RegisterName) -> Result<RegisterDefinition> {
        RegisterDefinition::parse(
            register,
            "Field Name    | Address (Bytes) | Offset (Bits) | Size (Bits) | Access\n\
             tacho_active  | 0x00000004      | 16            | 8           | RO\n",
        )
    }

    fn set(&self, _register: RegisterName, indexes: &IndexParams, values: &IndexParams) -> Result<()> {
        self.sets.lock().unwrap().push((indexes.to_string(), values.to_string()));
        Ok(())
    }

    fn version(&self) -> Result<ToolVersion> {
        Ok(self.version)
    }
}

struct FixedPorts(Option<u32>);

impl PortCountSource for FixedPorts {
    fn port_count(&self) -> Result<u32> {
        self.0.ok_or_else(|| SwitchInfoError::dependency("smpquery not found"))
    }
}

/// A healthy two-PSU switch with 32 module cages, module 1 seated
fn healthy(register: RegisterName, indexes: &IndexParams) -> Option<String> {
    let text = match register {
        RegisterName::Mgir => concat!(
            "Sending access register...\n\n",
            "Field Name            | Data\n",
            "===================================\n",
            "extended_major        | 0x0000001b\n",
            "extended_minor        | 0x000007d0\n",
            "extended_sub_minor    | 0x0000075e\n",
            "uptime                | 0x00042df2\n",
            "psid[0]               | 0x4d545f32\n",
            "psid[1]               | 0x36333031\n",
            "psid[2]               | 0x31300000\n",
            "===================================\n",
        ),
        RegisterName::Mgpir => "num_of_modules 0x00000020\n",
        RegisterName::Msgi => concat!(
            "serial_number[0] 0x4d543132\n",
            "serial_number[1] 0x33340000\n",
            "part_number[0] 0x4d534237\n",
            "part_number[1] 0x38303000\n",
        ),
        RegisterName::Spzr => concat!(
            "node_guid[0] 0x7cfe9003\n",
            "node_guid[1] 0x0300a1b2\n",
            "node_description[0] 0x7261636b\n",
            "node_description[1] 0x2d313200\n",
        ),
        RegisterName::Msps => concat!(
            "psu0[0] 0x50000001\n",
            "psu0[1] 0x00000002\n",
            "psu0[10] 0x80000064\n",
            "psu1[0] 0x50000001\n",
            "psu1[1] 0x00000002\n",
            "psu1[10] 0x8000005a\n",
        ),
        RegisterName::Mtmp => match indexes.get("sensor_index") {
            Some("0x0") => "temperature 0x108\nmax_temperature 0x148\n",
            Some("0x40") => "temperature 0xf0\n",
            _ => "temperature 0x0\n",
        },
        RegisterName::Mtcap => "sensor_count 0x2\n",
        RegisterName::Mfcr => "tacho_active 0xd2\n",
        RegisterName::Fore => "fan_under_limit 0x0\nfan_over_limit 0x0\n",
        RegisterName::Mfsm => match indexes.get("tacho") {
            Some("0x1") => "rpm 0x3390\n",
            _ => "rpm 0x18d3\n",
        },
    };
    Some(text.to_string())
}

fn without_mgpir(register: RegisterName, indexes: &IndexParams) -> Option<String> {
    if register == RegisterName::Mgpir {
        None
    } else {
        healthy(register, indexes)
    }
}

const V4_22: ToolVersion = ToolVersion::new(4, 22, 1);

fn query(category: Category, module_temps: bool, format: OutputFormat) -> Action {
    Action::Query {
        request: SnapshotRequest::new(category).with_module_temps(module_temps),
        format,
    }
}

#[tokio::test]
async fn test_inventory_reads_exactly_four_registers() {
    let expected: BTreeSet<RegisterName> =
        [RegisterName::Mgir, RegisterName::Msgi, RegisterName::Spzr, RegisterName::Msps].into_iter().collect();

    for module_temps in [false, true] {
        let tool = Arc::new(RecordingTool::new(V4_22, healthy));
        execute(query(Category::Inventory, module_temps, OutputFormat::Table), tool.clone(), Arc::new(FixedPorts(None)), None)
            .await
            .unwrap();
        assert_eq!(tool.registers_read(), expected);
        assert_eq!(tool.gets().len(), 4);
    }
}

#[tokio::test]
async fn test_vitals_survives_mgpir_failure() {
    let tool = Arc::new(RecordingTool::new(V4_22, without_mgpir));
    let out = execute(
        query(Category::Vitals, false, OutputFormat::Parseable),
        tool.clone(),
        Arc::new(FixedPorts(Some(41))),
        None,
    )
    .await
    .unwrap();

    let lines: Vec<&str> = out.lines().collect();
    assert!(lines.contains(&"port_count:40"));
    assert!(lines.contains(&"uptime:76:05:06"));
    assert!(lines.contains(&"psu1_power:100 W"));
    assert!(lines.contains(&"psu2_power:90 W"));
    assert!(lines.contains(&"asic_temp:33 C"));
    assert!(lines.contains(&"fan1_rpm:6600 RPM"));
    assert!(lines.contains(&"fan7_rpm:6355 RPM"));
    assert!(!out.contains("firmware"));
    assert!(!tool.registers_read().contains(&RegisterName::Fore));
}

#[tokio::test]
async fn test_mgpir_failure_without_fallback_is_dependency_error() {
    let tool = Arc::new(RecordingTool::new(V4_22, without_mgpir));
    let err = execute(query(Category::Status, false, OutputFormat::Table), tool, Arc::new(FixedPorts(None)), None)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_module_temperatures_follow_port_count() {
    let tool = Arc::new(RecordingTool::new(V4_22, healthy));
    let out = execute(query(Category::Status, true, OutputFormat::Parseable), tool.clone(), Arc::new(FixedPorts(None)), None)
        .await
        .unwrap();

    assert!(out.contains("module1_temp:30 C\n"));
    assert!(!out.contains("module2_temp"));
    let module_reads = tool
        .gets()
        .into_iter()
        .filter(|(r, idx)| *r == RegisterName::Mtmp && idx.split(',').next() != Some("sensor_index=0x0"))
        .count();
    assert_eq!(module_reads, 32);
}

#[tokio::test]
async fn test_all_as_json() {
    let tool = Arc::new(RecordingTool::new(V4_22, healthy));
    let out = execute(query(Category::All, false, OutputFormat::Json), tool, Arc::new(FixedPorts(None)), None)
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["category"], "all");
    assert_eq!(value["identity"]["firmware"]["minor"], 2000);
    assert_eq!(value["identity"]["part_number"], "MSB7800");
    assert_eq!(value["identity"]["node_description"], "rack-12");
    assert_eq!(value["identity"]["psid"], "MT_2630110");
    assert_eq!(value["power_supplies"].as_array().unwrap().len(), 2);
    assert_eq!(value["fans"]["rpm"]["4"], 6355);
    assert_eq!(value["fan_alarm"], "ok");
    assert_eq!(value["thermal"]["sensor_count"], 2);
}

#[tokio::test]
async fn test_set_description_writes_all_slots() {
    let tool = Arc::new(RecordingTool::new(V4_22, healthy));
    let out = execute(Action::SetDescription("rack-12".to_string()), tool.clone(), Arc::new(FixedPorts(None)), None)
        .await
        .unwrap();
    assert!(out.contains("rack-12"));
    assert!(tool.gets().is_empty());

    let sets = tool.sets();
    assert_eq!(sets.len(), 1);
    let (indexes, values) = &sets[0];
    assert_eq!(indexes, "swid=0x0");
    let slots: Vec<&str> = values.split(',').collect();
    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0], "node_description[0]=0x7261636b");
    assert_eq!(slots[1], "node_description[1]=0x2d313200");
    assert_eq!(slots[15], "node_description[15]=0x0");
}

#[tokio::test]
async fn test_old_tool_fails_before_any_query() {
    let tool = Arc::new(RecordingTool::new(ToolVersion::new(4, 10, 0), healthy));
    let err = execute(query(Category::All, false, OutputFormat::Table), tool.clone(), Arc::new(FixedPorts(None)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SwitchInfoError::Dependency(_)));
    assert!(tool.gets().is_empty());
}

#[tokio::test]
async fn test_register_failure_is_fatal() {
    let tool = Arc::new(RecordingTool::new(V4_22, |r, idx| {
        if r == RegisterName::Msgi {
            None
        } else {
            healthy(r, idx)
        }
    }));
    let err = execute(query(Category::Inventory, false, OutputFormat::Table), tool, Arc::new(FixedPorts(None)), None)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 5);
    assert!(err.to_string().contains("MSGI"));
}

#[tokio::test]
async fn test_command_line_to_report() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{ "default_output": "vitals" }"#).unwrap();

    let cli = Cli::try_parse_from(["switchinfo", "-d", "lid-0x1a", "-p", "--config", config.to_str().unwrap()]).unwrap();
    cli.validate().unwrap();
    let settings: Settings = load_settings(cli.config.as_deref()).unwrap();

    let tool = Arc::new(RecordingTool::new(V4_22, healthy));
    let out = execute(cli.action(&settings), tool.clone(), Arc::new(FixedPorts(None)), None).await.unwrap();
    assert!(out.starts_with("port_count:32\n"));
    assert!(!tool.registers_read().contains(&RegisterName::Msgi));
}

#[test]
fn test_get_set_conflict_is_configuration_error() {
    let cli = Cli::try_parse_from(["switchinfo", "-d", "lid-5", "-s", "rack-12", "-j"]).unwrap();
    let err = cli.validate().unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
