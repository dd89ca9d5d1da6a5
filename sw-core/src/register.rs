//! Register dumps and field extraction
//!
//! `RawRegister` holds the `field value` pairs one register query returned, in
//! emission order. Multi-word values are spread over an indexed family
//! (`serial_number[0]`, `serial_number[1]`, ...) and the tool does not promise
//! to print a family in index order, so every family read sorts by the
//! bracketed index first.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sw_error::{Result, SwitchInfoError};
use tracing::{trace, warn};

use crate::codec::{hex_to_decimal, hex_words_to_text};
use crate::constants::tools;

/// Registers this tool knows how to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegisterName {
    Mgir,
    Mgpir,
    Msgi,
    Msps,
    Spzr,
    Mtmp,
    Mtcap,
    Mfcr,
    Fore,
    Mfsm,
}

impl RegisterName {
    pub const ALL: [RegisterName; 10] = [
        RegisterName::Mgir,
        RegisterName::Mgpir,
        RegisterName::Msgi,
        RegisterName::Msps,
        RegisterName::Spzr,
        RegisterName::Mtmp,
        RegisterName::Mtcap,
        RegisterName::Mfcr,
        RegisterName::Fore,
        RegisterName::Mfsm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegisterName::Mgir => "MGIR",
            RegisterName::Mgpir => "MGPIR",
            RegisterName::Msgi => "MSGI",
            RegisterName::Msps => "MSPS",
            RegisterName::Spzr => "SPZR",
            RegisterName::Mtmp => "MTMP",
            RegisterName::Mtcap => "MTCAP",
            RegisterName::Mfcr => "MFCR",
            RegisterName::Fore => "FORE",
            RegisterName::Mfsm => "MFSM",
        }
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegisterName {
    type Err = SwitchInfoError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_uppercase();
        RegisterName::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| SwitchInfoError::configuration(format!("unknown register '{}'", s)))
    }
}

/// Which fields of a dump to extract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPattern<'a> {
    /// A single field, e.g. `uptime`
    Literal(&'a str),
    /// Every `base[N]` field, optionally restricted to an index range
    Family {
        base: &'a str,
        range: Option<RangeInclusive<u32>>,
    },
}

impl<'a> FieldPattern<'a> {
    pub fn family(base: &'a str) -> Self {
        FieldPattern::Family { base, range: None }
    }

    pub fn family_range(base: &'a str, range: RangeInclusive<u32>) -> Self {
        FieldPattern::Family { base, range: Some(range) }
    }
}

/// `name` or `name[N]`, where name is an identifier
fn is_field_name(candidate: &str) -> bool {
    let base = match split_indexed(candidate) {
        Some((base, _)) => base,
        None if candidate.contains('[') => return false,
        None => candidate,
    };
    let mut chars = base.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split `base[N]` into its base and index
fn split_indexed(name: &str) -> Option<(&str, u32)> {
    let open = name.find('[')?;
    let index = name[open + 1..].strip_suffix(']')?.parse().ok()?;
    Some((&name[..open], index))
}

fn is_noise_line(line: &str) -> bool {
    line.is_empty()
        || line.starts_with("===")
        || line.starts_with("---")
        || line.starts_with(tools::INFO_PREFIX)
        || line.starts_with("Field Name")
        || line.starts_with("Sending access register")
}

/// One register query result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRegister {
    name: RegisterName,
    fields: Vec<(String, String)>,
}

impl RawRegister {
    pub fn new(name: RegisterName) -> Self {
        Self { name, fields: Vec::new() }
    }

    /// Parse tool output. Accepts `field value` and `field | value` lines and
    /// skips banners, headers and separators. A `-E-` line is a fetch error.
    pub fn parse(name: RegisterName, text: &str) -> Result<Self> {
        let mut dump = RawRegister::new(name);

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.starts_with(tools::ERROR_PREFIX) {
                return Err(SwitchInfoError::register_fetch(name.as_str(), line));
            }
            if is_noise_line(line) {
                continue;
            }

            let (field, value) = match line.split_once('|') {
                Some((f, v)) => (f.trim(), v.split('|').next().unwrap_or("").trim()),
                None => {
                    let mut parts = line.split_whitespace();
                    match (parts.next(), parts.next(), parts.next()) {
                        (Some(f), Some(v), None) => (f, v),
                        _ => {
                            trace!("{}: skipping line that is not a field/value pair: {}", name, line);
                            continue;
                        }
                    }
                }
            };

            if value.is_empty() || !is_field_name(field) {
                trace!("{}: skipping unrecognised line: {}", name, line);
                continue;
            }
            dump.insert(field, value);
        }

        Ok(dump)
    }

    /// Add or replace a field, keeping first-seen position
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn name(&self) -> RegisterName {
        self.name
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| f == name)
            .map(|(_, v)| v.as_str())
    }

    /// Members of `base[N]` as (N, value), sorted by N
    pub fn family(&self, base: &str) -> Vec<(u32, &str)> {
        let mut members: Vec<(u32, &str)> = self
            .fields
            .iter()
            .filter_map(|(f, v)| match split_indexed(f) {
                Some((b, idx)) if b == base => Some((idx, v.as_str())),
                _ => None,
            })
            .collect();
        members.sort_by_key(|(idx, _)| *idx);
        members
    }

    /// Raw values matching `pattern`, family members in index order.
    /// `None` when nothing matches, or when a family has a hole: members
    /// must run without gaps from the range start (0 without a range).
    /// Trailing members may be absent.
    pub fn extract(&self, pattern: &FieldPattern<'_>) -> Option<Vec<&str>> {
        let values: Vec<&str> = match pattern {
            FieldPattern::Literal(name) => self.field(name).into_iter().collect(),
            FieldPattern::Family { base, range } => {
                let members: Vec<(u32, &str)> = self
                    .family(base)
                    .into_iter()
                    .filter(|(idx, _)| range.as_ref().map_or(true, |r| r.contains(idx)))
                    .collect();
                let first = range.as_ref().map_or(0, |r| *r.start());
                if let Some((_, missing)) = members.iter().zip(first..).find(|((idx, _), expected)| idx != expected) {
                    warn!("{}: {}[{}] missing, value unavailable", self.name, base, missing);
                    return None;
                }
                members.into_iter().map(|(_, v)| v).collect()
            }
        };
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }

    /// Numeric value of a literal field
    pub fn number(&self, name: &str) -> Result<Option<u64>> {
        self.field(name).map(hex_to_decimal).transpose()
    }

    /// Packed ASCII held by the fields matching `pattern`. Empty strings are
    /// reported as absent.
    pub fn text(&self, pattern: &FieldPattern<'_>) -> Result<Option<String>> {
        let Some(words) = self.extract(pattern) else {
            return Ok(None);
        };
        let text = hex_words_to_text(&words)?;
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    /// Instance numbers N of fields shaped `{stem}N[M]`, e.g. PSUs in MSPS
    pub fn instance_indices(&self, stem: &str) -> BTreeSet<u32> {
        self.fields
            .iter()
            .filter_map(|(f, _)| split_indexed(f))
            .filter_map(|(base, _)| base.strip_prefix(stem)?.parse().ok())
            .collect()
    }
}

/// One row of a register definition (`--show_reg`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub offset_bits: u32,
    pub size_bits: u32,
}

/// Self-describing layout of a register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDefinition {
    pub register: RegisterName,
    pub fields: Vec<FieldDefinition>,
}

fn parse_small_number(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.starts_with("0x") || raw.starts_with("0X") {
        hex_to_decimal(raw).ok().and_then(|v| u32::try_from(v).ok())
    } else {
        raw.parse().ok()
    }
}

impl RegisterDefinition {
    /// Parse `Field Name | Address (Bytes) | Offset (Bits) | Size (Bits) | Access` rows
    pub fn parse(register: RegisterName, text: &str) -> Result<Self> {
        let mut fields = Vec::new();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.starts_with(tools::ERROR_PREFIX) {
                return Err(SwitchInfoError::register_fetch(register.as_str(), line));
            }
            if is_noise_line(line) {
                continue;
            }

            let columns: Vec<&str> = if line.contains('|') {
                line.split('|').map(str::trim).collect()
            } else {
                line.split_whitespace().collect()
            };
            if columns.len() < 4 || !is_field_name(columns[0]) {
                continue;
            }

            match (parse_small_number(columns[2]), parse_small_number(columns[3])) {
                (Some(offset_bits), Some(size_bits)) => fields.push(FieldDefinition {
                    name: columns[0].to_string(),
                    offset_bits,
                    size_bits,
                }),
                _ => trace!("{}: skipping definition row: {}", register, line),
            }
        }

        Ok(Self { register, fields })
    }

    pub fn size_of(&self, field: &str) -> Option<u32> {
        self.fields.iter().find(|f| f.name == field).map(|f| f.size_bits)
    }
}
