//! Node description write (SPZR)

use sw_error::{Result, SwitchInfoError};
use tracing::info;

use crate::codec::text_to_hex_words;
use crate::constants::{description, versions};
use crate::plan::{base_params, index_params_for, IndexParams};
use crate::register::RegisterName;
use crate::tool::RegisterTool;
use crate::version::ToolVersion;

/// A validated, encoded SPZR write. Every description word is set, so a
/// shorter description never leaves old characters behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptionWrite {
    description: String,
    indexes: IndexParams,
    values: IndexParams,
}

impl NodeDescriptionWrite {
    pub fn build(text: &str, version: ToolVersion) -> Result<Self> {
        if text.chars().count() > description::MAX_LEN {
            return Err(SwitchInfoError::configuration(format!(
                "node description is {} characters, the limit is {}",
                text.chars().count(),
                description::MAX_LEN
            )));
        }
        let words = text_to_hex_words(text)?;
        version.ensure_at_least(ToolVersion::from_tuple(versions::WRITE_MINIMUM), "setting the node description")?;

        let mut values = IndexParams::new();
        for slot in 0..description::WORD_COUNT {
            let value = match words.get(slot) {
                Some(word) => format!("0x{}", word),
                None => "0x0".to_string(),
            };
            values.push(&format!("{}[{}]", description::FIELD, slot), value);
        }

        Ok(Self {
            description: text.to_string(),
            indexes: index_params_for(RegisterName::Spzr, base_params(RegisterName::Spzr), version),
            values,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn indexes(&self) -> &IndexParams {
        &self.indexes
    }

    pub fn values(&self) -> &IndexParams {
        &self.values
    }

    pub fn apply(&self, tool: &dyn RegisterTool) -> Result<()> {
        info!("Setting node description to '{}'", self.description);
        tool.set(RegisterName::Spzr, &self.indexes, &self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::MockRegisterTool;

    const V418: ToolVersion = ToolVersion::new(4, 18, 0);

    #[test]
    fn test_rack_12_fills_all_sixteen_slots() {
        let write = NodeDescriptionWrite::build("rack-12", V418).unwrap();
        let pairs = write.values().pairs();
        assert_eq!(pairs.len(), 16);
        assert_eq!(pairs[0], ("node_description[0]".to_string(), "0x7261636b".to_string()));
        assert_eq!(pairs[1], ("node_description[1]".to_string(), "0x2d313200".to_string()));
        assert!(pairs[2..].iter().all(|(_, v)| v == "0x0"));
        assert_eq!(pairs[15].0, "node_description[15]");
        assert_eq!(write.indexes().to_string(), "swid=0x0");
    }

    #[test]
    fn test_indexes_follow_version_rules() {
        let write = NodeDescriptionWrite::build("leaf", ToolVersion::new(4, 23, 0)).unwrap();
        assert_eq!(write.indexes().to_string(), "router_entity=0x0,swid=0x0");
    }

    #[test]
    fn test_length_limit() {
        let max = "x".repeat(64);
        let write = NodeDescriptionWrite::build(&max, V418).unwrap();
        assert!(write.values().pairs().iter().all(|(_, v)| v == "0x78787878"));

        let err = NodeDescriptionWrite::build(&"x".repeat(65), V418).unwrap_err();
        assert!(matches!(err, SwitchInfoError::Configuration(_)));
    }

    #[test]
    fn test_non_ascii_rejected() {
        assert_eq!(NodeDescriptionWrite::build("räck", V418).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn test_old_tool_rejected() {
        let err = NodeDescriptionWrite::build("rack-12", ToolVersion::new(4, 17, 9)).unwrap_err();
        assert!(matches!(err, SwitchInfoError::Dependency(_)));
    }

    #[test]
    fn test_apply_issues_one_set() {
        let mut tool = MockRegisterTool::new();
        tool.expect_set()
            .withf(|r, idx, values| {
                *r == RegisterName::Spzr
                    && idx.to_string() == "swid=0x0"
                    && values.to_string().starts_with("node_description[0]=0x7261636b,node_description[1]=0x2d313200,")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        NodeDescriptionWrite::build("rack-12", V418).unwrap().apply(&tool).unwrap();
    }
}
