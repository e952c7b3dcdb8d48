//! Registry documents (`toolbox.yml`): toolbox metadata plus tool references.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use super::documentation::ToolboxDocumentation;
use super::{CONFIG_EXTENSIONS, Document};
use crate::error::SchemaError;

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolboxMetadata {
    /// Display name
    pub label: String,
    /// Identifier-safe name, `^[A-Za-z][A-Za-z0-9]*$`
    pub alias: String,
    pub description: String,
    /// Defaults to `1.0.0`
    #[serde(default = "default_version")]
    pub version: String,
}

/// Check the toolbox alias format: a letter followed by letters or digits
pub fn is_valid_alias(alias: &str) -> bool {
    let mut chars = alias.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// Entry in the registry pointing at one tool document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolReference {
    pub name: String,
    /// Defaults to true
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Registry-relative path; backslashes are normalized to `/`
    #[serde(deserialize_with = "forward_slashes")]
    pub config: String,
}

impl ToolReference {
    pub fn new(name: impl Into<String>, config: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            config: config.into().replace('\\', "/"),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn has_config_extension(&self) -> bool {
        CONFIG_EXTENSIONS
            .iter()
            .any(|ext| self.config.len() > ext.len() + 1 && self.config.ends_with(&format!(".{}", ext)))
    }
}

fn forward_slashes<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.replace('\\', "/"))
}

/// A complete registry document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolboxConfig {
    pub toolbox: ToolboxMetadata,
    pub tools: Vec<ToolReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<ToolboxDocumentation>,
}

impl ToolboxConfig {
    /// Construct from a raw YAML mapping, checking shape then invariants
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let doc = Document::root(value)?;
        doc.deny_unknown(&["toolbox", "tools", "documentation"])?;

        let config = Self {
            toolbox: doc.required("toolbox")?,
            tools: doc.list("tools")?,
            documentation: doc.optional("documentation")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Cross-field invariants: alias format, reference paths, unique names
    pub fn validate(&self) -> Result<(), SchemaError> {
        if !is_valid_alias(&self.toolbox.alias) {
            return Err(SchemaError::new(
                "toolbox.alias",
                format!(
                    "'{}' must start with a letter and contain only letters and digits",
                    self.toolbox.alias
                ),
            ));
        }

        for (i, reference) in self.tools.iter().enumerate() {
            if !reference.has_config_extension() {
                return Err(SchemaError::new(
                    format!("tools[{}].config", i),
                    format!(
                        "config path must end with .{}: {}",
                        CONFIG_EXTENSIONS.join(" or ."),
                        reference.config
                    ),
                ));
            }
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for reference in &self.tools {
            *counts.entry(reference.name.as_str()).or_default() += 1;
        }
        let duplicates: Vec<&str> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name)
            .collect();
        if !duplicates.is_empty() {
            return Err(SchemaError::new(
                "tools",
                format!("Duplicate tool names found: {}", duplicates.join(", ")),
            ));
        }

        Ok(())
    }

    /// References with `enabled: true`, in registry order
    pub fn enabled_tools(&self) -> impl Iterator<Item = &ToolReference> {
        self.tools.iter().filter(|t| t.enabled)
    }

    pub fn find(&self, name: &str) -> Option<&ToolReference> {
        self.tools.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<ToolboxConfig, SchemaError> {
        ToolboxConfig::from_value(&serde_yaml::from_str(yaml).unwrap())
    }

    const REGISTRY: &str = r#"
toolbox:
  label: Spatial Analysis
  alias: spatialanalysis
  description: Buffer and clip tools
tools:
  - name: buffer_analysis
    config: tools/buffer_analysis.yml
  - name: clip_features
    enabled: false
    config: tools\clip_features\tool.yml
"#;

    #[test]
    fn test_parse_registry() {
        let config = parse(REGISTRY).unwrap();
        assert_eq!(config.toolbox.label, "Spatial Analysis");
        assert_eq!(config.toolbox.version, "1.0.0");
        assert_eq!(config.tools.len(), 2);
        assert!(config.tools[0].enabled);
        assert!(!config.tools[1].enabled);
        assert!(config.documentation.is_none());
    }

    #[test]
    fn test_backslashes_are_normalized() {
        let config = parse(REGISTRY).unwrap();
        assert_eq!(config.tools[1].config, "tools/clip_features/tool.yml");
    }

    #[test]
    fn test_enabled_tools() {
        let config = parse(REGISTRY).unwrap();
        let names: Vec<_> = config.enabled_tools().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["buffer_analysis"]);
        assert!(config.find("clip_features").is_some());
        assert!(config.find("dissolve").is_none());
    }

    #[test]
    fn test_alias_validation() {
        assert!(is_valid_alias("abc1"));
        assert!(is_valid_alias("Spatial"));
        assert!(!is_valid_alias("1abc"));
        assert!(!is_valid_alias("spatial_analysis"));
        assert!(!is_valid_alias("spatial-analysis"));
        assert!(!is_valid_alias(""));
    }

    #[test]
    fn test_alias_starting_with_digit_fails_construction() {
        let err = parse("toolbox: {label: L, alias: 1abc, description: d}").unwrap_err();
        assert_eq!(err.path, "toolbox.alias");
        assert!(err.message.contains("'1abc'"));

        assert!(parse("toolbox: {label: L, alias: abc1, description: d}").is_ok());
    }

    #[test]
    fn test_tools_default_to_empty() {
        let config = parse("toolbox: {label: L, alias: a, description: d, version: 2.1.0}").unwrap();
        assert!(config.tools.is_empty());
        assert_eq!(config.toolbox.version, "2.1.0");
    }

    #[test]
    fn test_missing_toolbox_section() {
        let err = parse("tools: []").unwrap_err();
        assert_eq!(err.path, "toolbox");
        assert_eq!(err.message, "required field is missing");
    }

    #[test]
    fn test_missing_metadata_field() {
        let err = parse("toolbox: {label: L, alias: a}").unwrap_err();
        assert_eq!(err.path, "toolbox");
        assert!(err.message.contains("missing field `description`"));
    }

    #[test]
    fn test_duplicate_tool_names() {
        let err = parse(
            r#"
toolbox: {label: L, alias: a, description: d}
tools:
  - {name: buffer, config: a.yml}
  - {name: clip, config: b.yml}
  - {name: buffer, config: c.yml}
"#,
        )
        .unwrap_err();
        assert_eq!(err.path, "tools");
        assert!(err.message.contains("buffer"));
        assert!(!err.message.contains("clip"));
    }

    #[test]
    fn test_duplicate_names_are_case_sensitive() {
        let config = parse(
            r#"
toolbox: {label: L, alias: a, description: d}
tools:
  - {name: Buffer, config: a.yml}
  - {name: buffer, config: b.yml}
"#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn test_config_extension_required() {
        let err = parse(
            r#"
toolbox: {label: L, alias: a, description: d}
tools:
  - {name: buffer, config: tools/buffer.json}
"#,
        )
        .unwrap_err();
        assert_eq!(err.path, "tools[0].config");
    }

    #[test]
    fn test_yaml_extension_accepted() {
        let config = parse(
            r#"
toolbox: {label: L, alias: a, description: d}
tools:
  - {name: buffer, config: tools/buffer.yaml}
"#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn test_bad_reference_reports_element_path() {
        let err = parse(
            r#"
toolbox: {label: L, alias: a, description: d}
tools:
  - {name: buffer, config: a.yml}
  - {name: clip, enabled: sometimes, config: b.yml}
"#,
        )
        .unwrap_err();
        assert_eq!(err.path, "tools[1]");
    }

    #[test]
    fn test_unknown_top_level_field() {
        let err = parse("toolbox: {label: L, alias: a, description: d}\ntoolz: []").unwrap_err();
        assert_eq!(err.path, "toolz");
    }

    #[test]
    fn test_reference_builder() {
        let reference = ToolReference::new("clip", "tools\\clip.yml").disabled();
        assert_eq!(reference.config, "tools/clip.yml");
        assert!(!reference.enabled);
    }
}
