//! Tool documents: metadata, implementation reference and parameters.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::Document;
use super::documentation::ToolDocumentation;
use super::implementation::ImplementationConfig;
use super::parameter::ParameterConfig;
use crate::error::SchemaError;

/// File stem of a tool document in the folder-per-tool layout
pub const FOLDER_TOOL_STEM: &str = "tool";

fn default_category() -> String {
    "General".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolMetadata {
    /// Must match the document's file name (or folder name)
    pub name: String,
    pub label: String,
    pub description: String,
    /// Defaults to `General`
    #[serde(default = "default_category")]
    pub category: String,
    /// Defaults to false
    #[serde(rename = "canRunInBackground", default)]
    pub can_run_in_background: bool,
}

/// A complete tool document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolConfig {
    pub tool: ToolMetadata,
    pub implementation: ImplementationConfig,
    pub parameters: Vec<ParameterConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<ToolDocumentation>,
}

impl ToolConfig {
    /// Construct from a raw YAML mapping, checking shape then invariants
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let doc = Document::root(value)?;
        doc.deny_unknown(&["tool", "implementation", "parameters", "documentation"])?;

        let config = Self {
            tool: doc.required("tool")?,
            implementation: doc.required("implementation")?,
            parameters: doc.required_list("parameters")?,
            documentation: doc.optional("documentation")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parameter indices must be exactly `0..len`
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for param in &self.parameters {
            if !seen.insert(param.index) {
                duplicates.insert(param.index);
            }
        }

        let expected: BTreeSet<u32> = (0..self.parameters.len() as u32).collect();
        let missing: Vec<u32> = expected.difference(&seen).copied().collect();
        let extra: Vec<u32> = seen.difference(&expected).copied().collect();

        let mut problems = Vec::new();
        if !duplicates.is_empty() {
            problems.push(format!("Duplicate parameter indices found: {:?}", duplicates));
        }
        if !missing.is_empty() {
            problems.push(format!("Missing indices: {:?}", missing));
        }
        if !extra.is_empty() {
            problems.push(format!(
                "Invalid indices (should be 0-{}): {:?}",
                self.parameters.len().saturating_sub(1),
                extra
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::new("parameters", problems.join("; ")))
        }
    }

    /// Tool name implied by a document path: the parent folder for
    /// `<name>/tool.yml`, otherwise the file stem
    pub fn expected_name(path: &Path) -> Option<String> {
        let stem = path.file_stem()?.to_str()?;
        if stem == FOLDER_TOOL_STEM {
            path.parent()?.file_name()?.to_str().map(str::to_string)
        } else {
            Some(stem.to_string())
        }
    }

    /// Check `tool.name` against the document path
    pub fn check_name(&self, path: &Path) -> Result<(), SchemaError> {
        match Self::expected_name(path) {
            Some(expected) if expected == self.tool.name => Ok(()),
            expected => Err(SchemaError::new(
                "tool.name",
                format!(
                    "Tool name '{}' doesn't match expected '{}' (from path: {})",
                    self.tool.name,
                    expected.unwrap_or_default(),
                    path.display()
                ),
            )),
        }
    }

    pub fn name(&self) -> &str {
        &self.tool.name
    }

    pub fn label(&self) -> &str {
        &self.tool.label
    }

    /// Parameters in host order (ascending index), whatever the document order
    pub fn sorted_parameters(&self) -> Vec<ParameterConfig> {
        let mut params = self.parameters.clone();
        params.sort_by_key(|p| p.index);
        params
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterConfig> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
