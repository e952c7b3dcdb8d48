//! Optional documentation blocks consumed by the metadata generator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolboxDocumentation {
    pub summary: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub credits: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub use_limitations: String,
}

/// Dialog and scripting help for one parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterSyntax {
    pub dialog_explanation: String,
    pub scripting_explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeSample {
    pub title: String,
    pub description: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolDocumentation {
    pub summary: String,
    pub usage: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub credits: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub use_limitations: String,
    /// Keyed by parameter name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameter_syntax: BTreeMap<String, ParameterSyntax>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_samples: Vec<CodeSample>,
}
