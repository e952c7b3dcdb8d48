//! Configuration schema - typed registry and tool documents
//!
//! Documents are read as raw YAML mappings and constructed in two passes: every
//! top-level field (and every list element) is shape-checked on its own, so a
//! failure carries an exact field path; cross-field invariants run once all
//! fields are well-typed.

mod documentation;
mod implementation;
mod parameter;
mod tool;
mod toolbox;
mod value;

pub use documentation::{CodeSample, ParameterSyntax, ToolDocumentation, ToolboxDocumentation};
pub use implementation::{ImplementationConfig, ImplementationPath, ImplementationPathError};
pub use parameter::{
    CheckKind, Direction, ParameterConfig, ParameterFilter, ParameterType, Pattern, ValidationCheck,
};
pub use tool::{FOLDER_TOOL_STEM, ToolConfig, ToolMetadata};
pub use toolbox::{ToolReference, ToolboxConfig, ToolboxMetadata, is_valid_alias};
pub use value::{ParameterInput, ParameterValue, Scalar};

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::error::SchemaError;

/// Extensions accepted for registry and tool documents
pub const CONFIG_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Human name of a YAML node kind, for expected-vs-actual messages
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Reads typed fields out of one raw mapping, tracking field paths.
pub(crate) struct Document<'a> {
    map: &'a Mapping,
    prefix: String,
}

impl<'a> Document<'a> {
    /// The document root, which must be a mapping
    pub fn root(value: &'a Value) -> Result<Self, SchemaError> {
        Self::at(value, "")
    }

    pub fn at(value: &'a Value, prefix: &str) -> Result<Self, SchemaError> {
        match value {
            Value::Mapping(map) => Ok(Self {
                map,
                prefix: prefix.to_string(),
            }),
            other => Err(SchemaError::new(
                prefix,
                format!("expected a mapping, found {}", kind_of(other)),
            )),
        }
    }

    /// Reject keys outside `allowed`
    pub fn deny_unknown(&self, allowed: &[&str]) -> Result<(), SchemaError> {
        for key in self.map.keys() {
            match key.as_str() {
                Some(k) if allowed.contains(&k) => {}
                Some(k) => {
                    return Err(SchemaError::new(
                        join_path(&self.prefix, k),
                        format!("unknown field, expected one of: {}", allowed.join(", ")),
                    ));
                }
                None => {
                    return Err(SchemaError::new(
                        self.prefix.clone(),
                        format!("field names must be strings, found {}", kind_of(key)),
                    ));
                }
            }
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn convert<T: DeserializeOwned>(value: &Value, path: &str) -> Result<T, SchemaError> {
        serde_yaml::from_value(value.clone()).map_err(|e| SchemaError::new(path, e.to_string()))
    }

    pub fn required<T: DeserializeOwned>(&self, key: &str) -> Result<T, SchemaError> {
        let path = join_path(&self.prefix, key);
        match self.get(key) {
            Some(value) => Self::convert(value, &path),
            None => Err(SchemaError::missing(path)),
        }
    }

    pub fn optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SchemaError> {
        let path = join_path(&self.prefix, key);
        self.get(key).map(|value| Self::convert(value, &path)).transpose()
    }

    /// A list whose elements are each converted at their own path
    /// (`parameters[3]`); a missing list is empty
    pub fn list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, SchemaError> {
        match self.get(key) {
            Some(value) => self.elements(key, value),
            None => Ok(Vec::new()),
        }
    }

    pub fn required_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, SchemaError> {
        match self.map.get(key) {
            Some(Value::Null) => Ok(Vec::new()),
            Some(value) => self.elements(key, value),
            None => Err(SchemaError::missing(join_path(&self.prefix, key))),
        }
    }

    fn elements<T: DeserializeOwned>(&self, key: &str, value: &Value) -> Result<Vec<T>, SchemaError> {
        let path = join_path(&self.prefix, key);
        let items = value
            .as_sequence()
            .ok_or_else(|| SchemaError::new(&path, format!("expected a sequence, found {}", kind_of(value))))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Self::convert(item, &format!("{}[{}]", path, i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_root_must_be_mapping() {
        let value = yaml("- a\n- b");
        let err = Document::root(&value).err().unwrap();
        assert_eq!(err.message, "expected a mapping, found a sequence");
    }

    #[test]
    fn test_required_missing_field() {
        let value = yaml("a: 1");
        let doc = Document::root(&value).unwrap();
        let err = doc.required::<u32>("b").unwrap_err();
        assert_eq!(err.path, "b");
        assert_eq!(err.message, "required field is missing");
    }

    #[test]
    fn test_required_wrong_type_reports_path() {
        let value = yaml("count: many");
        let doc = Document::at(&value, "outer").unwrap();
        let err = doc.required::<u32>("count").unwrap_err();
        assert_eq!(err.path, "outer.count");
        assert!(err.message.contains("invalid type"));
    }

    #[test]
    fn test_optional_null_is_none() {
        let value = yaml("a: ~");
        let doc = Document::root(&value).unwrap();
        assert_eq!(doc.optional::<String>("a").unwrap(), None);
        assert_eq!(doc.optional::<String>("b").unwrap(), None);
    }

    #[test]
    fn test_list_reports_element_index() {
        let value = yaml("items: [1, 2, x]");
        let doc = Document::root(&value).unwrap();
        let err = doc.list::<u32>("items").unwrap_err();
        assert_eq!(err.path, "items[2]");
    }

    #[test]
    fn test_list_rejects_non_sequence() {
        let value = yaml("items: 3");
        let doc = Document::root(&value).unwrap();
        let err = doc.list::<u32>("items").unwrap_err();
        assert_eq!(err.message, "expected a sequence, found a number");
    }

    #[test]
    fn test_required_list_missing() {
        let value = yaml("other: []");
        let doc = Document::root(&value).unwrap();
        assert!(doc.required_list::<u32>("items").is_err());
        assert!(doc.list::<u32>("items").unwrap().is_empty());
    }

    #[test]
    fn test_deny_unknown() {
        let value = yaml("tool: {}\ntools: []");
        let doc = Document::root(&value).unwrap();
        let err = doc.deny_unknown(&["tool"]).unwrap_err();
        assert_eq!(err.path, "tools");
        assert!(doc.deny_unknown(&["tool", "tools"]).is_ok());
    }
}
