//! Implementation references (`executeFunction`) and their dotted-path syntax.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a tool's business logic lives, as a logical key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImplementationConfig {
    /// `pkg.module:function` or `pkg.module.function`
    #[serde(rename = "executeFunction")]
    pub execute_function: String,
}

impl ImplementationConfig {
    pub fn new(execute_function: impl Into<String>) -> Self {
        Self {
            execute_function: execute_function.into(),
        }
    }

    pub fn path(&self) -> Result<ImplementationPath, ImplementationPathError> {
        self.execute_function.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImplementationPathError {
    #[error("path is empty")]
    Empty,

    #[error("'{0}' has no module part (expected module.function or module:function)")]
    MissingModule(String),

    #[error("'{0}' has no function part")]
    MissingFunction(String),

    #[error("'{segment}' in '{path}' is not a valid identifier")]
    InvalidSegment { path: String, segment: String },
}

/// A parsed implementation key: module path plus function name.
///
/// `geo.buffer:execute` and `geo.buffer.execute` parse to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImplementationPath {
    module: String,
    function: String,
}

impl ImplementationPath {
    pub fn new(module: &str, function: &str) -> Result<Self, ImplementationPathError> {
        format!("{}:{}", module, function).parse()
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for ImplementationPath {
    type Err = ImplementationPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim();
        if path.is_empty() {
            return Err(ImplementationPathError::Empty);
        }

        let (module, function) = match path.split_once(':') {
            Some(parts) => parts,
            None => path
                .rsplit_once('.')
                .ok_or_else(|| ImplementationPathError::MissingModule(path.to_string()))?,
        };

        if module.is_empty() {
            return Err(ImplementationPathError::MissingModule(path.to_string()));
        }
        if function.is_empty() {
            return Err(ImplementationPathError::MissingFunction(path.to_string()));
        }

        for segment in module.split('.').chain(std::iter::once(function)) {
            if !is_identifier(segment) {
                return Err(ImplementationPathError::InvalidSegment {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        Ok(Self {
            module: module.to_string(),
            function: function.to_string(),
        })
    }
}

impl fmt::Display for ImplementationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colon_form() {
        let path: ImplementationPath = "tools.spatial.buffer:execute_buffer".parse().unwrap();
        assert_eq!(path.module(), "tools.spatial.buffer");
        assert_eq!(path.function(), "execute_buffer");
    }

    #[test]
    fn test_parse_dotted_form() {
        let path: ImplementationPath = "tools.spatial.buffer.execute_buffer".parse().unwrap();
        assert_eq!(path.module(), "tools.spatial.buffer");
        assert_eq!(path.function(), "execute_buffer");
    }

    #[test]
    fn test_both_forms_are_the_same_key() {
        let a: ImplementationPath = "geo.clip:run".parse().unwrap();
        let b: ImplementationPath = "geo.clip.run".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "geo.clip:run");
    }

    #[test]
    fn test_parse_rejects_bare_function() {
        assert_eq!(
            "execute".parse::<ImplementationPath>(),
            Err(ImplementationPathError::MissingModule("execute".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!("  ".parse::<ImplementationPath>(), Err(ImplementationPathError::Empty));
    }

    #[test]
    fn test_parse_rejects_missing_function() {
        assert!(matches!(
            "geo.clip:".parse::<ImplementationPath>(),
            Err(ImplementationPathError::MissingFunction(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_segments() {
        let err = "geo..clip:run".parse::<ImplementationPath>().unwrap_err();
        assert!(matches!(err, ImplementationPathError::InvalidSegment { ref segment, .. } if segment.is_empty()));

        let err = "geo.2clip:run".parse::<ImplementationPath>().unwrap_err();
        assert!(matches!(err, ImplementationPathError::InvalidSegment { ref segment, .. } if segment == "2clip"));

        assert!("geo/clip:run".parse::<ImplementationPath>().is_err());
        assert!("geo.clip:run:now".parse::<ImplementationPath>().is_err());
    }

    #[test]
    fn test_new_validates() {
        assert!(ImplementationPath::new("geo", "run").is_ok());
        assert!(ImplementationPath::new("geo", "r-un").is_err());
    }

    #[test]
    fn test_implementation_config_yaml() {
        let config: ImplementationConfig = serde_yaml::from_str("executeFunction: geo.buffer:run").unwrap();
        assert_eq!(config.execute_function, "geo.buffer:run");
        assert!(config.path().is_ok());
    }
}
