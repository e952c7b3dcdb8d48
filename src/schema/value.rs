//! Scalar values and the host-supplied parameter value contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A YAML scalar as used for defaults, filter lists and check operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric view: numbers as-is, text parsed after trimming
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// True for `Int` and `Float`
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A value supplied by the host for one parameter at execution time.
///
/// The core only ever reads the typed value and its text form; hosts implement
/// this for their own parameter objects.
pub trait ParameterValue {
    /// Typed value, `None` when the parameter is unset
    fn value(&self) -> Option<Scalar>;

    /// Text form of the value
    fn value_as_text(&self) -> Option<String> {
        self.value().map(|v| v.to_string())
    }
}

impl ParameterValue for Scalar {
    fn value(&self) -> Option<Scalar> {
        Some(self.clone())
    }
}

impl ParameterValue for Option<Scalar> {
    fn value(&self) -> Option<Scalar> {
        self.clone()
    }
}

/// Plain parameter value for hosts without their own parameter object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterInput {
    pub value: Option<Scalar>,
    pub text: Option<String>,
}

impl ParameterInput {
    pub fn new(value: impl Into<Scalar>) -> Self {
        Self {
            value: Some(value.into()),
            text: None,
        }
    }

    /// An unset parameter
    pub fn empty() -> Self {
        Self::default()
    }

    /// Override the text form (e.g. a layer path behind an opaque value)
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl ParameterValue for ParameterInput {
    fn value(&self) -> Option<Scalar> {
        self.value.clone()
    }

    fn value_as_text(&self) -> Option<String> {
        self.text
            .clone()
            .or_else(|| self.value.as_ref().map(|v| v.to_string()))
    }
}
