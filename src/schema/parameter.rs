//! Parameter descriptors: filters, validation checks and the parameter itself.
//!
//! Filters and checks are tagged unions in YAML (`type: Range`,
//! `type: greater_than`). They are read through flat "raw" structs and then
//! converted, so a check carrying the wrong operands fails with a precise
//! message instead of a generic untagged-enum error.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::value::Scalar;

/// Whether the host must supply the parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Required,
    Optional,
    Derived,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "Required",
            Self::Optional => "Optional",
            Self::Derived => "Derived",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Output => "Output",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum FilterType {
    Range,
    ValueList,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFilter {
    #[serde(rename = "type")]
    kind: FilterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Scalar>>,
    #[serde(rename = "fileFilters", default, skip_serializing_if = "Option::is_none")]
    file_filters: Option<Vec<String>>,
}

/// Restriction on the values the host dialog offers for a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFilter", into = "RawFilter")]
pub enum ParameterFilter {
    Range { min: f64, max: f64 },
    ValueList { values: Vec<Scalar> },
    File { file_filters: Vec<String> },
}

impl ParameterFilter {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Range { .. } => "Range",
            Self::ValueList { .. } => "ValueList",
            Self::File { .. } => "File",
        }
    }
}

impl TryFrom<RawFilter> for ParameterFilter {
    type Error = String;

    fn try_from(raw: RawFilter) -> Result<Self, Self::Error> {
        let mut stray = Vec::new();
        let filter = match raw.kind {
            FilterType::Range => {
                if raw.values.is_some() {
                    stray.push("values");
                }
                if raw.file_filters.is_some() {
                    stray.push("fileFilters");
                }
                let (min, max) = match (raw.min, raw.max) {
                    (Some(min), Some(max)) => (min, max),
                    _ => return Err("Range filter requires both `min` and `max`".to_string()),
                };
                if min > max {
                    return Err(format!("Range filter min ({}) is greater than max ({})", min, max));
                }
                Self::Range { min, max }
            }
            FilterType::ValueList => {
                if raw.min.is_some() || raw.max.is_some() {
                    stray.push("min/max");
                }
                if raw.file_filters.is_some() {
                    stray.push("fileFilters");
                }
                match raw.values {
                    Some(values) if !values.is_empty() => Self::ValueList { values },
                    _ => return Err("ValueList filter requires a non-empty `values` list".to_string()),
                }
            }
            FilterType::File => {
                if raw.min.is_some() || raw.max.is_some() {
                    stray.push("min/max");
                }
                if raw.values.is_some() {
                    stray.push("values");
                }
                match raw.file_filters {
                    Some(file_filters) => Self::File { file_filters },
                    None => return Err("File filter requires `fileFilters`".to_string()),
                }
            }
        };
        if !stray.is_empty() {
            return Err(format!(
                "{} filter does not accept {}",
                filter.type_name(),
                stray.join(", ")
            ));
        }
        Ok(filter)
    }
}

impl From<ParameterFilter> for RawFilter {
    fn from(filter: ParameterFilter) -> Self {
        let mut raw = RawFilter {
            kind: FilterType::Range,
            min: None,
            max: None,
            values: None,
            file_filters: None,
        };
        match filter {
            ParameterFilter::Range { min, max } => {
                raw.min = Some(min);
                raw.max = Some(max);
            }
            ParameterFilter::ValueList { values } => {
                raw.kind = FilterType::ValueList;
                raw.values = Some(values);
            }
            ParameterFilter::File { file_filters } => {
                raw.kind = FilterType::File;
                raw.file_filters = Some(file_filters);
            }
        }
        raw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CheckType {
    GreaterThan,
    LessThan,
    MinValue,
    MaxValue,
    OneOf,
    NotEmpty,
    Regex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCheck {
    #[serde(rename = "type")]
    kind: CheckType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Scalar>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// A regex compiled once when the check is loaded; compared by source text
#[derive(Debug, Clone)]
pub struct Pattern(regex::Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        regex::Regex::new(source).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Search semantics: any substring match passes
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The constraint a check enforces, with its operand
#[derive(Debug, Clone, PartialEq)]
pub enum CheckKind {
    GreaterThan(f64),
    LessThan(f64),
    MinValue(f64),
    MaxValue(f64),
    OneOf(Vec<Scalar>),
    NotEmpty,
    Regex(Pattern),
}

impl CheckKind {
    /// Name as written in YAML
    pub fn name(&self) -> &'static str {
        match self {
            Self::GreaterThan(_) => "greater_than",
            Self::LessThan(_) => "less_than",
            Self::MinValue(_) => "min_value",
            Self::MaxValue(_) => "max_value",
            Self::OneOf(_) => "one_of",
            Self::NotEmpty => "not_empty",
            Self::Regex(_) => "regex",
        }
    }
}

/// A runtime check attached to a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCheck", into = "RawCheck")]
pub struct ValidationCheck {
    pub kind: CheckKind,
    /// Replaces the generated failure message
    pub message: Option<String>,
}

impl ValidationCheck {
    pub fn new(kind: CheckKind) -> Self {
        Self { kind, message: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl TryFrom<RawCheck> for ValidationCheck {
    type Error = String;

    fn try_from(raw: RawCheck) -> Result<Self, Self::Error> {
        let numeric = |name: &str, value: Option<Scalar>| -> Result<f64, String> {
            match value {
                Some(v) if v.is_number() => v.as_f64().ok_or_else(|| format!("{} value is not finite", name)),
                Some(v) => Err(format!("{} check requires a numeric `value`, found '{}'", name, v)),
                None => Err(format!("{} check requires a numeric `value`", name)),
            }
        };

        let (kind, stray) = match raw.kind {
            CheckType::GreaterThan => (
                CheckKind::GreaterThan(numeric("greater_than", raw.value)?),
                raw.values.is_some() || raw.pattern.is_some(),
            ),
            CheckType::LessThan => (
                CheckKind::LessThan(numeric("less_than", raw.value)?),
                raw.values.is_some() || raw.pattern.is_some(),
            ),
            CheckType::MinValue => (
                CheckKind::MinValue(numeric("min_value", raw.value)?),
                raw.values.is_some() || raw.pattern.is_some(),
            ),
            CheckType::MaxValue => (
                CheckKind::MaxValue(numeric("max_value", raw.value)?),
                raw.values.is_some() || raw.pattern.is_some(),
            ),
            CheckType::OneOf => match raw.values {
                Some(values) if !values.is_empty() => {
                    (CheckKind::OneOf(values), raw.value.is_some() || raw.pattern.is_some())
                }
                _ => return Err("one_of check requires a non-empty `values` list".to_string()),
            },
            CheckType::NotEmpty => (
                CheckKind::NotEmpty,
                raw.value.is_some() || raw.values.is_some() || raw.pattern.is_some(),
            ),
            CheckType::Regex => match raw.pattern {
                Some(pattern) => {
                    let compiled = Pattern::new(&pattern)
                        .map_err(|e| format!("regex check has an invalid pattern '{}': {}", pattern, e))?;
                    (CheckKind::Regex(compiled), raw.value.is_some() || raw.values.is_some())
                }
                None => return Err("regex check requires a `pattern`".to_string()),
            },
        };

        if stray {
            return Err(format!("{} check has operands it does not use", kind.name()));
        }

        Ok(Self {
            kind,
            message: raw.message,
        })
    }
}

impl From<ValidationCheck> for RawCheck {
    fn from(check: ValidationCheck) -> Self {
        let mut raw = RawCheck {
            kind: CheckType::NotEmpty,
            value: None,
            values: None,
            pattern: None,
            message: check.message,
        };
        match check.kind {
            CheckKind::GreaterThan(v) => {
                raw.kind = CheckType::GreaterThan;
                raw.value = Some(Scalar::Float(v));
            }
            CheckKind::LessThan(v) => {
                raw.kind = CheckType::LessThan;
                raw.value = Some(Scalar::Float(v));
            }
            CheckKind::MinValue(v) => {
                raw.kind = CheckType::MinValue;
                raw.value = Some(Scalar::Float(v));
            }
            CheckKind::MaxValue(v) => {
                raw.kind = CheckType::MaxValue;
                raw.value = Some(Scalar::Float(v));
            }
            CheckKind::OneOf(values) => {
                raw.kind = CheckType::OneOf;
                raw.values = Some(values);
            }
            CheckKind::NotEmpty => {}
            CheckKind::Regex(pattern) => {
                raw.kind = CheckType::Regex;
                raw.pattern = Some(pattern.as_str().to_string());
            }
        }
        raw
    }
}

/// One parameter of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ParameterConfig {
    pub name: String,
    pub display_name: String,
    /// Host datatype (e.g. `GPFeatureLayer`, `GPLinearUnit`)
    pub datatype: String,
    pub parameter_type: ParameterType,
    pub direction: Direction,
    /// Zero-based position in the host's parameter list
    pub index: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ParameterFilter>,
    /// Column definitions (`[datatype, name]`) for value-table parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Vec<String>>>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationCheck>,
}

impl ParameterConfig {
    pub fn is_required(&self) -> bool {
        self.parameter_type == ParameterType::Required
    }
}

/// `validation: ~` means "no checks"
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
