//! Execution-time checks of supplied parameter values.
//!
//! Parameters are checked in index order and the first failing check wins;
//! nothing after it is evaluated.

use crate::error::ParameterValidationError;
use crate::schema::{CheckKind, ParameterConfig, ParameterValue, Scalar, ToolConfig, ValidationCheck};

/// Check every parameter of `config` against the value at its index
pub fn validate_parameters(config: &ToolConfig, values: &[&dyn ParameterValue]) -> Result<(), ParameterValidationError> {
    for param in config.sorted_parameters() {
        let value = values.get(param.index as usize).copied();
        validate_parameter(&param, value)?;
    }
    Ok(())
}

/// Check one named parameter; unknown names have no checks
pub fn validate_named(
    config: &ToolConfig,
    name: &str,
    value: Option<&dyn ParameterValue>,
) -> Result<(), ParameterValidationError> {
    match config.parameter(name) {
        Some(param) => validate_parameter(param, value),
        None => Ok(()),
    }
}

/// Run all of one parameter's checks, in declaration order
pub fn validate_parameter(
    param: &ParameterConfig,
    value: Option<&dyn ParameterValue>,
) -> Result<(), ParameterValidationError> {
    let scalar = value.and_then(|v| v.value());
    let text = value.and_then(|v| v.value_as_text());

    for check in &param.validation {
        if let Some(message) = failure(&param.name, check, scalar.as_ref(), text.as_deref()) {
            log::debug!("Parameter '{}' failed {} check", param.name, check.kind.name());
            return Err(ParameterValidationError {
                parameter: param.name.clone(),
                check: check.kind.name().to_string(),
                message: check.message.clone().unwrap_or(message),
            });
        }
    }
    Ok(())
}

fn shown(text: Option<&str>) -> &str {
    text.unwrap_or("nothing")
}

/// The generated failure message, or `None` when the check passes
fn failure(name: &str, check: &ValidationCheck, scalar: Option<&Scalar>, text: Option<&str>) -> Option<String> {
    let number = scalar.and_then(Scalar::as_f64);

    match &check.kind {
        CheckKind::GreaterThan(bound) => match number {
            Some(x) if x > *bound => None,
            _ => Some(format!("{} must be greater than {} (got {})", name, bound, shown(text))),
        },
        CheckKind::LessThan(bound) => match number {
            Some(x) if x < *bound => None,
            _ => Some(format!("{} must be less than {} (got {})", name, bound, shown(text))),
        },
        CheckKind::MinValue(bound) => match number {
            Some(x) if x >= *bound => None,
            _ => Some(format!("{} must be at least {} (got {})", name, bound, shown(text))),
        },
        CheckKind::MaxValue(bound) => match number {
            Some(x) if x <= *bound => None,
            _ => Some(format!("{} must be at most {} (got {})", name, bound, shown(text))),
        },
        CheckKind::OneOf(allowed) => {
            let matched = text.is_some_and(|t| allowed.iter().any(|a| a.to_string() == t));
            if matched {
                None
            } else {
                let allowed: Vec<String> = allowed.iter().map(Scalar::to_string).collect();
                Some(format!(
                    "{} must be one of [{}] (got {})",
                    name,
                    allowed.join(", "),
                    shown(text)
                ))
            }
        }
        CheckKind::NotEmpty => match text {
            Some(t) if !t.trim().is_empty() => None,
            _ => Some(format!("{} cannot be empty", name)),
        },
        CheckKind::Regex(pattern) => {
            if text.is_some_and(|t| pattern.is_match(t)) {
                None
            } else {
                Some(format!("{} must match pattern {} (got {})", name, pattern, shown(text)))
            }
        }
    }
}
