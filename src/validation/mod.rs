//! Validators
//!
//! `config` checks a loaded toolbox for cross-document consistency at load
//! time; `runtime` checks supplied parameter values at execution time.

pub mod config;
pub mod runtime;

pub use config::ConfigValidator;
pub use runtime::{validate_parameter, validate_parameters, validate_named};
