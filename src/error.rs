//! Error types for yaml-toolbox
//!
//! Centralized error handling using thiserror. Load-time failures are carried by
//! [`ToolboxError`]; execution-time failures by [`ExecuteError`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A configuration field is missing, mistyped, or breaks a structural invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// Document the field came from, once known
    pub file: Option<PathBuf>,
    /// Field or list element the problem was found in (e.g. `toolbox`, `parameters[2]`)
    pub path: String,
    /// Expected-vs-actual description
    pub message: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: None,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Required field is absent
    pub fn missing(path: impl Into<String>) -> Self {
        Self::new(path, "required field is missing")
    }

    /// Attach the document path, keeping an already-attached one
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        if self.file.is_none() {
            self.file = Some(file.into());
        }
        self
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema error")?;
        if let Some(file) = &self.file {
            write!(f, " in {}", file.display())?;
        }
        if !self.path.is_empty() {
            write!(f, " at '{}'", self.path)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for SchemaError {}

/// One tool reference whose config file does not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingToolConfig {
    pub tool: String,
    pub path: PathBuf,
}

/// Every missing tool config of one registry, collected before failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNotFoundError {
    pub missing: Vec<MissingToolConfig>,
}

impl fmt::Display for ConfigNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.missing.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(
                f,
                "Tool config not found: {} (referenced by {})",
                entry.path.display(),
                entry.tool
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigNotFoundError {}

/// A cross-tool or cross-field invariant found by the config validator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyProblem {
    #[error("tool '{tool}': invalid executeFunction '{path}': {reason}")]
    InvalidImplementationPath {
        tool: String,
        path: String,
        reason: String,
    },

    #[error("tool '{tool}': executeFunction '{path}' is not registered")]
    UnregisteredImplementation { tool: String, path: String },

    #[error("tool name '{name}' is declared by more than one enabled tool: {}", join_paths(.configs))]
    DuplicateToolName { name: String, configs: Vec<PathBuf> },

    #[error("registry entry '{reference}' points at a config declaring tool '{declared}'")]
    ReferenceNameMismatch { reference: String, declared: String },

    #[error("tool '{tool}': parameter name '{parameter}' is used more than once")]
    DuplicateParameterName { tool: String, parameter: String },

    #[error("tool '{tool}': documentation.parameter_syntax describes unknown parameter '{parameter}'")]
    UndocumentedParameter { tool: String, parameter: String },

    #[error("generated name '{name}' is shared by tools: {}", .tools.join(", "))]
    GeneratedNameCollision { name: String, tools: Vec<String> },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// All consistency problems found in one toolbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigConsistencyError {
    pub toolbox: String,
    pub problems: Vec<ConsistencyProblem>,
}

impl fmt::Display for ConfigConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Toolbox '{}' has {} consistency problem(s)",
            self.toolbox,
            self.problems.len()
        )?;
        for problem in &self.problems {
            write!(f, "\n  - {}", problem)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigConsistencyError {}

/// Why an implementation key could not be turned into a callable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionFailure {
    #[error("invalid implementation path: {0}")]
    InvalidPath(String),

    #[error("no module '{0}' is registered")]
    ModuleNotFound(String),

    #[error("module '{module}' has no function '{function}'")]
    FunctionNotFound { module: String, function: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot resolve implementation '{path}' for tool '{tool}': {reason}")]
pub struct ImplementationResolutionError {
    pub tool: String,
    pub path: String,
    #[source]
    pub reason: ResolutionFailure,
}

/// One referenced tool that failed to load while resolving a whole toolbox
#[derive(Debug)]
pub struct ToolLoadFailure {
    pub tool: String,
    pub path: PathBuf,
    pub error: ToolboxError,
}

/// Every tool that failed to load while resolving a toolbox
#[derive(Debug)]
pub struct ToolLoadErrors {
    pub failures: Vec<ToolLoadFailure>,
}

impl fmt::Display for ToolLoadErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tool config(s) failed to load", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {}: {}", failure.tool, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolLoadErrors {}

/// All load-time errors
#[derive(Debug, Error)]
pub enum ToolboxError {
    /// Document could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid YAML
    #[error("Failed to parse YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Config could not be written back to YAML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    NotFound(#[from] ConfigNotFoundError),

    #[error(transparent)]
    Consistency(#[from] ConfigConsistencyError),

    #[error(transparent)]
    Resolution(#[from] ImplementationResolutionError),

    #[error(transparent)]
    ToolLoad(#[from] ToolLoadErrors),

    /// Toolbox discovery pattern was invalid
    #[error("Invalid discovery pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Result type alias for load-time operations
pub type Result<T> = std::result::Result<T, ToolboxError>;

/// A supplied value broke one of its parameter's declared checks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed for parameter '{parameter}' ({check}): {message}")]
pub struct ParameterValidationError {
    pub parameter: String,
    pub check: String,
    pub message: String,
}

/// Failure of one tool invocation
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Validation(#[from] ParameterValidationError),

    /// The business function failed; the report is passed through unchanged
    #[error("{0}")]
    Failed(eyre::Report),
}

impl ExecuteError {
    /// The business function's own error, if that is what failed
    pub fn report(&self) -> Option<&eyre::Report> {
        match self {
            Self::Failed(report) => Some(report),
            Self::Validation(_) => None,
        }
    }
}
