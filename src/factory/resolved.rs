//! Resolved tools: a validated config bound to its execute function.

use std::path::{Path, PathBuf};

use super::messages::MessageSink;
use super::naming::generated_name;
use super::registry::ExecuteFn;
use crate::error::ExecuteError;
use crate::schema::{ParameterConfig, ParameterValue, ToolConfig};
use crate::validation::validate_parameters;

/// What a host needs from a registered tool
pub trait ToolCommand: Send + Sync {
    /// Generated type name (`BufferAnalysisTool`)
    fn name(&self) -> &str;

    fn label(&self) -> &str;

    fn description(&self) -> &str;

    /// Parameters in index order
    fn parameter_descriptors(&self) -> &[ParameterConfig];

    /// Validate `values` and run the tool, reporting to `sink`
    fn execute(&self, values: &[&dyn ParameterValue], sink: &mut dyn MessageSink) -> Result<(), ExecuteError>;
}

/// Factory output: one callable tool. Rebuilt on every reload.
#[derive(Debug, Clone)]
pub struct ResolvedTool {
    tool_name: String,
    generated_name: String,
    config: ToolConfig,
    config_path: PathBuf,
    execute_fn: ExecuteFn,
    parameters: Vec<ParameterConfig>,
}

/// Bind a validated config to its execute function
pub fn synthesize(config: ToolConfig, config_path: impl Into<PathBuf>, execute_fn: ExecuteFn) -> ResolvedTool {
    let parameters = config.sorted_parameters();
    ResolvedTool {
        tool_name: config.name().to_string(),
        generated_name: generated_name(config.name()),
        config,
        config_path: config_path.into(),
        execute_fn,
        parameters,
    }
}

impl ResolvedTool {
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn generated_name(&self) -> &str {
        &self.generated_name
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn execute_fn(&self) -> &ExecuteFn {
        &self.execute_fn
    }

    pub fn category(&self) -> &str {
        &self.config.tool.category
    }

    pub fn can_run_in_background(&self) -> bool {
        self.config.tool.can_run_in_background
    }

    /// Override the generated name (used to resolve collisions)
    pub fn with_generated_name(mut self, name: impl Into<String>) -> Self {
        self.generated_name = name.into();
        self
    }

    fn config_file_name(&self) -> String {
        self.config_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.config_path.display().to_string())
    }
}

impl ToolCommand for ResolvedTool {
    fn name(&self) -> &str {
        &self.generated_name
    }

    fn label(&self) -> &str {
        self.config.label()
    }

    fn description(&self) -> &str {
        &self.config.tool.description
    }

    fn parameter_descriptors(&self) -> &[ParameterConfig] {
        &self.parameters
    }

    fn execute(&self, values: &[&dyn ParameterValue], sink: &mut dyn MessageSink) -> Result<(), ExecuteError> {
        if let Err(e) = validate_parameters(&self.config, values) {
            sink.add_error(&e.to_string());
            return Err(e.into());
        }

        log::debug!("Executing {} ({} value(s))", self.generated_name, values.len());
        self.execute_fn.call(values, sink, &self.config).map_err(|e| {
            sink.add_error(&format!(
                "Error in {} (config: {}): {}",
                self.label(),
                self.config_file_name(),
                e
            ));
            ExecuteError::Failed(e)
        })
    }
}
