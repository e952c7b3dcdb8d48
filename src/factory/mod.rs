//! Tool factory - validated configuration to callable tools
//!
//! Each enabled registry entry is loaded, its implementation key resolved
//! through the [`ImplementationRegistry`], and the result bound into a
//! [`ResolvedTool`]. Failures are per tool: one bad entry never stops the rest.

mod messages;
mod naming;
mod registry;
mod resolved;

pub use messages::{LogSink, MessageLog, MessageSink, Severity};
pub use naming::{NameAllocator, generated_name};
pub use registry::{ConfigFn, ExecuteFn, ImplementationRegistry, SimpleFn};
pub use resolved::{ResolvedTool, ToolCommand, synthesize};

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ImplementationResolutionError, ResolutionFailure, Result};
use crate::loader::{LoadedTool, Toolbox, load_tool};
use crate::schema::ImplementationPath;

/// Where one tool got to on its way from registry entry to callable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolState {
    Unloaded,
    Parsing,
    Validated,
    Resolved,
    Failed(String),
}

impl fmt::Display for ToolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unloaded => write!(f, "unloaded"),
            Self::Parsing => write!(f, "parsing"),
            Self::Validated => write!(f, "validated"),
            Self::Resolved => write!(f, "resolved"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Final state of one registry entry after registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub name: String,
    pub path: PathBuf,
    pub enabled: bool,
    /// Disabled entries stay `Unloaded`
    pub state: ToolState,
}

impl ToolOutcome {
    pub fn is_resolved(&self) -> bool {
        self.state == ToolState::Resolved
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, ToolState::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationReport {
    /// Successfully resolved tools, in registry order
    pub tools: Vec<ResolvedTool>,
    /// One outcome per registry entry, in registry order
    pub outcomes: Vec<ToolOutcome>,
}

impl RegistrationReport {
    pub fn failures(&self) -> impl Iterator<Item = &ToolOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }
}

/// Builds resolved tools against one implementation registry
#[derive(Debug, Clone, Copy)]
pub struct ToolFactory<'r> {
    registry: &'r ImplementationRegistry,
}

impl<'r> ToolFactory<'r> {
    pub fn new(registry: &'r ImplementationRegistry) -> Self {
        Self { registry }
    }

    /// Look up the execute function named by `dotted_path` for `tool`
    pub fn resolve_implementation(
        &self,
        tool: &str,
        dotted_path: &str,
    ) -> std::result::Result<ExecuteFn, ImplementationResolutionError> {
        let error = |reason| ImplementationResolutionError {
            tool: tool.to_string(),
            path: dotted_path.to_string(),
            reason,
        };
        let path = dotted_path
            .parse::<ImplementationPath>()
            .map_err(|e| error(ResolutionFailure::InvalidPath(e.to_string())))?;
        self.registry.resolve(&path).map_err(error)
    }

    /// Load one tool document and bind it
    pub fn build_tool(&self, path: &Path) -> Result<ResolvedTool> {
        let config = load_tool(path)?;
        let execute_fn = self.resolve_implementation(config.name(), &config.implementation.execute_function)?;
        Ok(synthesize(config, path, execute_fn))
    }

    /// Bind an already-loaded tool without reading it again
    pub fn build_loaded(&self, tool: &LoadedTool) -> Result<ResolvedTool> {
        let execute_fn =
            self.resolve_implementation(tool.config.name(), &tool.config.implementation.execute_function)?;
        Ok(synthesize(tool.config.clone(), &tool.path, execute_fn))
    }

    /// Every enabled tool that resolves, in registry order; failures are
    /// logged and skipped
    pub fn load_and_register_all(&self, toolbox: &Toolbox) -> Vec<ResolvedTool> {
        self.register_with_report(toolbox).tools
    }

    /// As [`Self::load_and_register_all`], with a per-entry outcome
    pub fn register_with_report(&self, toolbox: &Toolbox) -> RegistrationReport {
        log::info!(
            "Loading {} tool(s) from toolbox '{}'",
            toolbox.config.tools.len(),
            toolbox.label()
        );

        let mut names = NameAllocator::new();
        let mut tools = Vec::new();
        let mut outcomes = Vec::with_capacity(toolbox.config.tools.len());

        for reference in &toolbox.config.tools {
            let path = toolbox.tool_path(reference);
            let mut outcome = ToolOutcome {
                name: reference.name.clone(),
                path: path.clone(),
                enabled: reference.enabled,
                state: ToolState::Unloaded,
            };

            if !reference.enabled {
                log::debug!("Skipping disabled tool: {}", reference.name);
                outcomes.push(outcome);
                continue;
            }

            match self.register_one(&path, &mut outcome.state) {
                Ok(tool) => {
                    let generated = names.allocate(tool.tool_name());
                    let tool = tool.with_generated_name(generated);
                    log::info!("Registered: {} -> {}", tool.generated_name(), tool.config().label());
                    tools.push(tool);
                }
                Err(e) => {
                    log::error!(
                        "Error loading tool '{}' from {}: {}",
                        reference.name,
                        path.display(),
                        e
                    );
                    outcome.state = ToolState::Failed(e.to_string());
                }
            }
            outcomes.push(outcome);
        }

        log::info!("Successfully loaded {} tool(s)", tools.len());
        RegistrationReport { tools, outcomes }
    }

    fn register_one(&self, path: &Path, state: &mut ToolState) -> Result<ResolvedTool> {
        *state = ToolState::Parsing;
        let config = load_tool(path)?;
        *state = ToolState::Validated;
        let execute_fn = self.resolve_implementation(config.name(), &config.implementation.execute_function)?;
        *state = ToolState::Resolved;
        Ok(synthesize(config, path, execute_fn))
    }
}
