//! yaml-toolbox - declarative toolboxes from YAML
//!
//! A registry document (`toolbox.yml`) lists tool documents; each tool document
//! declares metadata, parameters and an implementation key. This crate loads
//! and validates both levels, checks them for consistency, and binds each tool
//! to an execute function registered by the host.

pub mod error;
pub mod factory;
pub mod loader;
pub mod metadata;
pub mod schema;
pub mod validation;

pub use error::{ExecuteError, Result, ToolboxError};
pub use factory::{ImplementationRegistry, ResolvedTool, ToolCommand, ToolFactory};
pub use loader::{load_tool, load_toolbox, resolve_toolbox};
