//! Tool document loading.

use std::path::{Path, PathBuf};

use super::read_document;
use crate::error::Result;
use crate::schema::{ToolConfig, ToolReference};

/// One registry reference with its loaded tool document
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTool {
    pub reference: ToolReference,
    pub path: PathBuf,
    pub config: ToolConfig,
}

/// Parse and validate a tool document, including the name/filename match
pub fn load_tool(path: &Path) -> Result<ToolConfig> {
    log::debug!("Loading tool config: {}", path.display());
    let value = read_document(path)?;
    let config = ToolConfig::from_value(&value).map_err(|e| e.in_file(path))?;
    config.check_name(path).map_err(|e| e.in_file(path))?;
    Ok(config)
}
