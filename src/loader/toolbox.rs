//! Registry loading and whole-toolbox resolution.

use std::path::{Path, PathBuf};

use super::read_document;
use super::tool::{LoadedTool, load_tool};
use crate::error::{ConfigNotFoundError, MissingToolConfig, Result, ToolLoadErrors, ToolLoadFailure};
use crate::schema::{ToolReference, ToolboxConfig};
use crate::validation::ConfigValidator;

/// File name of a registry when a directory is given
pub const REGISTRY_FILE_NAME: &str = "toolbox.yml";

/// A loaded registry together with the directory its references resolve against
#[derive(Debug, Clone, PartialEq)]
pub struct Toolbox {
    pub config: ToolboxConfig,
    pub registry_path: PathBuf,
    pub root: PathBuf,
}

impl Toolbox {
    /// Absolute (or root-relative) location of a reference's tool document
    pub fn tool_path(&self, reference: &ToolReference) -> PathBuf {
        self.root.join(&reference.config)
    }

    pub fn alias(&self) -> &str {
        &self.config.toolbox.alias
    }

    pub fn label(&self) -> &str {
        &self.config.toolbox.label
    }
}

/// A registry and every tool document it references, all validated
#[derive(Debug, Clone)]
pub struct ResolvedToolbox {
    pub toolbox: Toolbox,
    /// One entry per reference, in registry order, disabled ones included
    pub tools: Vec<LoadedTool>,
}

impl ResolvedToolbox {
    pub fn enabled_tools(&self) -> impl Iterator<Item = &LoadedTool> {
        self.tools.iter().filter(|t| t.reference.enabled)
    }

    pub fn find(&self, name: &str) -> Option<&LoadedTool> {
        self.tools.iter().find(|t| t.reference.name == name)
    }
}

fn registry_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(REGISTRY_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

/// Load a registry (file, or directory containing `toolbox.yml`) and check
/// that every referenced tool document exists
pub fn load_toolbox(path: &Path) -> Result<Toolbox> {
    let registry_path = registry_file(path);
    log::debug!("Loading toolbox registry: {}", registry_path.display());

    let value = read_document(&registry_path)?;
    let config = ToolboxConfig::from_value(&value).map_err(|e| e.in_file(&registry_path))?;

    let root = registry_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let toolbox = Toolbox {
        config,
        registry_path,
        root,
    };

    let missing: Vec<MissingToolConfig> = toolbox
        .config
        .tools
        .iter()
        .map(|reference| (reference, toolbox.tool_path(reference)))
        .filter(|(_, path)| !path.is_file())
        .map(|(reference, path)| MissingToolConfig {
            tool: reference.name.clone(),
            path,
        })
        .collect();

    if !missing.is_empty() {
        return Err(ConfigNotFoundError { missing }.into());
    }

    log::debug!(
        "Loaded toolbox '{}' with {} tool reference(s)",
        toolbox.label(),
        toolbox.config.tools.len()
    );
    Ok(toolbox)
}

/// Load a registry and all referenced tools, then run the default config
/// validator over the result
pub fn resolve_toolbox(path: &Path) -> Result<ResolvedToolbox> {
    resolve_toolbox_with(path, &ConfigValidator::new())
}

/// As [`resolve_toolbox`], with a caller-supplied validator (e.g. one that
/// also checks implementation keys against a registry)
pub fn resolve_toolbox_with(path: &Path, validator: &ConfigValidator<'_>) -> Result<ResolvedToolbox> {
    let toolbox = load_toolbox(path)?;

    let mut tools = Vec::with_capacity(toolbox.config.tools.len());
    let mut failures = Vec::new();
    for reference in &toolbox.config.tools {
        let tool_path = toolbox.tool_path(reference);
        match load_tool(&tool_path) {
            Ok(config) => tools.push(LoadedTool {
                reference: reference.clone(),
                path: tool_path,
                config,
            }),
            Err(error) => failures.push(ToolLoadFailure {
                tool: reference.name.clone(),
                path: tool_path,
                error,
            }),
        }
    }

    if !failures.is_empty() {
        return Err(ToolLoadErrors { failures }.into());
    }

    validator.validate(&toolbox, &tools)?;
    Ok(ResolvedToolbox { toolbox, tools })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolboxError;
    use std::fs;
    use tempfile::TempDir;

    const TOOL: &str = r#"
tool: {name: NAME, label: LABEL, description: d}
implementation: {executeFunction: pkg.mod:run}
parameters: []
"#;

    fn write_tool(dir: &Path, rel: &str, name: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, TOOL.replace("NAME", name).replace("LABEL", name)).unwrap();
    }

    fn write_registry(dir: &Path, tools: &str) {
        fs::write(
            dir.join(REGISTRY_FILE_NAME),
            format!("toolbox: {{label: Test, alias: test, description: d}}\ntools:\n{}", tools),
        )
        .unwrap();
    }

    #[test]
    fn test_load_toolbox_from_directory() {
        let dir = TempDir::new().unwrap();
        write_tool(dir.path(), "tools/buffer.yml", "buffer");
        write_registry(dir.path(), "  - {name: buffer, config: tools/buffer.yml}\n");

        let toolbox = load_toolbox(dir.path()).unwrap();
        assert_eq!(toolbox.root, dir.path());
        assert_eq!(toolbox.registry_path, dir.path().join(REGISTRY_FILE_NAME));
        assert_eq!(toolbox.alias(), "test");
        assert_eq!(
            toolbox.tool_path(&toolbox.config.tools[0]),
            dir.path().join("tools/buffer.yml")
        );
    }

    #[test]
    fn test_missing_configs_are_collected() {
        let dir = TempDir::new().unwrap();
        write_tool(dir.path(), "tools/buffer.yml", "buffer");
        write_registry(
            dir.path(),
            "  - {name: buffer, config: tools/buffer.yml}\n  - {name: clip, config: tools/clip.yml}\n  - {name: dissolve, enabled: false, config: tools/dissolve.yml}\n",
        );

        let err = load_toolbox(dir.path()).unwrap_err();
        match err {
            ToolboxError::NotFound(e) => {
                let tools: Vec<_> = e.missing.iter().map(|m| m.tool.as_str()).collect();
                assert_eq!(tools, vec!["clip", "dissolve"]);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_schema_error_carries_registry_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(REGISTRY_FILE_NAME),
            "toolbox: {label: L, alias: 1abc, description: d}",
        )
        .unwrap();

        match load_toolbox(dir.path()).unwrap_err() {
            ToolboxError::Schema(e) => {
                assert_eq!(e.path, "toolbox.alias");
                assert_eq!(e.file, Some(dir.path().join(REGISTRY_FILE_NAME)));
            }
            other => panic!("expected Schema, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_collects_every_failing_tool() {
        let dir = TempDir::new().unwrap();
        write_tool(dir.path(), "tools/buffer.yml", "buffer");
        write_tool(dir.path(), "tools/clip.yml", "not_clip");
        fs::write(dir.path().join("tools/erase.yml"), "tool: [").unwrap();
        write_registry(
            dir.path(),
            "  - {name: buffer, config: tools/buffer.yml}\n  - {name: clip, config: tools/clip.yml}\n  - {name: erase, config: tools/erase.yml}\n",
        );

        match resolve_toolbox(dir.path()).unwrap_err() {
            ToolboxError::ToolLoad(e) => {
                let tools: Vec<_> = e.failures.iter().map(|f| f.tool.as_str()).collect();
                assert_eq!(tools, vec!["clip", "erase"]);
            }
            other => panic!("expected ToolLoad, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_keeps_disabled_tools() {
        let dir = TempDir::new().unwrap();
        write_tool(dir.path(), "tools/buffer.yml", "buffer");
        write_tool(dir.path(), "clip/tool.yml", "clip");
        write_registry(
            dir.path(),
            "  - {name: buffer, config: tools/buffer.yml}\n  - {name: clip, enabled: false, config: clip/tool.yml}\n",
        );

        let resolved = resolve_toolbox(dir.path()).unwrap();
        assert_eq!(resolved.tools.len(), 2);
        assert_eq!(resolved.enabled_tools().count(), 1);
        assert!(resolved.find("clip").is_some());
    }
}
