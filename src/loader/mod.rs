//! Config loader - YAML documents to validated configuration trees
//!
//! All relative paths in configuration are resolved against the directory of
//! the document that references them.

mod tool;
mod toolbox;

pub use tool::{LoadedTool, load_tool};
pub use toolbox::{REGISTRY_FILE_NAME, ResolvedToolbox, Toolbox, load_toolbox, resolve_toolbox, resolve_toolbox_with};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::Value;

use crate::error::{Result, ToolboxError};

/// Read and parse one YAML document into a raw value
pub fn read_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|source| ToolboxError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content, path)
}

pub(crate) fn parse_document(content: &str, path: &Path) -> Result<Value> {
    serde_yaml::from_str(content).map_err(|source| ToolboxError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a registry or tool config back to its document form
pub fn to_yaml<T: Serialize>(config: &T) -> Result<String> {
    serde_yaml::to_string(config).map_err(ToolboxError::Serialize)
}

/// Registries one level below `root` (`root/*/toolbox.yml`), sorted by path
pub fn discover_toolboxes(root: &Path) -> Result<Vec<PathBuf>> {
    // The root is literal text; only the `*` segment is a wildcard
    let root_text = root.to_string_lossy().replace('\\', "/");
    let pattern = format!("{}/*/{}", glob::Pattern::escape(&root_text), REGISTRY_FILE_NAME);

    let mut found: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Skipping unreadable path during discovery: {}", e);
                None
            }
        })
        .collect();
    found.sort();
    log::debug!("Discovered {} toolbox(es) under {}", found.len(), root.display());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_document_missing_file() {
        let err = read_document(Path::new("/definitely/not/here.yml")).unwrap_err();
        assert!(matches!(err, ToolboxError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.yml"));
    }

    #[test]
    fn test_read_document_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yml");
        fs::write(&path, "tool: [unclosed").unwrap();
        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, ToolboxError::Yaml { .. }));
    }

    #[test]
    fn test_discover_toolboxes() {
        let dir = TempDir::new().unwrap();
        for name in ["zeta", "alpha"] {
            let tb = dir.path().join(name);
            fs::create_dir_all(&tb).unwrap();
            fs::write(tb.join(REGISTRY_FILE_NAME), "toolbox: {}").unwrap();
        }
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let found = discover_toolboxes(dir.path()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("alpha/toolbox.yml"));
        assert!(found[1].ends_with("zeta/toolbox.yml"));
    }

    #[test]
    fn test_discover_toolboxes_root_with_glob_characters() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("Projects [2024]");
        let tb = root.join("spatial");
        fs::create_dir_all(&tb).unwrap();
        fs::write(tb.join(REGISTRY_FILE_NAME), "toolbox: {}").unwrap();

        let found = discover_toolboxes(&root).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("spatial/toolbox.yml"));
    }

    #[test]
    fn test_discover_toolboxes_empty_root() {
        let dir = TempDir::new().unwrap();
        assert!(discover_toolboxes(dir.path()).unwrap().is_empty());
    }
}
