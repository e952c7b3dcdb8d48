//! Cross-document consistency checks for a loaded toolbox.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::error::{ConfigConsistencyError, ConsistencyProblem};
use crate::factory::{ImplementationRegistry, generated_name};
use crate::loader::{LoadedTool, Toolbox};

/// Reports every consistency problem of a toolbox at once.
///
/// Without a registry, implementation keys are only checked for syntax; with
/// one, enabled tools must also name a registered function.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigValidator<'r> {
    registry: Option<&'r ImplementationRegistry>,
}

impl<'r> ConfigValidator<'r> {
    pub fn new() -> Self {
        Self { registry: None }
    }

    pub fn with_registry(registry: &'r ImplementationRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn validate(&self, toolbox: &Toolbox, tools: &[LoadedTool]) -> Result<(), ConfigConsistencyError> {
        let problems = self.problems(tools);
        if problems.is_empty() {
            log::debug!("Toolbox '{}' passed consistency checks", toolbox.label());
            Ok(())
        } else {
            Err(ConfigConsistencyError {
                toolbox: toolbox.label().to_string(),
                problems,
            })
        }
    }

    /// All problems, in a stable order: per-tool problems in registry order,
    /// then cross-tool problems
    pub fn problems(&self, tools: &[LoadedTool]) -> Vec<ConsistencyProblem> {
        let mut problems = Vec::new();

        for tool in tools {
            self.check_tool(tool, &mut problems);
        }

        let enabled: Vec<&LoadedTool> = tools.iter().filter(|t| t.reference.enabled).collect();
        check_duplicate_names(&enabled, &mut problems);
        check_generated_names(&enabled, &mut problems);

        problems
    }

    fn check_tool(&self, tool: &LoadedTool, problems: &mut Vec<ConsistencyProblem>) {
        let name = tool.config.name();
        let key = &tool.config.implementation.execute_function;

        match tool.config.implementation.path() {
            Err(e) => problems.push(ConsistencyProblem::InvalidImplementationPath {
                tool: name.to_string(),
                path: key.clone(),
                reason: e.to_string(),
            }),
            Ok(path) => {
                let unregistered = match self.registry {
                    Some(registry) => tool.reference.enabled && registry.resolve(&path).is_err(),
                    None => false,
                };
                if unregistered {
                    problems.push(ConsistencyProblem::UnregisteredImplementation {
                        tool: name.to_string(),
                        path: key.clone(),
                    });
                }
            }
        }

        if tool.reference.name != name {
            problems.push(ConsistencyProblem::ReferenceNameMismatch {
                reference: tool.reference.name.clone(),
                declared: name.to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        let mut reported = BTreeSet::new();
        for param in &tool.config.parameters {
            if !seen.insert(param.name.as_str()) && reported.insert(param.name.as_str()) {
                problems.push(ConsistencyProblem::DuplicateParameterName {
                    tool: name.to_string(),
                    parameter: param.name.clone(),
                });
            }
        }

        if let Some(doc) = &tool.config.documentation {
            for key in doc.parameter_syntax.keys() {
                if !seen.contains(key.as_str()) {
                    problems.push(ConsistencyProblem::UndocumentedParameter {
                        tool: name.to_string(),
                        parameter: key.clone(),
                    });
                }
            }
        }
    }
}

fn check_duplicate_names(enabled: &[&LoadedTool], problems: &mut Vec<ConsistencyProblem>) {
    let mut by_name: BTreeMap<&str, Vec<PathBuf>> = BTreeMap::new();
    for tool in enabled {
        by_name.entry(tool.config.name()).or_default().push(tool.path.clone());
    }
    for (name, configs) in by_name {
        if configs.len() > 1 {
            problems.push(ConsistencyProblem::DuplicateToolName {
                name: name.to_string(),
                configs,
            });
        }
    }
}

fn check_generated_names(enabled: &[&LoadedTool], problems: &mut Vec<ConsistencyProblem>) {
    let mut by_generated: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for tool in enabled {
        by_generated
            .entry(generated_name(tool.config.name()))
            .or_default()
            .insert(tool.config.name());
    }
    for (name, tools) in by_generated {
        // Identical declared names are already reported as duplicates
        if tools.len() > 1 {
            problems.push(ConsistencyProblem::GeneratedNameCollision {
                name,
                tools: tools.into_iter().map(str::to_string).collect(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ToolReference, ToolboxConfig, ToolConfig};

    fn tool(reference: &str, declared: &str, key: &str, params: &[&str]) -> LoadedTool {
        let mut yaml = format!(
            "tool: {{name: {declared}, label: L, description: d}}\nimplementation: {{executeFunction: '{key}'}}\nparameters:\n"
        );
        if params.is_empty() {
            yaml.push_str("  []\n");
        }
        for (i, p) in params.iter().enumerate() {
            yaml.push_str(&format!(
                "  - {{name: {p}, displayName: P, datatype: GPString, parameterType: Required, direction: Input, index: {i}}}\n"
            ));
        }
        let config = ToolConfig::from_value(&serde_yaml::from_str(&yaml).unwrap()).unwrap();
        LoadedTool {
            reference: ToolReference::new(reference, format!("tools/{reference}.yml")),
            path: PathBuf::from(format!("tools/{reference}.yml")),
            config,
        }
    }

    fn toolbox() -> Toolbox {
        Toolbox {
            config: ToolboxConfig::from_value(
                &serde_yaml::from_str("toolbox: {label: Spatial, alias: spatial, description: d}").unwrap(),
            )
            .unwrap(),
            registry_path: PathBuf::from("toolbox.yml"),
            root: PathBuf::from("."),
        }
    }

    #[test]
    fn test_consistent_toolbox_passes() {
        let tools = vec![
            tool("buffer", "buffer", "geo.buffer:run", &["a", "b"]),
            tool("clip", "clip", "geo.clip.run", &[]),
        ];
        assert!(ConfigValidator::new().validate(&toolbox(), &tools).is_ok());
    }

    #[test]
    fn test_reports_every_problem() {
        let tools = vec![
            tool("buffer", "buffer", "not a path", &["a", "a"]),
            tool("clip", "erase", "geo.clip:run", &[]),
        ];
        let err = ConfigValidator::new().validate(&toolbox(), &tools).unwrap_err();
        assert_eq!(err.toolbox, "Spatial");
        assert_eq!(err.problems.len(), 3);
        assert!(matches!(err.problems[0], ConsistencyProblem::InvalidImplementationPath { .. }));
        assert!(matches!(err.problems[1], ConsistencyProblem::DuplicateParameterName { ref parameter, .. } if parameter == "a"));
        assert!(matches!(err.problems[2], ConsistencyProblem::ReferenceNameMismatch { ref declared, .. } if declared == "erase"));
    }

    #[test]
    fn test_duplicate_declared_names_among_enabled_tools() {
        let tools = vec![
            tool("buffer", "buffer", "geo.a:run", &[]),
            tool("buffer_copy", "buffer", "geo.b:run", &[]),
        ];
        let problems = ConfigValidator::new().problems(&tools);
        assert!(problems.iter().any(|p| matches!(
            p,
            ConsistencyProblem::DuplicateToolName { name, configs } if name == "buffer" && configs.len() == 2
        )));
    }

    #[test]
    fn test_disabled_tools_skip_cross_tool_checks() {
        let mut copy = tool("buffer_copy", "buffer", "geo.b:run", &[]);
        copy.reference = copy.reference.disabled();
        let tools = vec![tool("buffer", "buffer", "geo.a:run", &[]), copy];
        let problems = ConfigValidator::new().problems(&tools);
        assert!(!problems.iter().any(|p| matches!(p, ConsistencyProblem::DuplicateToolName { .. })));
    }

    #[test]
    fn test_generated_name_collision() {
        let tools = vec![
            tool("buffer_analysis", "buffer_analysis", "geo.a:run", &[]),
            tool("buffer-analysis", "buffer-analysis", "geo.b:run", &[]),
        ];
        let problems = ConfigValidator::new().problems(&tools);
        assert_eq!(
            problems,
            vec![ConsistencyProblem::GeneratedNameCollision {
                name: "BufferAnalysisTool".to_string(),
                tools: vec!["buffer-analysis".to_string(), "buffer_analysis".to_string()],
            }]
        );
    }

    #[test]
    fn test_undocumented_parameter_syntax() {
        let mut t = tool("buffer", "buffer", "geo.a:run", &["distance"]);
        t.config.documentation = Some(
            serde_yaml::from_str(
                r#"
summary: s
usage: u
parameter_syntax:
  distance: {dialog_explanation: d, scripting_explanation: s}
  units: {dialog_explanation: d, scripting_explanation: s}
"#,
            )
            .unwrap(),
        );
        let problems = ConfigValidator::new().problems(&[t]);
        assert_eq!(
            problems,
            vec![ConsistencyProblem::UndocumentedParameter {
                tool: "buffer".to_string(),
                parameter: "units".to_string(),
            }]
        );
    }

    #[test]
    fn test_registry_check_for_enabled_tools() {
        let mut registry = ImplementationRegistry::new();
        registry.register("geo.buffer:run", |_, _| Ok(())).unwrap();

        let mut disabled = tool("dissolve", "dissolve", "geo.dissolve:run", &[]);
        disabled.reference = disabled.reference.disabled();
        let tools = vec![
            tool("buffer", "buffer", "geo.buffer.run", &[]),
            tool("clip", "clip", "geo.clip:run", &[]),
            disabled,
        ];

        let problems = ConfigValidator::with_registry(&registry).problems(&tools);
        assert_eq!(
            problems,
            vec![ConsistencyProblem::UnregisteredImplementation {
                tool: "clip".to_string(),
                path: "geo.clip:run".to_string(),
            }]
        );
    }
}
