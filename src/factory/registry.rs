//! Implementation registry: execute functions registered under dotted keys.
//!
//! The host fills the registry at startup; tool documents then refer to
//! functions by key (`geo.buffer:execute`) and the factory looks them up here.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::messages::MessageSink;
use crate::error::ResolutionFailure;
use crate::schema::{ImplementationPath, ImplementationPathError, ParameterValue, ToolConfig};

/// Execute function taking `(values, sink)`
pub type SimpleFn = dyn Fn(&[&dyn ParameterValue], &mut dyn MessageSink) -> eyre::Result<()> + Send + Sync;

/// Execute function that also receives the tool's own config
pub type ConfigFn =
    dyn Fn(&[&dyn ParameterValue], &mut dyn MessageSink, &ToolConfig) -> eyre::Result<()> + Send + Sync;

/// A registered business function, tagged with the arguments it expects
#[derive(Clone)]
pub enum ExecuteFn {
    Simple(Arc<SimpleFn>),
    WithConfig(Arc<ConfigFn>),
}

impl ExecuteFn {
    pub fn simple<F>(f: F) -> Self
    where
        F: Fn(&[&dyn ParameterValue], &mut dyn MessageSink) -> eyre::Result<()> + Send + Sync + 'static,
    {
        Self::Simple(Arc::new(f))
    }

    pub fn with_config<F>(f: F) -> Self
    where
        F: Fn(&[&dyn ParameterValue], &mut dyn MessageSink, &ToolConfig) -> eyre::Result<()> + Send + Sync + 'static,
    {
        Self::WithConfig(Arc::new(f))
    }

    pub fn call(&self, values: &[&dyn ParameterValue], sink: &mut dyn MessageSink, config: &ToolConfig) -> eyre::Result<()> {
        match self {
            Self::Simple(f) => f(values, sink),
            Self::WithConfig(f) => f(values, sink, config),
        }
    }

    pub fn takes_config(&self) -> bool {
        matches!(self, Self::WithConfig(_))
    }
}

impl fmt::Debug for ExecuteFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(_) => write!(f, "ExecuteFn::Simple(..)"),
            Self::WithConfig(_) => write!(f, "ExecuteFn::WithConfig(..)"),
        }
    }
}

/// Explicit map from implementation keys to execute functions
#[derive(Clone, Default)]
pub struct ImplementationRegistry {
    modules: BTreeMap<String, BTreeMap<String, ExecuteFn>>,
}

impl ImplementationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `(values, sink)` function under `key`
    pub fn register<F>(&mut self, key: &str, f: F) -> Result<(), ImplementationPathError>
    where
        F: Fn(&[&dyn ParameterValue], &mut dyn MessageSink) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.insert(key.parse()?, ExecuteFn::simple(f));
        Ok(())
    }

    /// Register a `(values, sink, config)` function under `key`
    pub fn register_with_config<F>(&mut self, key: &str, f: F) -> Result<(), ImplementationPathError>
    where
        F: Fn(&[&dyn ParameterValue], &mut dyn MessageSink, &ToolConfig) -> eyre::Result<()> + Send + Sync + 'static,
    {
        self.insert(key.parse()?, ExecuteFn::with_config(f));
        Ok(())
    }

    /// Register an already-built function; replaces any previous entry
    pub fn insert(&mut self, path: ImplementationPath, f: ExecuteFn) {
        let previous = self
            .modules
            .entry(path.module().to_string())
            .or_default()
            .insert(path.function().to_string(), f);
        if previous.is_some() {
            log::warn!("Implementation '{}' registered twice; keeping the latest", path);
        }
    }

    pub fn resolve(&self, path: &ImplementationPath) -> Result<ExecuteFn, ResolutionFailure> {
        let module = self
            .modules
            .get(path.module())
            .ok_or_else(|| ResolutionFailure::ModuleNotFound(path.module().to_string()))?;
        module
            .get(path.function())
            .cloned()
            .ok_or_else(|| ResolutionFailure::FunctionNotFound {
                module: path.module().to_string(),
                function: path.function().to_string(),
            })
    }

    pub fn contains(&self, path: &ImplementationPath) -> bool {
        self.resolve(path).is_ok()
    }

    /// Every registered key, sorted
    pub fn keys(&self) -> Vec<String> {
        self.modules
            .iter()
            .flat_map(|(module, functions)| functions.keys().map(move |f| format!("{}:{}", module, f)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.modules.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ImplementationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplementationRegistry").field("keys", &self.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::MessageLog;
    use crate::schema::Scalar;

    fn path(s: &str) -> ImplementationPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ImplementationRegistry::new();
        registry
            .register("geo.buffer:run", |_, sink| {
                sink.add_message("buffered");
                Ok(())
            })
            .unwrap();

        let f = registry.resolve(&path("geo.buffer.run")).unwrap();
        assert!(!f.takes_config());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.keys(), vec!["geo.buffer:run"]);
    }

    #[test]
    fn test_register_rejects_bad_key() {
        let mut registry = ImplementationRegistry::new();
        assert!(registry.register("run", |_, _| Ok(())).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_missing_module() {
        let registry = ImplementationRegistry::new();
        assert_eq!(
            registry.resolve(&path("geo.clip:run")).unwrap_err(),
            ResolutionFailure::ModuleNotFound("geo.clip".to_string())
        );
    }

    #[test]
    fn test_resolve_missing_function() {
        let mut registry = ImplementationRegistry::new();
        registry.register("geo.clip:run", |_, _| Ok(())).unwrap();
        assert_eq!(
            registry.resolve(&path("geo.clip:execute")).unwrap_err(),
            ResolutionFailure::FunctionNotFound {
                module: "geo.clip".to_string(),
                function: "execute".to_string(),
            }
        );
        assert!(!registry.contains(&path("geo.clip:execute")));
    }

    #[test]
    fn test_call_with_config() {
        let mut registry = ImplementationRegistry::new();
        registry
            .register_with_config("geo.named:run", |values, sink, config| {
                sink.add_message(&format!("{} got {} value(s)", config.name(), values.len()));
                Ok(())
            })
            .unwrap();

        let config = ToolConfig::from_value(
            &serde_yaml::from_str(
                "tool: {name: named, label: N, description: d}\nimplementation: {executeFunction: geo.named:run}\nparameters: []",
            )
            .unwrap(),
        )
        .unwrap();

        let f = registry.resolve(&path("geo.named:run")).unwrap();
        assert!(f.takes_config());
        let mut sink = MessageLog::new();
        let value = Scalar::Int(1);
        f.call(&[&value], &mut sink, &config).unwrap();
        assert_eq!(sink.entries()[0].1, "named got 1 value(s)");
    }
}
