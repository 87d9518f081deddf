//! Tool registry and engines.
//!
//! Tools are the only way the model loop can touch a project. Each engine
//! validates its own argument bag into a typed command, applies it, and turns
//! every failure into a typed [`ToolOutcome`]; nothing is thrown past this
//! boundary.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uigen_types::{ErrorKind, ToolOutcome};

// ============================================================================
// Tool Info
// ============================================================================

/// Information about a tool, as advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (unique identifier).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema of the argument bag.
    pub input_schema: serde_json::Value,
}

/// Trait for tool engines.
#[async_trait]
pub trait ToolEngine: Send + Sync {
    /// Get the tool name.
    fn name(&self) -> &str;

    /// Get the tool description.
    fn description(&self) -> &str;

    /// Get the JSON Schema for tool input parameters.
    ///
    /// This enables models to understand the expected parameters for each
    /// tool.
    fn schema(&self) -> serde_json::Value;

    /// Validate and apply one invocation.
    async fn execute(&self, args: serde_json::Value) -> ToolOutcome;

    /// Descriptor for advertising this tool.
    fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.schema(),
        }
    }
}

/// Registry of tool engines, keyed by tool name.
#[derive(Default)]
pub struct ToolRegistry {
    engines: HashMap<String, Arc<dyn ToolEngine>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.engines.keys().collect();
        names.sort();
        f.debug_struct("ToolRegistry")
            .field("engines", &names)
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine under its own name, replacing any previous one.
    pub fn register(&mut self, engine: Arc<dyn ToolEngine>) {
        self.engines.insert(engine.name().to_string(), engine);
    }

    /// Remove an engine.
    pub fn remove(&mut self, name: &str) -> bool {
        self.engines.remove(name).is_some()
    }

    /// Get an engine by tool name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolEngine>> {
        self.engines.get(name).cloned()
    }

    /// Check if a tool is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// Descriptors of every registered tool, sorted by name.
    pub fn list(&self) -> Vec<ToolInfo> {
        let mut infos: Vec<_> = self.engines.values().map(|e| e.info()).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Route one invocation to its engine.
    #[tracing::instrument(skip(self, args), name = "tools.dispatch")]
    pub async fn dispatch(&self, tool: &str, args: serde_json::Value) -> ToolOutcome {
        match self.get(tool) {
            Some(engine) => engine.execute(args).await,
            None => {
                warn!(tool, "unknown tool");
                ToolOutcome::failure(ErrorKind::UnknownTool, format!("unknown tool: {tool}"))
            }
        }
    }
}
