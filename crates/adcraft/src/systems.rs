use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};

pub mod error;

/// A set of tools the agent can call
#[async_trait]
pub trait System: Send + Sync {
    /// Get the name of the system
    fn name(&self) -> &str;

    /// Get available tools
    fn tools(&self) -> &[Tool];

    /// Call a tool by name. `Err` means the call could not be dispatched at all (unknown tool,
    /// malformed arguments); failures inside a tool body are rendered into the returned text.
    async fn call(&self, tool_call: ToolCall) -> AgentResult<String>;
}

/// Deserialize tool arguments into their typed parameter struct
pub fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> AgentResult<T> {
    // Models sometimes send `null` for tools whose parameters all have defaults
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| AgentError::InvalidParameters(e.to_string()))
}
