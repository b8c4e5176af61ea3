use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use crate::checkpoint::MemoryCheckpointer;

pub const PROJECT_ENV_VAR: &str = "COZE_PROJECT_ENV";

/// Whether the agent remembers earlier turns of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuntimeMode {
    /// Every invocation starts from an empty history
    #[default]
    Ephemeral,
    /// History is kept in process memory per session id
    Checkpointed,
}

impl RuntimeMode {
    /// `COZE_PROJECT_ENV=DEV` selects the development mode with conversation memory
    pub fn from_env() -> Self {
        Self::from_project_env(env::var(PROJECT_ENV_VAR).ok().as_deref())
    }

    pub fn from_project_env(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("dev") => RuntimeMode::Checkpointed,
            _ => RuntimeMode::Ephemeral,
        }
    }

    /// A fresh checkpointer when this mode keeps history
    pub fn checkpointer(&self) -> Option<Arc<MemoryCheckpointer>> {
        match self {
            RuntimeMode::Ephemeral => None,
            RuntimeMode::Checkpointed => Some(Arc::new(MemoryCheckpointer::new())),
        }
    }
}

/// Per-request context supplied by the hosting runtime.
///
/// Its headers are attached to every outbound model request, from the agent and from tools.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeContext {
    headers: HashMap<String, String>,
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Headers to inject into outbound requests
    pub fn default_headers(&self) -> HashMap<String, String> {
        self.headers.clone()
    }
}
