use anyhow::{Context, Result};
use std::path::PathBuf;

use adcraft::agent::Agent;
use adcraft::builder::AgentBuilder;
use adcraft::runtime::{RuntimeContext, RuntimeMode};

pub mod run;
pub mod session;
pub mod tools;

/// Options shared by every command that talks to the model
#[derive(Debug, Clone, Default)]
pub struct AgentOptions {
    pub config: Option<PathBuf>,
    pub dev: bool,
    pub headers: Vec<(String, String)>,
}

impl AgentOptions {
    /// `--dev` forces checkpointed mode; otherwise `COZE_PROJECT_ENV` decides
    pub fn mode(&self) -> RuntimeMode {
        if self.dev {
            RuntimeMode::Checkpointed
        } else {
            RuntimeMode::from_env()
        }
    }

    pub fn context(&self) -> RuntimeContext {
        self.headers
            .iter()
            .fold(RuntimeContext::new(), |context, (name, value)| {
                context.with_header(name.as_str(), value.as_str())
            })
    }

    pub fn build_agent(&self) -> Result<Agent> {
        let mut builder = AgentBuilder::new()
            .mode(self.mode())
            .context(self.context());
        if let Some(path) = &self.config {
            builder = builder.config_path(path);
        }
        builder.build().context("Failed to build the agent")
    }
}
