//! Assembles the agent: primary client, system prompt, marketing tools and, in
//! checkpointed mode, conversation memory.

use std::path::PathBuf;
use thiserror::Error;

use crate::agent::Agent;
use crate::config::{workspace_config_path, AgentConfig, ConfigError};
use crate::marketing::MarketingSystem;
use crate::providers::configs::{CredentialError, Credentials, OpenAiProviderConfig};
use crate::providers::factory::ModelClientFactory;
use crate::runtime::{RuntimeContext, RuntimeMode};

/// The failures that abort agent construction
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Failed to construct model client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, Default)]
pub struct AgentBuilder {
    config_path: Option<PathBuf>,
    mode: RuntimeMode,
    context: RuntimeContext,
    credentials: Option<Credentials>,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the config from this file instead of the workspace location
    pub fn config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn context(mut self, context: RuntimeContext) -> Self {
        self.context = context;
        self
    }

    /// Use these credentials instead of reading the environment
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    fn resolve(&self) -> Result<(AgentConfig, ModelClientFactory), BuildError> {
        let path = self
            .config_path
            .clone()
            .unwrap_or_else(workspace_config_path);
        let config = AgentConfig::load(&path)?;

        let credentials = match &self.credentials {
            Some(credentials) => credentials.clone(),
            None => Credentials::from_env()?,
        };

        Ok((
            config,
            ModelClientFactory::new(credentials, self.context.clone()),
        ))
    }

    /// The primary client's settings, as `build` would use them
    pub fn agent_client_config(&self) -> Result<OpenAiProviderConfig, BuildError> {
        let (config, factory) = self.resolve()?;
        Ok(factory.agent_config(&config))
    }

    pub fn build(self) -> Result<Agent, BuildError> {
        let (config, factory) = self.resolve()?;

        let provider = factory
            .agent_client(&config)
            .map_err(|e| BuildError::Client(format!("{:#}", e)))?;
        let marketing =
            MarketingSystem::new(&factory).map_err(|e| BuildError::Client(format!("{:#}", e)))?;

        let mut agent = Agent::new(Box::new(provider), config.system_prompt.clone())
            .with_checkpointer(self.mode.checkpointer());
        agent.add_system(Box::new(marketing));

        tracing::info!(
            model = %config.model,
            temperature = config.temperature,
            timeout_secs = config.timeout.as_secs(),
            mode = ?self.mode,
            "agent built"
        );
        Ok(agent)
    }
}

/// Build an agent from the workspace config and environment credentials
pub fn build_agent(mode: RuntimeMode, context: RuntimeContext) -> Result<Agent, BuildError> {
    AgentBuilder::new().mode(mode).context(context).build()
}
