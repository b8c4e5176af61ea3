use anyhow::Result;
use std::time::Duration;

use super::configs::{Credentials, OpenAiProviderConfig};
use super::openai::OpenAiProvider;
use crate::config::AgentConfig;
use crate::runtime::RuntimeContext;

/// Text model used by the tool-level helper calls
pub const TEXT_MODEL: &str = "doubao-seed-1-6-251015";
/// Vision-capable model used for image analysis
pub const VISION_MODEL: &str = "doubao-seed-1-6-vision-250815";
/// Tool calls need one complete answer within this window
pub const TOOL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Text,
    Vision,
}

impl ModelKind {
    pub fn model(&self) -> &'static str {
        match self {
            ModelKind::Text => TEXT_MODEL,
            ModelKind::Vision => VISION_MODEL,
        }
    }
}

/// Builds chat clients that share credentials and runtime headers
#[derive(Debug, Clone)]
pub struct ModelClientFactory {
    credentials: Credentials,
    context: RuntimeContext,
}

impl ModelClientFactory {
    pub fn new(credentials: Credentials, context: RuntimeContext) -> Self {
        Self {
            credentials,
            context,
        }
    }

    /// Config for the agent's primary client: streaming, with the configured thinking mode
    pub fn agent_config(&self, config: &AgentConfig) -> OpenAiProviderConfig {
        let mut provider_config = OpenAiProviderConfig::new(&self.credentials, &config.model);
        provider_config.temperature = Some(config.temperature);
        provider_config.timeout = config.timeout;
        provider_config.stream = true;
        provider_config.thinking = Some(config.thinking);
        provider_config.headers = self.context.default_headers();
        provider_config
    }

    /// Config for a tool helper client: non-streaming with a fixed timeout
    pub fn tool_config(&self, kind: ModelKind, temperature: f32) -> OpenAiProviderConfig {
        let mut provider_config = OpenAiProviderConfig::new(&self.credentials, kind.model());
        provider_config.temperature = Some(temperature);
        provider_config.timeout = TOOL_TIMEOUT;
        provider_config.stream = false;
        provider_config.headers = self.context.default_headers();
        provider_config
    }

    pub fn agent_client(&self, config: &AgentConfig) -> Result<OpenAiProvider> {
        OpenAiProvider::new(self.agent_config(config))
    }

    pub fn tool_client(&self, kind: ModelKind, temperature: f32) -> Result<OpenAiProvider> {
        OpenAiProvider::new(self.tool_config(kind, temperature))
    }
}
