//! Agent configuration file loading.
//!
//! The file lives at `$COZE_WORKSPACE_PATH/config/agent_llm_config.json` and has the shape
//! `{"config": {"model", "temperature", "timeout", "thinking"}, "sp": "..."}`. The `config`
//! section is mandatory; every field inside it, and `sp`, falls back to a default.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::providers::factory::TEXT_MODEL;

pub const WORKSPACE_PATH_VAR: &str = "COZE_WORKSPACE_PATH";
pub const DEFAULT_WORKSPACE_PATH: &str = "/workspace/projects";
pub const LLM_CONFIG: &str = "config/agent_llm_config.json";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Use tools when helpful.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config file {} is missing the required `{section}` section", .path.display())]
    MissingSection { path: PathBuf, section: &'static str },
}

/// Whether the model should spend tokens on extended reasoning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingMode {
    Enabled,
    #[default]
    Disabled,
}

#[derive(Debug, Deserialize)]
struct ModelSettings {
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_temperature")]
    temperature: f32,
    #[serde(default = "default_timeout")]
    timeout: u64,
    #[serde(default)]
    thinking: ThinkingMode,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    config: Option<ModelSettings>,
    sp: Option<String>,
}

/// Settings for the agent's primary model client, immutable once loaded
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub thinking: ThinkingMode,
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            thinking: ThinkingMode::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl AgentConfig {
    /// Read and parse the config file. A missing or unreadable file is an error, never a default.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    /// Parse config text; `path` is only used for error reporting
    pub fn parse(raw: &str, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file: ConfigFile = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = file.config.ok_or_else(|| ConfigError::MissingSection {
            path: path.to_path_buf(),
            section: "config",
        })?;

        Ok(Self {
            model: settings.model,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout),
            thinking: settings.thinking,
            system_prompt: file
                .sp
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        })
    }
}

/// Location of the config file inside the workspace named by `COZE_WORKSPACE_PATH`
pub fn workspace_config_path() -> PathBuf {
    let workspace =
        env::var(WORKSPACE_PATH_VAR).unwrap_or_else(|_| DEFAULT_WORKSPACE_PATH.to_string());
    Path::new(&workspace).join(LLM_CONFIG)
}

fn default_model() -> String {
    TEXT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_explicit_temperature_default_timeout() {
        let config = AgentConfig::parse(
            r#"{"config": {"model": "m-1", "temperature": 0.3}, "sp": "Be brief."}"#,
            "cfg.json",
        )
        .unwrap();

        assert_eq!(config.model, "m-1");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.timeout, Duration::from_secs(600));
        assert_eq!(config.thinking, ThinkingMode::Disabled);
        assert_eq!(config.system_prompt, "Be brief.");
    }

    #[test]
    fn test_all_defaults() {
        let config = AgentConfig::parse(r#"{"config": {}}"#, "cfg.json").unwrap();
        assert_eq!(config, AgentConfig::default());
    }

    #[test]
    fn test_thinking_enabled() {
        let config =
            AgentConfig::parse(r#"{"config": {"thinking": "enabled", "timeout": 90}}"#, "c")
                .unwrap();
        assert_eq!(config.thinking, ThinkingMode::Enabled);
        assert_eq!(config.timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_missing_config_section() {
        let err = AgentConfig::parse(r#"{"sp": "hello"}"#, "/tmp/cfg.json").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingSection {
                section: "config",
                ..
            }
        ));
        assert!(err.to_string().contains("/tmp/cfg.json"));
    }

    #[test]
    fn test_parse_error_carries_path() {
        let err = AgentConfig::parse("{not json", "/srv/agent.json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("/srv/agent.json"));
    }

    #[test]
    fn test_wrong_field_type_is_parse_error() {
        let err = AgentConfig::parse(r#"{"config": {"temperature": "hot"}}"#, "c").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = AgentConfig::load(&path).unwrap_err();
        match err {
            ConfigError::Read { path: p, .. } => assert_eq!(p, path),
            other => panic!("Expected read error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent_llm_config.json");
        fs::write(&path, r#"{"config": {"model": "file-model"}, "sp": "From file"}"#).unwrap();

        let config = AgentConfig::load(&path).unwrap();
        assert_eq!(config.model, "file-model");
        assert_eq!(config.system_prompt, "From file");
    }

    #[test]
    #[serial]
    fn test_workspace_config_path() {
        env::set_var(WORKSPACE_PATH_VAR, "/opt/ws");
        assert_eq!(
            workspace_config_path(),
            PathBuf::from("/opt/ws/config/agent_llm_config.json")
        );

        env::remove_var(WORKSPACE_PATH_VAR);
        assert_eq!(
            workspace_config_path(),
            PathBuf::from("/workspace/projects/config/agent_llm_config.json")
        );
    }
}
