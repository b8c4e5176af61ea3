use std::collections::HashMap;
use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::config::ThinkingMode;

pub const API_KEY_VAR: &str = "COZE_WORKLOAD_IDENTITY_API_KEY";
pub const BASE_URL_VAR: &str = "COZE_INTEGRATION_MODEL_BASE_URL";

#[derive(Debug, Error, PartialEq)]
pub enum CredentialError {
    #[error(
        "Model API environment variable '{var}' is not set. \
         Both COZE_WORKLOAD_IDENTITY_API_KEY and COZE_INTEGRATION_MODEL_BASE_URL must be configured."
    )]
    Missing { var: &'static str },
}

/// Credential and endpoint for the OpenAI-compatible model gateway
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub api_key: String,
    pub base_url: String,
}

impl Credentials {
    pub fn new<K: Into<String>, U: Into<String>>(api_key: K, base_url: U) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Load credentials from the process environment
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load credentials through an arbitrary lookup; empty values count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or(CredentialError::Missing { var })
        };

        let api_key = get(API_KEY_VAR)?;
        let base_url = get(BASE_URL_VAR)?;
        Ok(Self::new(api_key, base_url))
    }
}

/// Everything needed to build a client against an OpenAI-compatible endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub timeout: Duration,
    pub stream: bool,
    pub thinking: Option<ThinkingMode>,
    /// Extra headers sent with every request
    pub headers: HashMap<String, String>,
}

impl OpenAiProviderConfig {
    pub fn new<M: Into<String>>(credentials: &Credentials, model: M) -> Self {
        Self {
            host: credentials.base_url.clone(),
            api_key: credentials.api_key.clone(),
            model: model.into(),
            temperature: None,
            timeout: Duration::from_secs(600),
            stream: false,
            thinking: None,
            headers: HashMap::new(),
        }
    }
}
