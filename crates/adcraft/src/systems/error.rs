use thiserror::Error;

/// Failure inside a tool body, after its arguments were accepted
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to render prompt: {0}")]
    Prompt(#[from] tera::Error),

    #[error("Model call failed: {0}")]
    Provider(String),
}

impl ToolError {
    /// Keep the whole context chain of a provider failure
    pub fn provider(err: anyhow::Error) -> Self {
        ToolError::Provider(format!("{:#}", err))
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
