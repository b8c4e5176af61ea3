//! Marketing content tools: creation, optimization and image analysis.
//!
//! Each tool makes exactly one non-streaming model call. A failure inside a tool body is
//! rendered as an inline error message for the model to read, so one failed call never
//! ends the conversation.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::Provider;
use crate::providers::factory::{ModelClientFactory, ModelKind};
use crate::systems::error::ToolResult;
use crate::systems::{parse_arguments, System};

pub mod creation;
pub mod image_analysis;
pub mod optimization;

/// Prefix of every tool output that reports a failure
pub const TOOL_ERROR_MARKER: &str = "Error:";

pub struct MarketingSystem {
    tools: Vec<Tool>,
    creation: Arc<dyn Provider>,
    optimization: Arc<dyn Provider>,
    vision: Arc<dyn Provider>,
}

impl MarketingSystem {
    /// Build the three helper clients from the shared factory
    pub fn new(factory: &ModelClientFactory) -> Result<Self> {
        Ok(Self::with_providers(
            Arc::new(factory.tool_client(ModelKind::Text, creation::TEMPERATURE)?),
            Arc::new(factory.tool_client(ModelKind::Text, optimization::TEMPERATURE)?),
            Arc::new(factory.tool_client(ModelKind::Vision, image_analysis::TEMPERATURE)?),
        ))
    }

    pub fn with_providers(
        creation: Arc<dyn Provider>,
        optimization: Arc<dyn Provider>,
        vision: Arc<dyn Provider>,
    ) -> Self {
        Self {
            tools: tools(),
            creation,
            optimization,
            vision,
        }
    }
}

#[async_trait]
impl System for MarketingSystem {
    fn name(&self) -> &str {
        "marketing"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<String> {
        let output = match tool_call.name.as_str() {
            creation::NAME => {
                let params = parse_arguments(tool_call.arguments)?;
                let outcome = creation::create_content(self.creation.as_ref(), &params).await;
                render_outcome("content creation", outcome)
            }
            optimization::NAME => {
                let params = parse_arguments(tool_call.arguments)?;
                let outcome =
                    optimization::optimize_content(self.optimization.as_ref(), &params).await;
                render_outcome("content optimization", outcome)
            }
            image_analysis::NAME => {
                let params = parse_arguments(tool_call.arguments)?;
                let outcome =
                    image_analysis::analyze_image_for_marketing(self.vision.as_ref(), &params)
                        .await;
                render_outcome("image analysis", outcome)
            }
            _ => return Err(AgentError::ToolNotFound(tool_call.name)),
        };
        Ok(output)
    }
}

/// Definitions of the marketing tools, in registration order
pub fn tools() -> Vec<Tool> {
    vec![
        creation::tool(),
        optimization::tool(),
        image_analysis::tool(),
    ]
}

/// Turn a tool outcome into the text the model sees
pub fn render_outcome(operation: &str, outcome: ToolResult<String>) -> String {
    match outcome {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(operation, error = %err, "tool failed, returning the error to the model");
            format!("{} {} failed: {}", TOOL_ERROR_MARKER, operation, err)
        }
    }
}

/// A Markdown report: title, labeled fields (absent ones skipped), then the model output
pub(crate) fn render_report(
    title: &str,
    fields: &[(&str, Option<&str>)],
    section: &str,
    body: &str,
) -> String {
    let mut report = format!("# {}\n\n", title);
    for (label, value) in fields {
        if let Some(value) = value {
            report.push_str(&format!("**{}**: {}\n", label, value));
        }
    }
    report.push_str(&format!("\n## {}\n\n{}", section, body));
    report
}

fn default_audience() -> String {
    "general".to_string()
}

fn default_platform() -> String {
    "general".to_string()
}

fn default_tone() -> String {
    "professional".to_string()
}

fn default_length() -> String {
    "medium".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Message;
    use crate::providers::mock::MockProvider;
    use serde_json::json;

    fn system_with(provider: MockProvider) -> MarketingSystem {
        let provider: Arc<dyn Provider> = Arc::new(provider);
        MarketingSystem::with_providers(provider.clone(), provider.clone(), provider)
    }

    #[test]
    fn test_registers_three_tools() {
        let system = system_with(MockProvider::new(vec![]));
        let names: Vec<&str> = system.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "create_content",
                "optimize_content",
                "analyze_image_for_marketing"
            ]
        );
        assert_eq!(system.tools()[0].required_parameters(), vec!["content_type", "topic"]);
        assert_eq!(system.tools()[1].required_parameters(), vec!["original_content"]);
        assert_eq!(system.tools()[2].required_parameters(), vec!["image_url"]);
    }

    #[tokio::test]
    async fn test_every_tool_returns_error_text_on_failure() {
        let system = system_with(MockProvider::failing("network unreachable"));
        let calls = vec![
            ToolCall::new(
                "create_content",
                json!({"content_type": "ad_copy", "topic": "sneakers"}),
            ),
            ToolCall::new("optimize_content", json!({"original_content": "Buy now."})),
            ToolCall::new(
                "analyze_image_for_marketing",
                json!({"image_url": "https://example.com/a.png"}),
            ),
        ];

        for call in calls {
            let output = system.call(call).await.unwrap();
            assert!(output.starts_with(TOOL_ERROR_MARKER), "got: {}", output);
            assert!(output.contains("network unreachable"));
        }
    }

    #[tokio::test]
    async fn test_call_dispatches_by_name() {
        let system = system_with(MockProvider::new(vec![
            Message::assistant().with_text("Fresh kicks."),
        ]));
        let output = system
            .call(ToolCall::new(
                "create_content",
                json!({"content_type": "ad_copy", "topic": "sneakers"}),
            ))
            .await
            .unwrap();
        assert_eq!(output, "Fresh kicks.");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let system = system_with(MockProvider::new(vec![]));
        let err = system
            .call(ToolCall::new("delete_everything", json!({})))
            .await
            .unwrap_err();
        assert_eq!(err, AgentError::ToolNotFound("delete_everything".to_string()));
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let provider = MockProvider::new(vec![]);
        let system = system_with(provider.clone());
        let err = system
            .call(ToolCall::new("optimize_content", json!({"optimization_goal": "shorten"})))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
        assert!(provider.requests().is_empty());
    }

    #[test]
    fn test_render_report_skips_absent_fields() {
        let report = render_report(
            "Title",
            &[("A", Some("1")), ("B", None), ("C", Some("3"))],
            "Body",
            "text",
        );
        assert_eq!(report, "# Title\n\n**A**: 1\n**C**: 3\n\n## Body\n\ntext");
    }
}
