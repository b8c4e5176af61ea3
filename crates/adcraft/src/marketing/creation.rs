use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{default_audience, default_length, default_tone};
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::prompt_template::load_prompt;
use crate::providers::base::Provider;
use crate::systems::error::{ToolError, ToolResult};

pub const NAME: &str = "create_content";
pub const TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str = include_str!("../prompts/create_content_system.md");
const USER_TEMPLATE: &str = include_str!("../prompts/create_content_user.md");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateContentParams {
    pub content_type: String,
    pub topic: String,
    #[serde(default = "default_audience")]
    pub target_audience: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_length")]
    pub length: String,
    #[serde(default)]
    pub additional_requirements: Option<String>,
}

pub fn tool() -> Tool {
    Tool::new(
        NAME,
        "Write marketing content of a given type on a topic, tuned to an audience, tone and length.",
        json!({
            "type": "object",
            "required": ["content_type", "topic"],
            "properties": {
                "content_type": {
                    "type": "string",
                    "description": "Kind of content, e.g. article, blog_post, social_media, ad_copy, email."
                },
                "topic": {
                    "type": "string",
                    "description": "What the content is about."
                },
                "target_audience": {
                    "type": "string",
                    "default": "general",
                    "description": "Who the content is for, e.g. young_adults, professionals, parents."
                },
                "tone": {
                    "type": "string",
                    "default": "professional",
                    "description": "Voice of the content, e.g. professional, casual, friendly, persuasive."
                },
                "length": {
                    "type": "string",
                    "default": "medium",
                    "description": "One of short, medium, long."
                },
                "additional_requirements": {
                    "type": "string",
                    "default": null,
                    "description": "Any further instructions for the writer."
                }
            }
        }),
    )
}

pub fn user_prompt(params: &CreateContentParams) -> ToolResult<String> {
    Ok(load_prompt(USER_TEMPLATE, params)?)
}

/// One non-streaming model call; returns the model's text as-is
pub async fn create_content(
    provider: &dyn Provider,
    params: &CreateContentParams,
) -> ToolResult<String> {
    let message = Message::user().with_text(user_prompt(params)?);
    let (reply, _usage) = provider
        .complete(SYSTEM_PROMPT, &[message], &[])
        .await
        .map_err(ToolError::provider)?;
    Ok(reply.text())
}
