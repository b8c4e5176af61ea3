use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{default_audience, render_report};
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::prompt_template::load_prompt;
use crate::providers::base::Provider;
use crate::systems::error::{ToolError, ToolResult};

pub const NAME: &str = "optimize_content";
/// Lower than creation so the rewrite stays close to the original intent
pub const TEMPERATURE: f32 = 0.5;

pub const GENERIC_GOAL_DESCRIPTION: &str = "Optimize the content";

const SYSTEM_TEMPLATE: &str = include_str!("../prompts/optimize_content_system.md");
const USER_TEMPLATE: &str = include_str!("../prompts/optimize_content_user.md");

/// Human-readable description of a known optimization goal
pub fn goal_description(goal: &str) -> &'static str {
    match goal {
        "improve_clarity" => "Improve the clarity and readability of the content",
        "increase_engagement" => "Make the content more engaging and interactive",
        "make_more_persuasive" => "Make the content more persuasive and likely to convert",
        "shorten" => "Condense the content while keeping the core message",
        "expand" => "Expand the content with more detail and depth",
        _ => GENERIC_GOAL_DESCRIPTION,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeContentParams {
    pub original_content: String,
    #[serde(default = "default_goal")]
    pub optimization_goal: String,
    #[serde(default = "default_audience")]
    pub target_audience: String,
    #[serde(default)]
    pub platform_constraints: Option<String>,
}

fn default_goal() -> String {
    "improve_clarity".to_string()
}

#[derive(Serialize)]
struct PromptContext<'a> {
    #[serde(flatten)]
    params: &'a OptimizeContentParams,
    goal_description: &'static str,
}

pub fn tool() -> Tool {
    Tool::new(
        NAME,
        "Rewrite existing content toward an optimization goal and report what changed.",
        json!({
            "type": "object",
            "required": ["original_content"],
            "properties": {
                "original_content": {
                    "type": "string",
                    "description": "The text to optimize."
                },
                "optimization_goal": {
                    "type": "string",
                    "default": "improve_clarity",
                    "description": "One of improve_clarity, increase_engagement, make_more_persuasive, shorten, expand."
                },
                "target_audience": {
                    "type": "string",
                    "default": "general",
                    "description": "Who the content is for, e.g. young_adults, professionals, international."
                },
                "platform_constraints": {
                    "type": "string",
                    "default": null,
                    "description": "Limits imposed by the publishing platform, e.g. twitter_280_chars."
                }
            }
        }),
    )
}

/// System and user prompts for one optimization request
pub fn prompts(params: &OptimizeContentParams) -> ToolResult<(String, String)> {
    let context = PromptContext {
        params,
        goal_description: goal_description(&params.optimization_goal),
    };
    let system = load_prompt(SYSTEM_TEMPLATE, &context)?;
    let user = load_prompt(USER_TEMPLATE, &context)?;
    Ok((system, user))
}

pub async fn optimize_content(
    provider: &dyn Provider,
    params: &OptimizeContentParams,
) -> ToolResult<String> {
    let (system, user) = prompts(params)?;
    let (reply, _usage) = provider
        .complete(&system, &[Message::user().with_text(user)], &[])
        .await
        .map_err(ToolError::provider)?;

    Ok(render_report(
        "Content Optimization Report",
        &[
            ("Optimization goal", Some(params.optimization_goal.as_str())),
            ("Target audience", Some(params.target_audience.as_str())),
            ("Platform constraints", params.platform_constraints.as_deref()),
        ],
        "Optimized Content",
        &reply.text(),
    ))
}
