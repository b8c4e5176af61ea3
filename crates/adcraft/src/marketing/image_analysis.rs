use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{default_platform, render_report};
use crate::models::content::ContentPart;
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::prompt_template::load_prompt;
use crate::providers::base::Provider;
use crate::systems::error::{ToolError, ToolResult};

pub const NAME: &str = "analyze_image_for_marketing";
pub const TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str = include_str!("../prompts/analyze_image_system.md");
const USER_TEMPLATE: &str = include_str!("../prompts/analyze_image_user.md");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeImageParams {
    pub image_url: String,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default = "default_platform")]
    pub target_platform: String,
    #[serde(default)]
    pub marketing_angle: Option<String>,
}

pub fn tool() -> Tool {
    Tool::new(
        NAME,
        "Analyze an image with a vision model and write marketing copy for it.",
        json!({
            "type": "object",
            "required": ["image_url"],
            "properties": {
                "image_url": {
                    "type": "string",
                    "description": "Publicly reachable URL of the image."
                },
                "product_name": {
                    "type": "string",
                    "default": null,
                    "description": "Product the image promotes, if any."
                },
                "target_platform": {
                    "type": "string",
                    "default": "general",
                    "description": "Where the copy will be published, e.g. weibo, xiaohongshu, douyin, wechat."
                },
                "marketing_angle": {
                    "type": "string",
                    "default": null,
                    "description": "Angle to emphasize, e.g. lifestyle, product_features, emotional_appeal."
                }
            }
        }),
    )
}

/// The multimodal request: instructions first, then the image reference.
///
/// The URL is passed through untouched; the image is never fetched here.
pub fn request_message(params: &AnalyzeImageParams) -> ToolResult<Message> {
    let instructions = load_prompt(USER_TEMPLATE, params)?;
    Ok(Message::user().with_parts(vec![
        ContentPart::text(instructions),
        ContentPart::image_url(params.image_url.clone()),
    ]))
}

pub async fn analyze_image_for_marketing(
    provider: &dyn Provider,
    params: &AnalyzeImageParams,
) -> ToolResult<String> {
    let message = request_message(params)?;
    let (reply, _usage) = provider
        .complete(SYSTEM_PROMPT, &[message], &[])
        .await
        .map_err(ToolError::provider)?;

    Ok(render_report(
        "Image Marketing Analysis Report",
        &[
            ("Image", Some(params.image_url.as_str())),
            ("Product", params.product_name.as_deref()),
            ("Target platform", Some(params.target_platform.as_str())),
            ("Marketing angle", params.marketing_angle.as_deref()),
        ],
        "Analysis",
        &reply.text(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;
    use crate::systems::parse_arguments;

    const URL: &str = "https://cdn.example.com/img/latte%20art.png?w=800&sig=a1b2";

    fn params() -> AnalyzeImageParams {
        parse_arguments(json!({"image_url": URL})).unwrap()
    }

    #[test]
    fn test_message_has_text_then_image() {
        let message = request_message(&params()).unwrap();
        let parts = message.parts();

        assert_eq!(parts.len(), 2);
        assert!(parts[0]
            .as_text()
            .unwrap()
            .starts_with("Please analyze this image"));
        assert_eq!(parts[1].as_image_url(), Some(URL));
    }

    #[test]
    fn test_optional_lines() {
        let message = request_message(&params()).unwrap();
        let text = message.parts()[0].as_text().unwrap().to_string();
        assert!(text.contains("publishing on general."));
        assert!(!text.contains("Product:"));
        assert!(!text.contains("Marketing angle:"));

        let mut params = params();
        params.product_name = Some("Oat Latte".to_string());
        params.marketing_angle = Some("lifestyle".to_string());
        params.target_platform = "xiaohongshu".to_string();
        let message = request_message(&params).unwrap();
        let text = message.parts()[0].as_text().unwrap().to_string();
        assert!(text.contains("publishing on xiaohongshu.\nProduct: Oat Latte\nMarketing angle: lifestyle\n"));
    }

    #[tokio::test]
    async fn test_analysis_sends_image_unmodified() {
        let provider = MockProvider::new(vec![Message::assistant().with_text("A warm cafe scene.")]);
        let report = analyze_image_for_marketing(&provider, &params())
            .await
            .unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, SYSTEM_PROMPT);
        let parts = requests[0].messages[0].parts();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].as_text().is_some());
        assert_eq!(parts[1].as_image_url(), Some(URL));

        assert!(report.starts_with("# Image Marketing Analysis Report\n"));
        assert!(report.contains(&format!("**Image**: {}\n", URL)));
        assert!(report.contains("**Target platform**: general\n"));
        assert!(!report.contains("**Product**"));
        assert!(report.ends_with("## Analysis\n\nA warm cafe scene."));
    }

    #[tokio::test]
    async fn test_provider_failure_is_error() {
        let provider = MockProvider::failing("vision model unavailable");
        let err = analyze_image_for_marketing(&provider, &params())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("vision model unavailable"));
    }
}
