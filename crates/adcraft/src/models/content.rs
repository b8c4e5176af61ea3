use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One part of a multimodal message, in the order it is presented to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WirePart", into = "WirePart")]
pub enum ContentPart {
    Text(String),
    /// A reference to an image by URL; the URL is passed through to the model untouched
    ImageUrl(String),
}

impl ContentPart {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentPart::Text(text.into())
    }

    pub fn image_url<S: Into<String>>(url: S) -> Self {
        ContentPart::ImageUrl(url.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_image_url(&self) -> Option<&str> {
        match self {
            ContentPart::ImageUrl(url) => Some(url),
            _ => None,
        }
    }

    /// The plain-text rendering of this part. Image references render as their URL.
    pub fn render(&self) -> &str {
        match self {
            ContentPart::Text(text) => text,
            ContentPart::ImageUrl(url) => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TypedPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

// Some gateways answer with bare strings inside a content list, or with part types
// such as `reasoning` that have no dedicated variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum WirePart {
    Bare(String),
    Typed(TypedPart),
    Other(Value),
}

/// Text of a value with no known shape: its `text` field if it has one, else its JSON
fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    }
}

impl From<WirePart> for ContentPart {
    fn from(part: WirePart) -> Self {
        match part {
            WirePart::Bare(text) => ContentPart::Text(text),
            WirePart::Typed(TypedPart::Text { text }) => ContentPart::Text(text),
            WirePart::Typed(TypedPart::ImageUrl { image_url }) => {
                ContentPart::ImageUrl(image_url.url)
            }
            WirePart::Other(value) => ContentPart::Text(render_value(&value)),
        }
    }
}

impl From<ContentPart> for WirePart {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => WirePart::Typed(TypedPart::Text { text }),
            ContentPart::ImageUrl(url) => {
                WirePart::Typed(TypedPart::ImageUrl { image_url: ImageUrl { url } })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// Content passed to or from an LLM: either a plain string or an ordered list of parts.
/// Any other JSON value is kept as is so it can still be rendered.
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
    Other(Value),
}

impl Content {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Content::Text(text.into())
    }

    pub fn parts(parts: Vec<ContentPart>) -> Self {
        Content::Parts(parts)
    }

    /// Collapse the content into a single string, joining list parts with spaces
    pub fn normalize(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Parts(parts) => parts
                .iter()
                .map(ContentPart::render)
                .collect::<Vec<_>>()
                .join(" "),
            Content::Other(value) => render_value(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_text() {
        assert_eq!(Content::text("hello").normalize(), "hello");
    }

    #[test]
    fn test_normalize_bare_string_list() -> anyhow::Result<()> {
        let content: Content = serde_json::from_value(json!(["a", "b"]))?;
        assert_eq!(content.normalize(), "a b");
        Ok(())
    }

    #[test]
    fn test_normalize_typed_parts() -> anyhow::Result<()> {
        let content: Content = serde_json::from_value(json!([
            {"type": "text", "text": "first"},
            {"type": "text", "text": "second"}
        ]))?;
        assert_eq!(content.normalize(), "first second");
        Ok(())
    }

    #[test]
    fn test_normalize_unknown_parts() -> anyhow::Result<()> {
        let content: Content = serde_json::from_value(json!([
            {"type": "text", "text": "a"},
            {"type": "reasoning", "text": "b"},
            3,
            {"type": "audio"}
        ]))?;
        assert_eq!(content.normalize(), r#"a b 3 {"type":"audio"}"#);
        Ok(())
    }

    #[test]
    fn test_normalize_non_list_value() -> anyhow::Result<()> {
        let content: Content = serde_json::from_value(json!({"text": "wrapped"}))?;
        assert_eq!(content.normalize(), "wrapped");

        let content: Content = serde_json::from_value(json!(42))?;
        assert_eq!(content.normalize(), "42");
        Ok(())
    }

    #[test]
    fn test_plain_string_is_text() -> anyhow::Result<()> {
        let content: Content = serde_json::from_value(json!("just text"))?;
        assert_eq!(content, Content::text("just text"));
        Ok(())
    }

    #[test]
    fn test_parts_wire_shape() -> anyhow::Result<()> {
        let content = Content::parts(vec![
            ContentPart::text("describe this"),
            ContentPart::image_url("https://example.com/a.png?x=1&y=2"),
        ]);

        let value = serde_json::to_value(&content)?;
        assert_eq!(
            value,
            json!([
                {"type": "text", "text": "describe this"},
                {"type": "image_url", "image_url": {"url": "https://example.com/a.png?x=1&y=2"}}
            ])
        );
        Ok(())
    }

    #[test]
    fn test_part_accessors() {
        let text = ContentPart::text("hi");
        let image = ContentPart::image_url("https://example.com/b.jpg");
        assert_eq!(text.as_text(), Some("hi"));
        assert_eq!(text.as_image_url(), None);
        assert_eq!(image.as_image_url(), Some("https://example.com/b.jpg"));
    }
}
