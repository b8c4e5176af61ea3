use super::content::ContentPart;
use super::role::Role;
use super::tool::ToolCall;
use crate::errors::{AgentError, AgentResult};
use chrono::Utc;

/// A tool call exactly as the model sent it, before its name and arguments are checked
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawToolCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub tool_call: AgentResult<ToolCall>,
    /// Kept for requests the model sent in a form that could not be parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawToolCall>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolResponse {
    pub id: String,
    pub tool_result: AgentResult<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// Content passed inside a message, which can be both simple content and tool content
pub enum MessageContent {
    Text(String),
    ImageUrl(String),
    ToolRequest(ToolRequest),
    ToolResponse(ToolResponse),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text(text.into())
    }

    pub fn tool_request<S: Into<String>>(id: S, tool_call: AgentResult<ToolCall>) -> Self {
        MessageContent::ToolRequest(ToolRequest {
            id: id.into(),
            tool_call,
            raw: None,
        })
    }

    /// A request that failed to parse, remembered with what the model actually sent
    pub fn rejected_tool_request<S: Into<String>>(
        id: S,
        error: AgentError,
        raw: RawToolCall,
    ) -> Self {
        MessageContent::ToolRequest(ToolRequest {
            id: id.into(),
            tool_call: Err(error),
            raw: Some(raw),
        })
    }

    pub fn tool_response<S: Into<String>>(id: S, tool_result: AgentResult<String>) -> Self {
        MessageContent::ToolResponse(ToolResponse {
            id: id.into(),
            tool_result,
        })
    }

    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        if let MessageContent::ToolRequest(ref tool_request) = self {
            Some(tool_request)
        } else {
            None
        }
    }

    pub fn as_tool_response(&self) -> Option<&ToolResponse> {
        if let MessageContent::ToolResponse(ref tool_response) = self {
            Some(tool_response)
        } else {
            None
        }
    }

    /// Get the text content if this is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The multimodal part this content maps to, if it is simple content
    pub fn as_part(&self) -> Option<ContentPart> {
        match self {
            MessageContent::Text(text) => Some(ContentPart::text(text.as_str())),
            MessageContent::ImageUrl(url) => Some(ContentPart::image_url(url.as_str())),
            _ => None,
        }
    }
}

impl From<ContentPart> for MessageContent {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => MessageContent::Text(text),
            ContentPart::ImageUrl(url) => MessageContent::ImageUrl(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Vec<MessageContent>,
}

impl Message {
    /// Create a new user message with the current timestamp
    pub fn user() -> Self {
        Message {
            role: Role::User,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant() -> Self {
        Message {
            role: Role::Assistant,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Add any MessageContent to the message
    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    /// Add multimodal parts to the message, preserving their order
    pub fn with_parts(self, parts: Vec<ContentPart>) -> Self {
        parts
            .into_iter()
            .fold(self, |message, part| message.with_content(part.into()))
    }

    /// Add a tool request to the message
    pub fn with_tool_request<S: Into<String>>(
        self,
        id: S,
        tool_call: AgentResult<ToolCall>,
    ) -> Self {
        self.with_content(MessageContent::tool_request(id, tool_call))
    }

    /// Add a tool response to the message
    pub fn with_tool_response<S: Into<String>>(self, id: S, result: AgentResult<String>) -> Self {
        self.with_content(MessageContent::tool_response(id, result))
    }

    /// All text content of the message joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(MessageContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The multimodal parts of the message in their original order
    pub fn parts(&self) -> Vec<ContentPart> {
        self.content.iter().filter_map(MessageContent::as_part).collect()
    }

    pub fn tool_requests(&self) -> Vec<&ToolRequest> {
        self.content
            .iter()
            .filter_map(MessageContent::as_tool_request)
            .collect()
    }

    pub fn has_image(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, MessageContent::ImageUrl(_)))
    }
}
