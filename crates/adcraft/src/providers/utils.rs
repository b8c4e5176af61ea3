use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::{json, Value};

use crate::errors::AgentError;
use crate::models::content::Content;
use crate::models::message::{Message, MessageContent, RawToolCall, ToolRequest};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

const UNPARSED_TOOL_NAME: &str = "unparsed_tool_call";

/// Convert internal Message format to OpenAI's API message specification
///   messages that carry an image are sent as an ordered list of content parts,
///   everything else is sent as a plain string
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role
        });

        let mut output = Vec::new();

        if message.has_image() {
            converted["content"] = json!(Content::parts(message.parts()));
        } else {
            let text = message.text();
            if !text.is_empty() {
                converted["content"] = json!(text);
            }
        }

        for content in &message.content {
            match content {
                MessageContent::Text(_) | MessageContent::ImageUrl(_) => {}
                MessageContent::ToolRequest(request) => {
                    let (name, arguments) = wire_function(request);
                    let tool_calls = converted
                        .as_object_mut()
                        .unwrap()
                        .entry("tool_calls")
                        .or_insert(json!([]));

                    // Every request is echoed, including ones that failed to parse, so the
                    // tool response that follows always has a matching call id
                    tool_calls.as_array_mut().unwrap().push(json!({
                        "id": request.id,
                        "type": "function",
                        "function": {
                            "name": name,
                            "arguments": arguments,
                        }
                    }));
                }
                MessageContent::ToolResponse(response) => match &response.tool_result {
                    Ok(text) => {
                        output.push(json!({
                            "role": "tool",
                            "content": text,
                            "tool_call_id": response.id
                        }));
                    }
                    Err(e) => {
                        // A tool result error is shown as output so the model can interpret the error message
                        output.push(json!({
                            "role": "tool",
                            "content": format!("The tool call returned the following error:\n{}", e),
                            "tool_call_id": response.id
                        }));
                    }
                },
            }
        }

        if converted.get("content").is_some() || converted.get("tool_calls").is_some() {
            output.insert(0, converted);
        }
        messages_spec.extend(output);
    }

    messages_spec
}

/// The function name and argument string to send back for a tool request
fn wire_function(request: &ToolRequest) -> (String, String) {
    match (&request.tool_call, &request.raw) {
        (Ok(tool_call), _) => (
            sanitize_function_name(&tool_call.name),
            tool_call.arguments.to_string(),
        ),
        (Err(_), raw) => {
            let name = raw
                .as_ref()
                .map(|raw| sanitize_function_name(&raw.name))
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNPARSED_TOOL_NAME.to_string());
            // Strict gateways validate echoed arguments, so only well-formed JSON is kept
            let arguments = raw
                .as_ref()
                .map(|raw| raw.arguments.as_str())
                .filter(|args| serde_json::from_str::<Value>(args).is_ok())
                .unwrap_or("{}")
                .to_string();
            (name, arguments)
        }
    }
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to internal Message format
///   the response content may be a string or a list of parts, it is always
///   normalized into a single text content
pub fn openai_response_to_message(response: Value) -> Result<Message> {
    let original = response["choices"][0]["message"].clone();
    let mut content = Vec::new();

    if let Some(raw) = original.get("content").filter(|c| !c.is_null()) {
        let parsed: Content = serde_json::from_value(raw.clone())
            .map_err(|e| anyhow!("Unexpected message content shape {}: {}", raw, e))?;
        let text = parsed.normalize();
        if !text.is_empty() {
            content.push(MessageContent::text(text));
        }
    }

    if let Some(tool_calls) = original.get("tool_calls") {
        if let Some(tool_calls_array) = tool_calls.as_array() {
            for tool_call in tool_calls_array {
                let id = tool_call["id"].as_str().unwrap_or_default().to_string();
                let function_name = tool_call["function"]["name"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let arguments = tool_call["function"]["arguments"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();

                if !is_valid_function_name(&function_name) {
                    let error = AgentError::ToolNotFound(format!(
                        "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                        function_name
                    ));
                    let raw = RawToolCall {
                        name: function_name,
                        arguments,
                    };
                    content.push(MessageContent::rejected_tool_request(id, error, raw));
                } else {
                    // Some gateways send an empty string for calls without arguments
                    let arguments = if arguments.trim().is_empty() {
                        "{}".to_string()
                    } else {
                        arguments
                    };
                    match serde_json::from_str::<Value>(&arguments) {
                        Ok(params) => {
                            content.push(MessageContent::tool_request(
                                id,
                                Ok(ToolCall::new(&function_name, params)),
                            ));
                        }
                        Err(e) => {
                            let error = AgentError::InvalidParameters(format!(
                                "Could not interpret tool use parameters for id {}: {}",
                                id, e
                            ));
                            let raw = RawToolCall {
                                name: function_name,
                                arguments,
                            };
                            content.push(MessageContent::rejected_tool_request(id, error, raw));
                        }
                    }
                }
            }
        }
    }

    Ok(Message {
        role: Role::Assistant,
        created: chrono::Utc::now().timestamp(),
        content,
    })
}

fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded. Message: {0}")]
pub struct ContextLengthExceededError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ContextLengthExceededError(message))
    } else {
        None
    }
}
