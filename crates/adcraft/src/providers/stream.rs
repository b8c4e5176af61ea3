//! Accumulation of server-sent chat completion chunks into one complete response.
//!
//! The result has the same shape as a non-streaming completion body, so the rest of
//! the provider can parse both the same way.

use anyhow::{anyhow, Result};
use futures::{Stream, StreamExt};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::models::content::Content;

#[derive(Debug, Default)]
struct ToolCallFragment {
    id: String,
    name: String,
    arguments: String,
}

/// Folds `chat.completion.chunk` payloads together
#[derive(Debug, Default)]
pub struct ChunkAccumulator {
    content: String,
    saw_content: bool,
    tool_calls: BTreeMap<u64, ToolCallFragment>,
    usage: Option<Value>,
    error: Option<Value>,
    done: bool,
}

impl ChunkAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one SSE line. Lines that are not `data:` fields are ignored.
    pub fn push_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim_end_matches('\r');
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(());
        };
        let data = data.trim();
        if data.is_empty() {
            return Ok(());
        }
        if data == "[DONE]" {
            self.done = true;
            return Ok(());
        }

        let chunk: Value = serde_json::from_str(data)
            .map_err(|e| anyhow!("Malformed stream chunk {}: {}", data, e))?;
        self.push_chunk(&chunk)
    }

    pub fn push_chunk(&mut self, chunk: &Value) -> Result<()> {
        if let Some(error) = chunk.get("error") {
            self.error = Some(error.clone());
            self.done = true;
            return Ok(());
        }

        if let Some(usage) = chunk.get("usage").filter(|u| !u.is_null()) {
            self.usage = Some(usage.clone());
        }

        let Some(delta) = chunk["choices"].get(0).and_then(|c| c.get("delta")) else {
            return Ok(());
        };

        if let Some(raw) = delta.get("content").filter(|c| !c.is_null()) {
            let content: Content = serde_json::from_value(raw.clone())?;
            self.content.push_str(&content.normalize());
            self.saw_content = true;
        }

        if let Some(calls) = delta.get("tool_calls").and_then(Value::as_array) {
            for (position, call) in calls.iter().enumerate() {
                let index = call
                    .get("index")
                    .and_then(Value::as_u64)
                    .unwrap_or(position as u64);
                let fragment = self.tool_calls.entry(index).or_default();
                if let Some(id) = call.get("id").and_then(Value::as_str) {
                    fragment.id = id.to_string();
                }
                if let Some(name) = call["function"].get("name").and_then(Value::as_str) {
                    fragment.name.push_str(name);
                }
                if let Some(args) = call["function"].get("arguments").and_then(Value::as_str) {
                    fragment.arguments.push_str(args);
                }
            }
        }

        Ok(())
    }

    /// The accumulated response in non-streaming completion form
    pub fn finish(self) -> Value {
        if let Some(error) = self.error {
            return json!({ "error": error });
        }

        let mut message = Map::new();
        message.insert("role".to_string(), json!("assistant"));
        if self.saw_content {
            message.insert("content".to_string(), json!(self.content));
        }
        if !self.tool_calls.is_empty() {
            let calls: Vec<Value> = self
                .tool_calls
                .into_values()
                .map(|fragment| {
                    json!({
                        "id": fragment.id,
                        "type": "function",
                        "function": {
                            "name": fragment.name,
                            "arguments": fragment.arguments,
                        }
                    })
                })
                .collect();
            message.insert("tool_calls".to_string(), json!(calls));
        }

        let mut response = json!({
            "choices": [{ "index": 0, "message": Value::Object(message) }]
        });
        if let Some(usage) = self.usage {
            response["usage"] = usage;
        }
        response
    }
}

/// Read an SSE byte stream to the end (or `[DONE]`) and return the accumulated response
pub async fn collect_sse<S, B, E>(mut body: S) -> Result<Value>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut accumulator = ChunkAccumulator::new();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(bytes) = body.next().await {
        buffer.extend_from_slice(bytes?.as_ref());

        while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline).collect();
            accumulator.push_line(String::from_utf8_lossy(&line).trim_end_matches('\n'))?;
        }
        if accumulator.is_done() {
            return Ok(accumulator.finish());
        }
    }

    if !buffer.is_empty() {
        accumulator.push_line(&String::from_utf8_lossy(&buffer))?;
    }
    Ok(accumulator.finish())
}
