use anyhow::Result;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use std::sync::Arc;

use crate::checkpoint::MemoryCheckpointer;
use crate::errors::{AgentError, AgentResult};
use crate::models::message::{Message, ToolRequest};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::Provider;
use crate::systems::System;

/// Model turns allowed within one invocation before giving up
pub const RECURSION_LIMIT: usize = 25;

/// Agent integrates a foundational LLM with the systems it needs to pilot
pub struct Agent {
    systems: Vec<Box<dyn System>>,
    provider: Box<dyn Provider>,
    system_prompt: String,
    checkpointer: Option<Arc<MemoryCheckpointer>>,
    recursion_limit: usize,
}

impl Agent {
    /// Create a stateless agent with the specified provider and system prompt
    pub fn new<S: Into<String>>(provider: Box<dyn Provider>, system_prompt: S) -> Self {
        Self {
            systems: Vec::new(),
            provider,
            system_prompt: system_prompt.into(),
            checkpointer: None,
            recursion_limit: RECURSION_LIMIT,
        }
    }

    /// Remember conversation history per session in the given checkpointer
    pub fn with_checkpointer(mut self, checkpointer: Option<Arc<MemoryCheckpointer>>) -> Self {
        self.checkpointer = checkpointer;
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Add a system to the agent
    pub fn add_system(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn checkpointer(&self) -> Option<&Arc<MemoryCheckpointer>> {
        self.checkpointer.as_ref()
    }

    /// All tools across systems, in registration order
    pub fn tools(&self) -> Vec<Tool> {
        self.systems
            .iter()
            .flat_map(|system| system.tools().iter().cloned())
            .collect()
    }

    fn system_for_tool(&self, name: &str) -> Option<&dyn System> {
        self.systems
            .iter()
            .find(|system| system.tools().iter().any(|tool| tool.name == name))
            .map(|v| &**v)
    }

    /// Dispatch a single tool call to the system that owns it
    async fn dispatch_tool_call(&self, tool_call: AgentResult<ToolCall>) -> AgentResult<String> {
        let call = tool_call?;
        let system = self
            .system_for_tool(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tracing::debug!(system = system.name(), tool = %call.name, "dispatching tool call");
        system.call(call).await
    }

    /// Create a stream that yields each message as it's generated by the agent.
    /// This includes both the assistant's responses and any tool responses.
    pub async fn reply(&self, messages: &[Message]) -> Result<BoxStream<'_, Result<Message>>> {
        let mut messages = messages.to_vec();
        let tools = self.tools();

        Ok(Box::pin(async_stream::try_stream! {
            let mut turns = 0;
            loop {
                if turns == self.recursion_limit {
                    Err::<(), _>(AgentError::RecursionLimit(self.recursion_limit))?;
                }
                turns += 1;

                let (response, usage) = self.provider.complete(
                    &self.system_prompt,
                    &messages,
                    &tools,
                ).await?;
                tracing::debug!(turn = turns, total_tokens = ?usage.total_tokens, "model replied");

                yield response.clone();

                // Make sure the reply above reaches the caller before tools start running
                tokio::task::yield_now().await;

                let tool_requests: Vec<&ToolRequest> = response.tool_requests();
                if tool_requests.is_empty() {
                    break;
                }

                // Tools run one after another, in the order the model requested them
                let mut message_tool_response = Message::user();
                for request in &tool_requests {
                    let output = self.dispatch_tool_call(request.tool_call.clone()).await;
                    message_tool_response =
                        message_tool_response.with_tool_response(request.id.clone(), output);
                }

                yield message_tool_response.clone();

                messages.push(response.clone());
                messages.push(message_tool_response);
            }
        }))
    }

    /// Run one user turn and return the final assistant text
    pub async fn invoke(&self, session_id: &str, text: &str) -> Result<String> {
        let produced = self.invoke_messages(session_id, text).await?;
        Ok(final_text(&produced))
    }

    /// Run one user turn and return every message it produced, tool traffic included.
    ///
    /// With a checkpointer the session's history is loaded first and the new exchange is
    /// stored afterwards; the session stays locked for the whole turn. A failed turn leaves
    /// the history untouched.
    pub async fn invoke_messages(&self, session_id: &str, text: &str) -> Result<Vec<Message>> {
        let mut history = match &self.checkpointer {
            Some(checkpointer) => Some(checkpointer.lock(session_id).await),
            None => None,
        };

        let input = Message::user().with_text(text);
        let mut messages = history.as_deref().cloned().unwrap_or_default();
        messages.push(input.clone());

        let produced: Vec<Message> = self.reply(&messages).await?.try_collect().await?;
        tracing::debug!(session_id, messages = produced.len(), "turn complete");

        if let Some(history) = history.as_mut() {
            history.push(input);
            history.extend(produced.iter().cloned());
        }

        Ok(produced)
    }
}

/// Text of the last assistant message, which carries the answer
pub fn final_text(messages: &[Message]) -> String {
    messages
        .iter()
        .rev()
        .find(|message| message.role == Role::Assistant)
        .map(Message::text)
        .unwrap_or_default()
}
