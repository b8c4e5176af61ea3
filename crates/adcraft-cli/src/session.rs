use anyhow::Result;

use crate::prompt::{InputType, Prompt};

use adcraft::agent::Agent;
use adcraft::models::message::Message;

pub struct Session<'a> {
    agent: Agent,
    session_id: String,
    prompt: Box<dyn Prompt + 'a>,
}

impl<'a> Session<'a> {
    pub fn new(agent: Agent, session_id: String, prompt: Box<dyn Prompt + 'a>) -> Self {
        Session {
            agent,
            session_id,
            prompt,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        let memory = if self.agent.checkpointer().is_some() {
            "conversation memory on"
        } else {
            "every message starts a fresh conversation"
        };
        self.prompt.render(raw_message(&format!(
            "Starting session {} ({})\n",
            self.session_id, memory
        )));

        loop {
            let input = self.prompt.get_input()?;
            let content = match input.input_type {
                InputType::Exit => break,
                InputType::Clear => {
                    self.clear().await;
                    continue;
                }
                InputType::Help => continue,
                InputType::Message => match input.content {
                    Some(content) => content,
                    None => continue,
                },
            };

            self.prompt.show_busy();
            let outcome = self.agent.invoke_messages(&self.session_id, &content).await;
            self.prompt.hide_busy();

            match outcome {
                Ok(messages) => {
                    for message in messages {
                        self.prompt.render(Box::new(message));
                    }
                }
                Err(e) => {
                    tracing::error!(session_id = %self.session_id, error = %e, "turn failed");
                    self.prompt
                        .render(raw_message(&format!("**Error:** {:#}", e)));
                }
            }
        }
        self.prompt.close();
        Ok(())
    }

    async fn clear(&mut self) {
        let notice = match self.agent.checkpointer() {
            Some(checkpointer) => {
                checkpointer.clear(&self.session_id).await;
                "Conversation cleared."
            }
            None => "Nothing to clear: history is only kept in dev mode.",
        };
        self.prompt.render(raw_message(notice));
    }
}

fn raw_message(content: &str) -> Box<Message> {
    Box::new(Message::assistant().with_text(content))
}
