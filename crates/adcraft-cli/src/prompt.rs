use anyhow::Result;
use adcraft::models::message::Message;

pub mod cliclack;

pub trait Prompt {
    fn render(&mut self, message: Box<Message>);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&self);
}

pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Only set for messages
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Message, // User sent a message
    Clear,   // Forget the conversation so far
    Help,    // Show the available commands
    Exit,    // User wants to exit the session
}

pub enum Theme {
    Light,
    Dark,
}

pub const HELP: &str = "Commands:
/exit  - Exit the session
/clear - Forget the conversation so far (dev mode only)
/t     - Toggle Light/Dark theme
/?     - Display this help message";

/// Interpret one line of user input
pub fn parse_input(text: &str) -> Input {
    let text = text.trim();
    let input_type = if text.eq_ignore_ascii_case("/exit") || text.eq_ignore_ascii_case("/quit") {
        InputType::Exit
    } else if text.eq_ignore_ascii_case("/clear") {
        InputType::Clear
    } else if text == "/?" || text.eq_ignore_ascii_case("/help") {
        InputType::Help
    } else {
        return Input {
            input_type: InputType::Message,
            content: Some(text.to_string()),
        };
    };

    Input {
        input_type,
        content: None,
    }
}
