use std::io::{self, Write};

use anyhow::Result;
use adcraft::models::message::{Message, MessageContent};
use bat::WrappingMode;
use cliclack::{input, spinner};
use console::style;

use super::{parse_input, Input, InputType, Prompt, Theme, HELP};

pub struct CliclackPrompt {
    spinner: cliclack::ProgressBar,
    theme: Theme,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt {
            spinner: spinner(),
            theme: Theme::Dark,
        }
    }

    fn theme_name(&self) -> &'static str {
        match self.theme {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}

fn pretty_print(content: &str, theme: &str, language: &str, name: Option<String>) {
    let mut input = bat::Input::from_bytes(content.as_bytes());
    let framed = name.is_some();
    if let Some(name) = name {
        input = input.name(name);
    }

    let printed = bat::PrettyPrinter::new()
        .input(input)
        .theme(theme)
        .language(language)
        .grid(framed)
        .header(framed)
        .wrapping_mode(WrappingMode::Character)
        .print();

    if let Err(e) = printed {
        tracing::warn!(error = %e, "failed to highlight output");
        println!("{}", content);
    }
}

/// Print Markdown the way the session does, for one-shot commands
pub fn print_markdown(content: &str) {
    pretty_print(content, "zenburn", "Markdown", None);
}

impl Prompt for CliclackPrompt {
    fn render(&mut self, message: Box<Message>) {
        let theme = self.theme_name();

        for message_content in &message.content {
            match message_content {
                MessageContent::Text(text) => pretty_print(text, theme, "Markdown", None),
                MessageContent::ImageUrl(url) => println!("{}", style(format!("Image: {}", url)).dim()),
                MessageContent::ToolRequest(tool_request) => match &tool_request.tool_call {
                    Ok(call) => {
                        let arguments = serde_json::to_string_pretty(&call.arguments)
                            .unwrap_or_else(|_| call.arguments.to_string());
                        pretty_print(
                            &arguments,
                            theme,
                            "JSON",
                            Some(format!("Tool Request: {}", call.name)),
                        );
                    }
                    Err(e) => pretty_print(&e.to_string(), theme, "Markdown", None),
                },
                MessageContent::ToolResponse(tool_response) => match &tool_response.tool_result {
                    Ok(output) => pretty_print(
                        output,
                        theme,
                        "Markdown",
                        Some("Tool Response:".to_string()),
                    ),
                    Err(e) => pretty_print(&e.to_string(), theme, "Markdown", None),
                },
            }
        }

        println!();
        let _ = io::stdout().flush();
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.spinner.start("awaiting reply");
    }

    fn hide_busy(&mut self) {
        self.spinner.stop("");
    }

    fn get_input(&mut self) -> Result<Input> {
        loop {
            let message_text: String = input("AdCraft: [Help: /?]")
                .placeholder("")
                .multiline()
                .interact()?;

            if message_text.trim().eq_ignore_ascii_case("/t") {
                self.theme = match self.theme {
                    Theme::Light => {
                        println!("Switching to Dark theme");
                        Theme::Dark
                    }
                    Theme::Dark => {
                        println!("Switching to Light theme");
                        Theme::Light
                    }
                };
                continue;
            }

            let input = parse_input(&message_text);
            match input.input_type {
                InputType::Help => println!("{}", HELP),
                InputType::Message if input.content.as_deref() == Some("") => {}
                _ => return Ok(input),
            }
        }
    }

    fn close(&self) {
        // No cleanup required
    }
}
