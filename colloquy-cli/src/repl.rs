//! Interactive chat loop

use anyhow::Result;
use colloquy_core::conversation::ConversationManager;
use colloquy_core::error::ColloquyError;
use colloquy_core::llm::Message;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// A line typed at the prompt
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Prompt(&'a str),
    Persona(&'a str),
    Custom(&'a str),
    History,
    Tokens,
    Clear,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        // A doubled slash sends the rest of the line, leading slash included
        if line.starts_with("//") {
            return Input::Prompt(&line[1..]);
        }
        let Some(command) = line.strip_prefix('/') else {
            return Input::Prompt(line);
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match name {
            "persona" => Input::Persona(arg),
            "custom" => Input::Custom(arg),
            "history" => Input::History,
            "tokens" => Input::Tokens,
            "clear" => Input::Clear,
            "help" => Input::Help,
            "quit" | "exit" => Input::Quit,
            _ => Input::Unknown(name),
        }
    }
}

const HELP: &str = "\
Commands:
  /persona <name>   switch persona
  /custom <text>    register a custom persona (activate with /persona custom)
  /history          show the conversation
  /tokens           show token usage against the budget
  /clear            forget everything but the system message
  /quit             leave
Start a prompt with // to send a line beginning with /";

pub(crate) fn print_history(messages: &[Message]) {
    for message in messages {
        println!("[{}] {}", message.role, message.content);
    }
}

/// Read prompts from stdin until `/quit` or end of input.
pub(crate) async fn run(
    manager: &mut ConversationManager,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("Chatting with {} (/help for commands)", manager.model());

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Input::parse(&line) {
            Input::Quit => break,
            Input::Help => println!("{}", HELP),
            Input::History => print_history(manager.history()),
            Input::Tokens => {
                let used = manager.total_tokens_used()?;
                println!("{}/{} tokens", used, manager.token_budget());
            }
            Input::Clear => {
                manager.clear_history()?;
                println!("History cleared");
            }
            Input::Persona(name) => match manager.set_persona(name) {
                Ok(()) => println!("Persona: {}", name),
                Err(e @ ColloquyError::UnknownPersona(_)) => tracing::warn!("{}", e),
                Err(e) => return Err(e.into()),
            },
            Input::Custom(text) => {
                if manager.set_custom_system_message(text) {
                    println!("Custom persona registered");
                } else {
                    tracing::warn!("Custom persona not registered: text is empty or already in use");
                }
            }
            Input::Unknown(name) => {
                tracing::warn!(command = %name, "Unknown command; start with // to send it as a prompt")
            }
            Input::Prompt(prompt) => {
                match manager.chat_completion(prompt, temperature, max_tokens).await {
                    Ok(reply) => println!("{}", reply),
                    Err(ColloquyError::EmptyPrompt) => {
                        tracing::warn!("{}", ColloquyError::EmptyPrompt)
                    }
                    // Keep the session alive; the user message is already recorded
                    Err(e @ ColloquyError::Completion(_)) => tracing::error!("{}", e),
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    Ok(())
}
