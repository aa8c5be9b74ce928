//! Prompt builder - Renders conversation turns into a completion prompt

use std::borrow::Cow;

use domain::{ChatMessage, MessageRole};

/// Generation stops when the model starts speaking for the user
pub const USER_TURN_STOP: &str = "\nUser:";

/// Marker placed before continuation lines that look like a turn header
const QUOTED_LINE: &str = "> ";

const ROLES: [MessageRole; 3] = [MessageRole::User, MessageRole::Assistant, MessageRole::System];

fn starts_like_turn(line: &str) -> bool {
    let line = line.trim_start();
    ROLES.iter().any(|role| {
        let label = role.label();
        line.get(..label.len())
            .zip(line.get(label.len()..))
            .is_some_and(|(head, rest)| {
                head.eq_ignore_ascii_case(label) && rest.trim_start().starts_with(':')
            })
    })
}

/// Quote continuation lines that would otherwise read as a new turn
fn quote_turn_headers(text: &str) -> Cow<'_, str> {
    if !text.lines().skip(1).any(starts_like_turn) {
        return Cow::Borrowed(text);
    }
    let lines: Vec<Cow<'_, str>> = text
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i > 0 && starts_like_turn(line) {
                Cow::Owned(format!("{QUOTED_LINE}{line}"))
            } else {
                Cow::Borrowed(line)
            }
        })
        .collect();
    Cow::Owned(lines.join("\n"))
}

/// Renders a role-prefixed transcript ending with an assistant cue
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    system_prompt: Option<String>,
}

impl PromptBuilder {
    /// Create a builder with an optional system prompt
    pub fn new(system_prompt: Option<String>) -> Self {
        Self {
            system_prompt: system_prompt.filter(|p| !p.trim().is_empty()),
        }
    }

    /// System prompt placed before the transcript
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Build the prompt for `message` given prior turns, oldest first
    pub fn build<'a>(
        &self,
        history: impl IntoIterator<Item = &'a ChatMessage>,
        message: &str,
    ) -> String {
        let mut prompt = String::new();

        if let Some(system) = &self.system_prompt {
            prompt.push_str(system.trim());
            prompt.push_str("\n\n");
        }

        for turn in history {
            if turn.role == MessageRole::System {
                continue;
            }
            prompt.push_str(&format!(
                "{}: {}\n",
                turn.role.label(),
                quote_turn_headers(turn.content.trim())
            ));
        }

        prompt.push_str(&format!(
            "{}: {}\n{}:",
            MessageRole::User.label(),
            quote_turn_headers(message.trim()),
            MessageRole::Assistant.label()
        ));
        prompt
    }

    /// Stop sequences matching this transcript format
    pub fn stop_sequences(&self) -> Vec<String> {
        vec![USER_TURN_STOP.to_string()]
    }
}
