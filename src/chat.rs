use chrono::{DateTime, Local};
use log::info;
use serde::{Deserialize, Serialize};

use crate::command_parser::{ActionMetadata, CommandParser};
use crate::llm_manager::ReplyService;

/// Sent back when the message is blank.
pub const EMPTY_MESSAGE_REPLY: &str = "I didn’t catch that. Can you type or say it again?";

const PROMPT_TEMPLATE: &str = "You are a friendly virtual assistant inside a web app.
User is an Indian student / normal user.

LANGUAGE STYLE:
- Reply in Hinglish (mix of Hindi + simple English).
- Use Roman Hindi (no Devanagari script).
- Keep it very clear, casual and motivating.
- Avoid very heavy Hindi or Urdu words.
- Sound like a helpful friend, not a professor.

ANSWER RULES:
- Maximum 2 sentences. Keep it short.
- Give direct, practical answer.
- If user asks for definition/explanation, still keep it short.
- If user greets you, greet back in Hinglish.

";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionMetadata>,
}

impl ChatResponse {
    fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            action: None,
        }
    }
}

/// Wrap the user's message in the Hinglish instructions sent to the model.
pub fn build_prompt(user_text: &str) -> String {
    format!(
        "{}User: {}\nAssistant (Hinglish, max 2 sentences):",
        PROMPT_TEMPLATE, user_text
    )
}

/// Append the local time when the user seems to be asking for it.
pub fn with_time_hint(answer: String, message: &str, now: DateTime<Local>) -> String {
    let lowered = message.to_lowercase();
    if lowered.contains("time") && lowered.contains('?') {
        format!(
            "{} (By the way, current local time is {}.)",
            answer,
            now.format("%I:%M %p")
        )
    } else {
        answer
    }
}

/// Answers one chat message: a command if it parses as one, a model reply otherwise.
pub struct ChatService {
    replies: ReplyService,
}

impl ChatService {
    pub fn new(replies: ReplyService) -> Self {
        Self { replies }
    }

    pub async fn handle(&self, message: &str) -> ChatResponse {
        let message = message.trim();
        if message.is_empty() {
            return ChatResponse::text(EMPTY_MESSAGE_REPLY);
        }

        if let Some(action) = CommandParser::parse(message) {
            info!("Answering with command: {}", action.message());
            let (reply, metadata) = action.into_parts();
            return ChatResponse {
                reply,
                action: Some(metadata),
            };
        }

        let answer = self.replies.generate(&build_prompt(message)).await;
        ChatResponse::text(with_time_hint(answer, message, Local::now()))
    }
}
