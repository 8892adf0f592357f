use serde::Serialize;

use super::{NutritionProfile, TrainingProfile};
use crate::errors::ValidationError;

/// How many earlier turns are carried into a chat prompt.
pub const CHAT_CONTEXT_TURNS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Coach,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// A free-form question plus a snapshot of what the coach already knows
/// about the user. The snapshot is taken at submission time so rendering
/// the prompt never reads live session state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatPrompt {
    pub message: String,
    pub training: Option<TrainingProfile>,
    pub nutrition: Option<NutritionProfile>,
    pub recent_turns: Vec<ChatTurn>,
}

impl ChatPrompt {
    pub fn new(
        message: &str,
        training: Option<TrainingProfile>,
        nutrition: Option<NutritionProfile>,
        transcript: &[ChatTurn],
    ) -> Result<Self, ValidationError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ValidationError::Missing { field: "message", label: "Message" });
        }
        let skip = transcript.len().saturating_sub(CHAT_CONTEXT_TURNS);
        Ok(Self {
            message: message.to_string(),
            training,
            nutrition,
            recent_turns: transcript[skip..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(i: usize) -> ChatTurn {
        let role = if i % 2 == 0 { ChatRole::User } else { ChatRole::Coach };
        ChatTurn { role, text: format!("turn {i}") }
    }

    #[test]
    fn blank_message_is_rejected() {
        let err = ChatPrompt::new("   ", None, None, &[]).unwrap_err();
        assert_eq!(err.field(), Some("message"));
    }

    #[test]
    fn only_the_latest_turns_are_kept() {
        let transcript: Vec<ChatTurn> = (0..10).map(turn).collect();
        let p = ChatPrompt::new(" how much protein? ", None, None, &transcript).unwrap();
        assert_eq!(p.message, "how much protein?");
        assert_eq!(p.recent_turns.len(), CHAT_CONTEXT_TURNS);
        assert_eq!(p.recent_turns[0].text, "turn 4");
        assert_eq!(p.recent_turns.last().unwrap().text, "turn 9");
    }
}
