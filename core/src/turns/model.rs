use serde::{Deserialize, Serialize};

use super::normalize::{flow_from_intent, is_no_match_intent, normalize_text};
use crate::error::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

impl Speaker {
    /// Case-insensitive; `usuario` is accepted as an alias of `user`.
    pub fn parse(tag: &str, position: usize) -> Result<Self, InputError> {
        match tag.trim().to_lowercase().as_str() {
            "user" | "usuario" => Ok(Speaker::User),
            "bot" => Ok(Speaker::Bot),
            _ => Err(InputError::UnknownSpeaker {
                position,
                tag: tag.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Bot => "bot",
        }
    }
}

/// One message of a conversation with its derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub session_id: String,
    pub turn_index: u32,
    pub date: String,
    pub speaker: Speaker,
    pub text: String,
    pub normalized_text: String,
    pub detected_intent: String,
    pub normalized_intent: String,
    pub is_no_match: bool,
    pub flow: String,
}

impl Turn {
    pub fn new(
        session_id: impl Into<String>,
        turn_index: u32,
        date: impl Into<String>,
        speaker: Speaker,
        text: impl Into<String>,
        intent: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let detected_intent = intent.into().trim().to_string();
        Self {
            session_id: session_id.into(),
            turn_index,
            date: date.into(),
            speaker,
            normalized_text: normalize_text(&text),
            normalized_intent: normalize_text(&detected_intent),
            is_no_match: is_no_match_intent(&detected_intent),
            flow: flow_from_intent(&detected_intent),
            text,
            detected_intent,
        }
    }

    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_parse_accepts_aliases() {
        assert_eq!(Speaker::parse("USER", 0).unwrap(), Speaker::User);
        assert_eq!(Speaker::parse("usuario", 0).unwrap(), Speaker::User);
        assert_eq!(Speaker::parse(" Bot ", 0).unwrap(), Speaker::Bot);
        let err = Speaker::parse("agent", 7).unwrap_err();
        assert_eq!(
            err,
            InputError::UnknownSpeaker {
                position: 7,
                tag: "agent".into()
            }
        );
    }

    #[test]
    fn turn_derives_fields() {
        let t = Turn::new("s1", 3, "2024-01-01", Speaker::Bot, "Perdón, no entendí", "no_match_generic");
        assert!(t.is_no_match);
        assert_eq!(t.flow, "NO_MATCH");
        assert_eq!(t.normalized_text, "perdon, no entendi");
        assert_eq!(t.normalized_intent, "no_match_generic");

        let t = Turn::new("s1", 4, "", Speaker::User, "Hola", "");
        assert!(!t.is_no_match);
        assert_eq!(t.flow, "");
        assert!(t.is_user());
    }
}
