//! Intent Parser for assistant commands
//!
//! This crate turns a transcribed or typed utterance into one of a closed set
//! of intents. It does no I/O: resolution of contacts, launching and HTTP
//! calls happen downstream.
//!
//! Classification is a fixed-precedence list of substring/prefix predicates
//! (see [`IntentParser`]); stop-word stripping for payload extraction lives in
//! [`CommandNormalizer`].

mod intent;
mod normalizer;
mod parser;

pub use intent::{ContactActionKind, Intent};
pub use normalizer::CommandNormalizer;
pub use parser::{IntentParser, ParseResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid trigger pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A phrase that selects the contact-action intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactTrigger {
    pub phrase: String,
    pub kind: ContactActionKind,
}

/// Trigger vocabulary and stop words
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    /// Name the assistant answers to; a leading occurrence is ignored
    pub assistant_name: String,
    /// Filler tokens removed before contact lookup
    pub stop_words: Vec<String>,
    /// Prefix selecting the open intent
    pub open_trigger: String,
    /// Prefix selecting the play intent (together with `media_marker`)
    pub play_trigger: String,
    /// Marker naming the video site, e.g. "on youtube"
    pub media_marker: String,
    /// Phrases for message/call/video-call, checked in order
    pub contact_triggers: Vec<ContactTrigger>,
    pub weather_markers: Vec<String>,
    pub news_markers: Vec<String>,
    pub api_status_markers: Vec<String>,
    /// Words introducing the city in a weather request
    pub city_prepositions: Vec<String>,
    /// Phrases that end a listening session
    pub stop_phrases: Vec<String>,
}

impl Default for IntentConfig {
    fn default() -> Self {
        let assistant_name = "jarvis".to_string();
        let stop_words = [
            assistant_name.as_str(),
            "make",
            "a",
            "to",
            "phone",
            "call",
            "send",
            "message",
            "whatsapp",
            "wahtsapp",
            "video",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            assistant_name,
            stop_words,
            open_trigger: "open".to_string(),
            play_trigger: "play".to_string(),
            media_marker: "on youtube".to_string(),
            contact_triggers: vec![
                ContactTrigger {
                    phrase: "send message".to_string(),
                    kind: ContactActionKind::Message,
                },
                ContactTrigger {
                    phrase: "phone call".to_string(),
                    kind: ContactActionKind::PhoneCall,
                },
                ContactTrigger {
                    phrase: "video call".to_string(),
                    kind: ContactActionKind::VideoCall,
                },
            ],
            weather_markers: vec!["weather".to_string()],
            news_markers: vec!["news".to_string(), "headlines".to_string()],
            api_status_markers: vec!["api status".to_string(), "check apis".to_string()],
            city_prepositions: vec!["in".to_string(), "for".to_string(), "at".to_string()],
            stop_phrases: vec!["stop listening".to_string()],
        }
    }
}

impl IntentConfig {
    /// Default vocabulary answering to a different assistant name.
    pub fn with_assistant_name(name: &str) -> Self {
        let mut config = Self::default();
        let name = name.trim().to_lowercase();
        if !name.is_empty() && name != config.assistant_name {
            config.stop_words.push(name.clone());
            config.assistant_name = name;
        }
        config
    }

    /// Normalizer built from this vocabulary's stop words.
    pub fn normalizer(&self) -> CommandNormalizer {
        CommandNormalizer::new(&self.stop_words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_commands() {
        let test_cases = vec![
            ("open notepad", "open"),
            ("play believer on youtube", "play_media"),
            ("send message to mom", "contact_action"),
            ("phone call to dad", "contact_action"),
            ("video call to ravi", "contact_action"),
            ("weather in mumbai", "weather"),
            ("weather", "weather"),
            ("news", "news"),
            ("headlines", "news"),
            ("api status", "api_status"),
            ("check apis", "api_status"),
        ];

        let parser = IntentParser::new(IntentConfig::default()).unwrap();
        for (command, label) in test_cases {
            let result = parser.parse(command);
            assert_eq!(result.intent.label(), label, "'{command}'");
        }
    }

    #[test]
    fn test_default_normalizer_isolates_contact() {
        let normalizer = IntentConfig::default().normalizer();
        assert_eq!(normalizer.normalize("send message to mom"), "mom");
        assert_eq!(normalizer.normalize("jarvis video call to priya"), "priya");
    }

    #[test]
    fn test_custom_assistant_name() {
        let config = IntentConfig::with_assistant_name("Friday");
        assert_eq!(config.assistant_name, "friday");
        assert!(config.normalizer().is_stop_word("friday"));
        let parser = IntentParser::new(config).unwrap();
        assert_eq!(parser.parse("friday open chrome").intent.label(), "open");
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let json = serde_json::to_string(&IntentConfig::default()).unwrap();
        let partial: IntentConfig = serde_json::from_str(r#"{"open_trigger":"launch"}"#).unwrap();
        assert_eq!(partial.open_trigger, "launch");
        assert_eq!(partial.media_marker, "on youtube");
        assert!(json.contains("send message"));
    }
}
