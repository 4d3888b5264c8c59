//! Fixed-precedence intent classifier

use crate::{ContactActionKind, Intent, IntentConfig, ParserError};
use regex::Regex;

/// Result of classifying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// The classified intent with its payload
    pub intent: Intent,
    /// Lower-cased, trimmed text the predicates were tested against
    pub text: String,
    /// Name of the predicate that matched
    pub rule: &'static str,
}

/// Main intent parser
///
/// Predicates are tested in a fixed order and the first match wins:
/// open, play-on-media-site, contact action, weather, news, api status.
pub struct IntentParser {
    config: IntentConfig,
    open_pattern: Regex,
    play_pattern: Regex,
}

impl IntentParser {
    /// Create a new intent parser
    pub fn new(config: IntentConfig) -> Result<Self, ParserError> {
        let open_pattern = Regex::new(&format!(
            r"^{}\s+(.*)$",
            phrase_pattern(&config.open_trigger)
        ))?;
        let play_pattern = Regex::new(&format!(
            r"^{}\s+(.*?)\s+{}",
            phrase_pattern(&config.play_trigger),
            phrase_pattern(&config.media_marker)
        ))?;

        Ok(Self {
            config,
            open_pattern,
            play_pattern,
        })
    }

    pub fn config(&self) -> &IntentConfig {
        &self.config
    }

    /// Classify a command into exactly one intent.
    pub fn parse(&self, text: &str) -> ParseResult {
        let text = self.prepare(text);

        let (intent, rule) = self.classify(&text);
        tracing::debug!(rule, intent = %intent, "classified command");

        ParseResult { intent, text, rule }
    }

    /// True if the command asks the session to stop listening.
    pub fn is_stop_phrase(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.config
            .stop_phrases
            .iter()
            .any(|phrase| text.contains(phrase.as_str()))
    }

    fn prepare(&self, text: &str) -> String {
        let text = text.trim().to_lowercase();
        let name = self.config.assistant_name.to_lowercase();
        if name.is_empty() {
            return text;
        }
        // "jarvis, open notepad" addresses the assistant; the name is not part of the command
        match text.strip_prefix(name.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with([' ', ',', '.', '!']) => rest
                .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '!'))
                .to_string(),
            _ => text,
        }
    }

    fn classify(&self, text: &str) -> (Intent, &'static str) {
        if let Some(captures) = self.open_pattern.captures(text) {
            let target = captures
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            return (Intent::Open { target }, "open");
        }

        if let Some(captures) = self.play_pattern.captures(text) {
            let search_term = captures
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            return (Intent::PlayMedia { search_term }, "play_media");
        }

        if let Some(kind) = self.contact_action_kind(text) {
            return (
                Intent::ContactAction {
                    kind,
                    command: text.to_string(),
                },
                "contact_action",
            );
        }

        if let Some(marker) = first_contained(text, &self.config.weather_markers) {
            let city = self.extract_city(text, marker);
            return (Intent::Weather { city }, "weather");
        }

        if first_contained(text, &self.config.news_markers).is_some() {
            return (Intent::News, "news");
        }

        if first_contained(text, &self.config.api_status_markers).is_some() {
            return (Intent::ApiStatus, "api_status");
        }

        (
            Intent::Unrecognized {
                text: text.to_string(),
            },
            "unrecognized",
        )
    }

    fn contact_action_kind(&self, text: &str) -> Option<ContactActionKind> {
        self.config
            .contact_triggers
            .iter()
            .find(|t| text.contains(t.phrase.as_str()))
            .map(|t| t.kind)
    }

    fn extract_city(&self, text: &str, marker: &str) -> Option<String> {
        let after = text
            .find(marker)
            .map(|idx| &text[idx + marker.len()..])
            .unwrap_or_default();
        let words: Vec<&str> = after
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()))
            .filter(|w| !w.is_empty())
            .collect();

        let start = words
            .iter()
            .position(|w| self.config.city_prepositions.iter().any(|p| p.as_str() == *w))
            .map(|i| i + 1)
            .unwrap_or(0);

        let city = words[start..].join(" ");
        if city.is_empty() {
            None
        } else {
            Some(city)
        }
    }
}

fn first_contained<'a>(text: &str, markers: &'a [String]) -> Option<&'a str> {
    markers
        .iter()
        .map(String::as_str)
        .find(|m| !m.is_empty() && text.contains(m))
}

/// Regex for a literal phrase whose words may be separated by any whitespace.
fn phrase_pattern(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|w| regex::escape(&w.to_lowercase()))
        .collect::<Vec<_>>()
        .join(r"\s+")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> IntentParser {
        IntentParser::new(IntentConfig::default()).unwrap()
    }

    #[test]
    fn test_open_scenario() {
        let result = parser().parse("open notepad");
        assert_eq!(
            result.intent,
            Intent::Open {
                target: "notepad".into()
            }
        );
        assert_eq!(result.rule, "open");
    }

    #[test]
    fn test_open_wins_over_weather() {
        let result = parser().parse("open weather app");
        assert_eq!(result.intent.label(), "open");
        assert_eq!(result.intent.payload(), Some("weather app"));
    }

    #[test]
    fn test_open_requires_prefix() {
        // "open" mid-sentence is not the open trigger
        let result = parser().parse("please open the news");
        assert_eq!(result.intent, Intent::News);
    }

    #[test]
    fn test_play_on_youtube() {
        let result = parser().parse("Play Lofi Hip Hop on YouTube");
        assert_eq!(
            result.intent,
            Intent::PlayMedia {
                search_term: "lofi hip hop".into()
            }
        );
    }

    #[test]
    fn test_play_without_media_marker_is_not_media() {
        let result = parser().parse("play some music");
        assert_eq!(result.intent.label(), "unrecognized");
    }

    #[test]
    fn test_contact_actions() {
        let p = parser();
        let cases = [
            ("send message to mom", ContactActionKind::Message),
            ("phone call to ravi", ContactActionKind::PhoneCall),
            ("jarvis make a video call to dad", ContactActionKind::VideoCall),
        ];
        for (text, expected) in cases {
            match p.parse(text).intent {
                Intent::ContactAction { kind, command } => {
                    assert_eq!(kind, expected, "{text}");
                    assert!(!command.starts_with("jarvis"));
                }
                other => panic!("{text} -> {other:?}"),
            }
        }
    }

    #[test]
    fn test_contact_action_beats_weather() {
        let result = parser().parse("send message to weatherman");
        assert_eq!(result.intent.label(), "contact_action");
    }

    #[test]
    fn test_weather_city_extraction() {
        let p = parser();
        assert_eq!(
            p.parse("weather in Paris").intent,
            Intent::Weather {
                city: Some("paris".into())
            }
        );
        assert_eq!(
            p.parse("what's the weather like in new york?").intent,
            Intent::Weather {
                city: Some("new york".into())
            }
        );
        assert_eq!(
            p.parse("weather london").intent,
            Intent::Weather {
                city: Some("london".into())
            }
        );
        assert_eq!(p.parse("weather").intent, Intent::Weather { city: None });
    }

    #[test]
    fn test_news_and_headlines() {
        let p = parser();
        assert_eq!(p.parse("tell me the news").intent, Intent::News);
        assert_eq!(p.parse("latest headlines").intent, Intent::News);
    }

    #[test]
    fn test_api_status() {
        let p = parser();
        assert_eq!(p.parse("api status").intent, Intent::ApiStatus);
        assert_eq!(p.parse("check apis please").intent, Intent::ApiStatus);
    }

    #[test]
    fn test_unrecognized_echoes_text() {
        let result = parser().parse("asdkjasd");
        assert_eq!(
            result.intent,
            Intent::Unrecognized {
                text: "asdkjasd".into()
            }
        );
    }

    #[test]
    fn test_assistant_name_prefix_is_dropped() {
        let result = parser().parse("Jarvis, open chrome");
        assert_eq!(
            result.intent,
            Intent::Open {
                target: "chrome".into()
            }
        );
        // a word merely starting with the name is kept
        assert_eq!(parser().parse("jarvisopen x").intent.label(), "unrecognized");
    }

    #[test]
    fn test_stop_phrase() {
        let p = parser();
        assert!(p.is_stop_phrase("okay stop listening now"));
        assert!(!p.is_stop_phrase("stop the music"));
    }

    #[test]
    fn test_custom_vocabulary() {
        let mut config = IntentConfig::default();
        config.open_trigger = "launch".into();
        config.media_marker = "on vimeo".into();
        let p = IntentParser::new(config).unwrap();
        assert_eq!(p.parse("launch calculator").intent.label(), "open");
        assert_eq!(p.parse("open calculator").intent.label(), "unrecognized");
        assert_eq!(
            p.parse("play cats on vimeo").intent,
            Intent::PlayMedia {
                search_term: "cats".into()
            }
        );
    }
}
