//! Intent definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of things a command can ask for, each with the payload its
/// handler needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Launch an application or website
    Open { target: String },
    /// Play a video on the media site
    PlayMedia { search_term: String },
    /// Message or call a stored contact; `command` is resolved later
    ContactAction {
        kind: ContactActionKind,
        command: String,
    },
    /// Current weather, for a named city or the configured default
    Weather { city: Option<String> },
    /// Top headlines
    News,
    /// Which third-party credentials are configured
    ApiStatus,
    /// Nothing matched; carries the original text for the echo-back
    Unrecognized { text: String },
}

/// What to do with a resolved contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactActionKind {
    Message,
    PhoneCall,
    VideoCall,
}

impl Intent {
    /// Stable label used in logs and debug output.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Open { .. } => "open",
            Intent::PlayMedia { .. } => "play_media",
            Intent::ContactAction { .. } => "contact_action",
            Intent::Weather { .. } => "weather",
            Intent::News => "news",
            Intent::ApiStatus => "api_status",
            Intent::Unrecognized { .. } => "unrecognized",
        }
    }

    /// The extracted payload, if the intent carries one.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Intent::Open { target } => Some(target),
            Intent::PlayMedia { search_term } => Some(search_term),
            Intent::ContactAction { command, .. } => Some(command),
            Intent::Weather { city } => city.as_deref(),
            Intent::Unrecognized { text } => Some(text),
            Intent::News | Intent::ApiStatus => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Intent::Unrecognized { .. })
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Some(p) => write!(f, "{}({p:?})", self.label()),
            None => f.write_str(self.label()),
        }
    }
}

impl ContactActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactActionKind::Message => "message",
            ContactActionKind::PhoneCall => "phone call",
            ContactActionKind::VideoCall => "video call",
        }
    }
}

impl fmt::Display for ContactActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
