use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    pub language: Option<String>,
    pub sample_rate_hz: u32,
    /// Give up if no speech starts within this many seconds
    #[serde(default = "default_listen_timeout")]
    pub listen_timeout_secs: f32,
    /// Hard cap on one phrase
    #[serde(default = "default_phrase_limit")]
    pub phrase_limit_secs: f32,
    /// Trailing silence that ends a phrase
    #[serde(default = "default_pause")]
    pub pause_secs: f32,
    /// Minimum RMS level (0..1) treated as speech
    #[serde(default = "default_energy_threshold")]
    pub energy_threshold: f32,
}

fn default_listen_timeout() -> f32 {
    10.0
}

fn default_phrase_limit() -> f32 {
    6.0
}

fn default_pause() -> f32 {
    1.0
}

fn default_energy_threshold() -> f32 {
    0.02
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            language: Some("en-IN".to_string()),
            sample_rate_hz: 16000,
            listen_timeout_secs: default_listen_timeout(),
            phrase_limit_secs: default_phrase_limit(),
            pause_secs: default_pause(),
            energy_threshold: default_energy_threshold(),
        }
    }
}

/// Where captured audio is sent for transcription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Hugging Face inference token; the microphone backend needs one
    pub token: Option<String>,
    /// Inference endpoint; `None` uses the hosted Whisper model
    pub endpoint: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            token: None,
            endpoint: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl TranscriptionConfig {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }
}

/// One transcribed or typed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub ts: Option<OffsetDateTime>,
}

impl Utterance {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ts: Some(OffsetDateTime::now_utc()),
        }
    }
}
