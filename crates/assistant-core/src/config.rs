//! Settings and third-party credentials
//!
//! Everything is read once into a [`Settings`] value that the session owns
//! and hands to whoever needs it. A missing credential disables only the
//! feature that needs it.

use contact_store::{default_db_path, StoreError};
use intent_parser::IntentConfig;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use voice_local::TranscriptionConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading settings file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },
}

/// Third-party credentials. `None` means not configured.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub google_speech: Option<String>,
    pub azure_speech_key: Option<String>,
    pub azure_speech_region: Option<String>,
    pub openai: Option<String>,
    pub openweather: Option<String>,
    pub news: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub email_username: Option<String>,
    pub email_password: Option<String>,
    pub porcupine: Option<String>,
    pub youtube: Option<String>,
    pub whatsapp_business: Option<String>,
    pub huggingface: Option<String>,
}

/// Whether one credential group is usable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiStatusEntry {
    pub name: &'static str,
    pub configured: bool,
}

impl ApiKeys {
    fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            google_speech: get("GOOGLE_SPEECH_API_KEY"),
            azure_speech_key: get("AZURE_SPEECH_KEY"),
            azure_speech_region: get("AZURE_SPEECH_REGION"),
            openai: get("OPENAI_API_KEY"),
            openweather: get("OPENWEATHER_API_KEY"),
            news: get("NEWS_API_KEY"),
            spotify_client_id: get("SPOTIFY_CLIENT_ID"),
            spotify_client_secret: get("SPOTIFY_CLIENT_SECRET"),
            email_username: get("EMAIL_USERNAME"),
            email_password: get("EMAIL_PASSWORD"),
            porcupine: get("PORCUPINE_ACCESS_KEY"),
            youtube: get("YOUTUBE_API_KEY"),
            whatsapp_business: get("WHATSAPP_BUSINESS_API_KEY"),
            huggingface: get("HUGGINGFACEHUB_API_TOKEN"),
        }
    }

    /// Every credential group, in a fixed order.
    pub fn status(&self) -> Vec<ApiStatusEntry> {
        let entry = |name, configured| ApiStatusEntry { name, configured };
        vec![
            entry("Google Speech API", self.google_speech.is_some()),
            entry(
                "Azure Speech API",
                self.azure_speech_key.is_some() && self.azure_speech_region.is_some(),
            ),
            entry("OpenAI API", self.openai.is_some()),
            entry("OpenWeather API", self.openweather.is_some()),
            entry("News API", self.news.is_some()),
            entry(
                "Spotify API",
                self.spotify_client_id.is_some() && self.spotify_client_secret.is_some(),
            ),
            entry(
                "Email Configuration",
                self.email_username.is_some() && self.email_password.is_some(),
            ),
            entry("YouTube API", self.youtube.is_some()),
            entry("WhatsApp Business API", self.whatsapp_business.is_some()),
            entry("Porcupine Access Key", self.porcupine.is_some()),
            entry("Hugging Face API", self.huggingface.is_some()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub assistant_name: String,
    /// Explicit database file; `None` uses the platform data directory
    pub database_path: Option<PathBuf>,
    pub default_country_code: String,
    pub default_city: String,
    pub news_country: String,
    pub news_count: usize,
    pub http_timeout_secs: u64,
    /// Speech-to-text endpoint override for microphone input
    pub transcription_url: Option<String>,
    pub keys: ApiKeys,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assistant_name: "jarvis".to_string(),
            database_path: None,
            default_country_code: "+91".to_string(),
            default_city: "Delhi".to_string(),
            news_country: "in".to_string(),
            news_count: 3,
            http_timeout_secs: 10,
            transcription_url: None,
            keys: ApiKeys::default(),
        }
    }
}

impl Settings {
    /// Build settings from any key-value source. Blank values count as unset;
    /// unparsable numbers keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            assistant_name: get("JARVIS_ASSISTANT_NAME")
                .map(|n| n.to_lowercase())
                .unwrap_or(defaults.assistant_name),
            database_path: get("JARVIS_DB_PATH").map(PathBuf::from),
            default_country_code: get("JARVIS_COUNTRY_CODE")
                .unwrap_or(defaults.default_country_code),
            default_city: get("JARVIS_DEFAULT_CITY").unwrap_or(defaults.default_city),
            news_country: get("JARVIS_NEWS_COUNTRY").unwrap_or(defaults.news_country),
            news_count: parse_or(get("JARVIS_NEWS_COUNT"), "JARVIS_NEWS_COUNT", defaults.news_count),
            http_timeout_secs: parse_or(
                get("JARVIS_HTTP_TIMEOUT_SECS"),
                "JARVIS_HTTP_TIMEOUT_SECS",
                defaults.http_timeout_secs,
            ),
            transcription_url: get("HF_INFERENCE_URL"),
            keys: ApiKeys::from_lookup(&get),
        }
    }

    /// Process environment only.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Process environment layered over a `.env`-style file.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let iter = dotenv::from_path_iter(path).map_err(|source| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut file_values = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            })?;
            file_values.insert(key, value);
        }
        debug!("loaded {} settings from {}", file_values.len(), path.display());

        Ok(Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file_values.get(key).cloned())
        }))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    /// Hosted speech-to-text for the microphone backend.
    pub fn transcription(&self) -> TranscriptionConfig {
        TranscriptionConfig {
            token: self.keys.huggingface.clone(),
            endpoint: self.transcription_url.clone(),
            ..TranscriptionConfig::default()
        }
    }

    /// Trigger vocabulary answering to this assistant's name.
    pub fn intent_config(&self) -> IntentConfig {
        IntentConfig::with_assistant_name(&self.assistant_name)
    }

    pub fn resolve_database_path(&self) -> Result<PathBuf, StoreError> {
        match &self.database_path {
            Some(p) => Ok(p.clone()),
            None => default_db_path(),
        }
    }
}

fn parse_or<T: FromStr + Copy>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("ignoring invalid value {raw:?} for {key}");
            default
        }),
        None => default,
    }
}
