//! Collaborators the dispatcher talks to
//!
//! Each external effect sits behind a small trait so the dispatcher can be
//! driven with fakes. The real implementations open things through the
//! operating system or call public HTTP APIs.

use crate::config::Settings;
use reqwest::blocking::Client;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

mod launcher;
pub use launcher::{Launcher, SystemLauncher};

mod media;
pub use media::{MediaHit, MediaSearch, YouTubeSearch};

pub mod messaging;
pub use messaging::Channel;

mod news;
pub use news::{Headline, NewsApiClient, NewsClient};

mod weather;
pub use weather::{OpenWeatherClient, WeatherClient, WeatherReport};

pub mod status;
pub use status::StatusReport;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{key} is not configured")]
    NotConfigured { key: &'static str },

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("launch failed: {0}")]
    Launch(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("{0} is not supported")]
    Unsupported(String),
}

/// Which collaborator failed; decides the wording of the apology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Launcher,
    Media,
    Messaging,
    Weather,
    News,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Launcher => "launcher",
            Service::Media => "media",
            Service::Messaging => "messaging",
            Service::Weather => "weather",
            Service::News => "news",
        }
    }

    pub(crate) fn apology(&self, source: &ServiceError) -> String {
        match (self, source) {
            (Service::Weather, ServiceError::NotConfigured { .. }) => {
                "Weather API key not configured. Please add your OpenWeatherMap API key.".into()
            }
            (Service::News, ServiceError::NotConfigured { .. }) => {
                "News API key not configured. Please add your News API key.".into()
            }
            (Service::Weather, _) => "Sorry, there was an error getting weather information".into(),
            (Service::News, _) => "Sorry, I couldn't fetch the latest news".into(),
            (Service::Media, _) => "Sorry, I couldn't play that on YouTube".into(),
            (Service::Messaging, _) => {
                "Sorry, I couldn't reach that contact. Please make sure the app is installed.".into()
            }
            (Service::Launcher, _) => {
                "Sorry, something went wrong while trying to open that.".into()
            }
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the dispatcher may call out to. Weather and news are absent
/// when their credential is missing, so no request is ever attempted.
pub struct Services {
    pub launcher: Box<dyn Launcher>,
    pub media: Box<dyn MediaSearch>,
    pub weather: Option<Box<dyn WeatherClient>>,
    pub news: Option<Box<dyn NewsClient>>,
}

impl Services {
    /// Real collaborators configured from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(settings.http_timeout()).build()?;
        let keys = &settings.keys;

        let weather = keys.openweather.as_ref().map(|key| {
            Box::new(OpenWeatherClient::new(client.clone(), key.clone())) as Box<dyn WeatherClient>
        });
        let news = keys.news.as_ref().map(|key| {
            Box::new(NewsApiClient::new(
                client.clone(),
                key.clone(),
                settings.news_country.clone(),
            )) as Box<dyn NewsClient>
        });
        if weather.is_none() {
            debug!("weather disabled: OPENWEATHER_API_KEY not set");
        }
        if news.is_none() {
            debug!("news disabled: NEWS_API_KEY not set");
        }
        info!(
            weather = weather.is_some(),
            news = news.is_some(),
            youtube_api = keys.youtube.is_some(),
            "services configured"
        );

        Ok(Self {
            launcher: Box::new(SystemLauncher),
            media: Box::new(YouTubeSearch::new(client, keys.youtube.clone())),
            weather,
            news,
        })
    }
}
