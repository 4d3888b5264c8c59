//! Finding something to play on YouTube

use super::ServiceError;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

const SEARCH_API: &str = "https://www.googleapis.com/youtube/v3/search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHit {
    pub url: String,
    /// Title of the chosen video when a search API picked one
    pub title: Option<String>,
}

pub trait MediaSearch {
    fn find(&self, search_term: &str) -> Result<MediaHit, ServiceError>;
}

/// Uses the Data API when a key is configured, otherwise (or when the API
/// fails) points at the results page for the term.
pub struct YouTubeSearch {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Option<Snippet>,
}

#[derive(Deserialize)]
struct SearchId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
}

impl YouTubeSearch {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: SEARCH_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search_api(&self, key: &str, term: &str) -> Result<MediaHit, ServiceError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("part", "snippet"),
                ("q", term),
                ("type", "video"),
                ("maxResults", "1"),
                ("key", key),
            ])
            .send()?;
        if !resp.status().is_success() {
            return Err(ServiceError::Status(resp.status().as_u16()));
        }
        let body: SearchResponse = resp.json()?;
        body.items
            .into_iter()
            .find_map(|item| {
                item.id.video_id.map(|id| MediaHit {
                    url: watch_url(&id),
                    title: item.snippet.map(|s| s.title),
                })
            })
            .ok_or_else(|| ServiceError::Decode(format!("no videos for {term:?}")))
    }
}

impl MediaSearch for YouTubeSearch {
    fn find(&self, search_term: &str) -> Result<MediaHit, ServiceError> {
        if let Some(key) = &self.api_key {
            match self.search_api(key, search_term) {
                Ok(hit) => {
                    debug!(url = %hit.url, "youtube api hit");
                    return Ok(hit);
                }
                Err(e) => warn!("youtube search failed, using results page: {e}"),
            }
        }
        Ok(MediaHit {
            url: results_url(search_term),
            title: None,
        })
    }
}

pub(crate) fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

pub(crate) fn results_url(term: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(term)
    )
}
