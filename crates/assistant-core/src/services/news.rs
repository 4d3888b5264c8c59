//! Top headlines from NewsAPI

use super::ServiceError;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

const TOP_HEADLINES_API: &str = "https://newsapi.org/v2/top-headlines";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
}

pub trait NewsClient {
    fn top_headlines(&self, count: usize) -> Result<Vec<Headline>, ServiceError>;
}

pub struct NewsApiClient {
    client: Client,
    api_key: String,
    country: String,
    base_url: String,
}

#[derive(Deserialize)]
struct TopHeadlines {
    status: String,
    #[serde(default)]
    articles: Vec<Article>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct Article {
    title: Option<String>,
}

impl NewsApiClient {
    pub fn new(client: Client, api_key: String, country: String) -> Self {
        Self {
            client,
            api_key,
            country,
            base_url: TOP_HEADLINES_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl NewsClient for NewsApiClient {
    fn top_headlines(&self, count: usize) -> Result<Vec<Headline>, ServiceError> {
        debug!(country = %self.country, count, "requesting headlines");
        let page_size = count.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("country", self.country.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()?;
        if !resp.status().is_success() {
            return Err(ServiceError::Status(resp.status().as_u16()));
        }
        let body = resp.text()?;
        parse_headlines(&body, count)
    }
}

fn parse_headlines(body: &str, count: usize) -> Result<Vec<Headline>, ServiceError> {
    let data: TopHeadlines =
        serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
    if data.status != "ok" {
        return Err(ServiceError::Decode(
            data.message.unwrap_or_else(|| format!("status {}", data.status)),
        ));
    }
    Ok(data
        .articles
        .into_iter()
        .filter_map(|a| a.title)
        .filter(|t| !t.trim().is_empty())
        .take(count)
        .map(|title| Headline { title })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_takes_count() {
        let body = r#"{"status":"ok","totalResults":4,"articles":[
            {"title":"One"},{"title":null},{"title":"Two"},{"title":"Three"},{"title":"Four"}]}"#;
        let headlines = parse_headlines(body, 3).unwrap();
        let titles: Vec<_> = headlines.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, ["One", "Two", "Three"]);
    }

    #[test]
    fn test_unreachable_endpoint_is_http_error() {
        let client = NewsApiClient::new(Client::new(), "key".into(), "in".into())
            .with_base_url("http://127.0.0.1:9/v2/top-headlines");
        assert!(matches!(client.top_headlines(3), Err(ServiceError::Http(_))));
    }

    #[test]
    fn test_parse_error_status() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"bad key"}"#;
        match parse_headlines(body, 3) {
            Err(ServiceError::Decode(msg)) => assert_eq!(msg, "bad key"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
