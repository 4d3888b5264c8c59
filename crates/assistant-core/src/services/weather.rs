//! Current conditions from OpenWeatherMap

use super::ServiceError;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

const CURRENT_WEATHER_API: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub description: String,
    pub temperature_c: f64,
    pub humidity_pct: u32,
}

impl WeatherReport {
    pub fn sentence(&self) -> String {
        format!(
            "The weather in {} is {} with a temperature of {} degrees Celsius and humidity of {} percent.",
            self.city,
            self.description,
            self.temperature_c.round() as i64,
            self.humidity_pct
        )
    }
}

pub trait WeatherClient {
    fn current(&self, city: &str) -> Result<WeatherReport, ServiceError>;
}

pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct CurrentWeather {
    name: Option<String>,
    main: MainBlock,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: u32,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

impl OpenWeatherClient {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: CURRENT_WEATHER_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl WeatherClient for OpenWeatherClient {
    fn current(&self, city: &str) -> Result<WeatherReport, ServiceError> {
        debug!(city, "requesting current weather");
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()?;
        if !resp.status().is_success() {
            return Err(ServiceError::Status(resp.status().as_u16()));
        }
        let body = resp.text()?;
        parse_current(&body, city)
    }
}

fn parse_current(body: &str, requested: &str) -> Result<WeatherReport, ServiceError> {
    let data: CurrentWeather =
        serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
    let description = data
        .weather
        .into_iter()
        .next()
        .map(|c| c.description)
        .ok_or_else(|| ServiceError::Decode("no weather conditions".into()))?;
    Ok(WeatherReport {
        city: data
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| requested.to_string()),
        description,
        temperature_c: data.main.temp,
        humidity_pct: data.main.humidity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_current() {
        let body = r#"{"name":"Paris","main":{"temp":18.6,"humidity":72},
            "weather":[{"main":"Clouds","description":"broken clouds"}]}"#;
        let report = parse_current(body, "paris").unwrap();
        assert_eq!(
            report.sentence(),
            "The weather in Paris is broken clouds with a temperature of 19 degrees Celsius and humidity of 72 percent."
        );
    }

    #[test]
    fn test_parse_falls_back_to_requested_city() {
        let body = r#"{"main":{"temp":30.0,"humidity":40},"weather":[{"description":"clear sky"}]}"#;
        assert_eq!(parse_current(body, "delhi").unwrap().city, "delhi");
    }

    #[test]
    fn test_unreachable_endpoint_is_http_error() {
        let client = OpenWeatherClient::new(Client::new(), "key".into())
            .with_base_url("http://127.0.0.1:9/data/2.5/weather");
        assert!(matches!(client.current("Paris"), Err(ServiceError::Http(_))));
    }

    #[test]
    fn test_parse_rejects_missing_conditions() {
        let body = r#"{"main":{"temp":30.0,"humidity":40},"weather":[]}"#;
        assert!(matches!(
            parse_current(body, "x"),
            Err(ServiceError::Decode(_))
        ));
    }
}
