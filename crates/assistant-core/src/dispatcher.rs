//! Turns a classified intent into exactly one external effect and a reply

use crate::config::Settings;
use crate::contact_flow::ContactFlow;
use crate::error::{AssistantError, Result};
use crate::services::{Service, ServiceError, Services, StatusReport};
use contact_store::{ContactResolver, ContactStore, LaunchTarget, StoreError};
use intent_parser::{CommandNormalizer, ContactActionKind, Intent};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Follow-up questions asked while an action is in progress.
pub trait Conversation {
    /// Say `question` and wait for one answer.
    fn ask(&mut self, question: &str) -> Result<String>;
}

/// What the assistant says at the end of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub lines: Vec<String>,
    /// `false` when the reply is an apology
    pub handled: bool,
}

impl Response {
    pub fn ok(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            handled: true,
        }
    }

    pub fn with_lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            handled: true,
        }
    }

    pub fn failed(apology: impl Into<String>) -> Self {
        Self {
            lines: vec![apology.into()],
            handled: false,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

pub struct Dispatcher {
    settings: Settings,
    store: ContactStore,
    normalizer: CommandNormalizer,
    services: Services,
}

impl Dispatcher {
    pub fn new(settings: Settings, store: ContactStore, services: Services) -> Self {
        let normalizer = settings.intent_config().normalizer();
        Self {
            settings,
            store,
            normalizer,
            services,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle one intent. Expected failures come back as an apology
    /// [`Response`]; only [`AssistantError::Internal`] is returned as `Err`.
    pub fn dispatch(&self, intent: Intent, conv: &mut dyn Conversation) -> Result<Response> {
        let label = intent.label();
        let outcome = match intent {
            Intent::Open { target } => self.open(&target),
            Intent::PlayMedia { search_term } => self.play(&search_term),
            Intent::ContactAction { kind, command } => self.contact_action(kind, &command, conv),
            Intent::Weather { city } => self.weather(city),
            Intent::News => self.news(),
            Intent::ApiStatus => Ok(self.api_status()),
            Intent::Unrecognized { text } => Err(AssistantError::UnrecognizedCommand(text)),
        };

        match outcome {
            Ok(response) => {
                debug!(intent = label, handled = response.handled, "dispatched");
                Ok(response)
            }
            Err(err) if err.is_internal() => Err(err),
            Err(err) => {
                warn!(intent = label, "{err}");
                Ok(Response::failed(err.apology()))
            }
        }
    }

    /// Release the database. Consumes the dispatcher so nothing can touch
    /// the store afterwards.
    pub fn close(self) -> core::result::Result<(), StoreError> {
        self.store.close()
    }

    fn launch(&self, target: &str) -> Result<()> {
        self.services
            .launcher
            .launch(target)
            .map_err(|e| AssistantError::service(Service::Launcher, e))
    }

    fn open(&self, target: &str) -> Result<Response> {
        let target = target.trim();
        if target.is_empty() {
            return Ok(Response::failed("I'm not sure what you want me to open."));
        }

        match self.store.find_shortcut(target)? {
            Some(LaunchTarget::App(path)) => {
                info!(target, path = %path, "opening application shortcut");
                self.launch(&path)?;
                Ok(Response::ok(format!("Opening {target}")))
            }
            Some(LaunchTarget::Web(url)) => {
                info!(target, url = %url, "opening web shortcut");
                self.launch(&url)?;
                Ok(Response::ok(format!("Opening {target}")))
            }
            None => {
                info!(target, "no shortcut, handing to the OS");
                self.launch(target)?;
                Ok(Response::ok(format!(
                    "I couldn't find {target} in my database, but I'll try to open it."
                )))
            }
        }
    }

    fn play(&self, search_term: &str) -> Result<Response> {
        let search_term = search_term.trim();
        if search_term.is_empty() {
            return Ok(Response::failed("I'm not sure what you want me to play."));
        }
        let hit = self
            .services
            .media
            .find(search_term)
            .map_err(|e| AssistantError::service(Service::Media, e))?;
        if let Some(title) = &hit.title {
            debug!(title = %title, "chosen video");
        }
        self.services
            .launcher
            .launch(&hit.url)
            .map_err(|e| AssistantError::service(Service::Media, e))?;
        Ok(Response::ok(format!("Playing {search_term} on YouTube")))
    }

    fn contact_action(
        &self,
        kind: ContactActionKind,
        command: &str,
        conv: &mut dyn Conversation,
    ) -> Result<Response> {
        let resolver = ContactResolver::new(
            &self.store,
            &self.normalizer,
            self.settings.default_country_code.as_str(),
        );
        ContactFlow::new(kind, command, resolver, self.services.launcher.as_ref()).run(conv)
    }

    fn weather(&self, city: Option<String>) -> Result<Response> {
        let client = self.services.weather.as_ref().ok_or_else(|| {
            AssistantError::service(
                Service::Weather,
                ServiceError::NotConfigured {
                    key: "OPENWEATHER_API_KEY",
                },
            )
        })?;
        let city = city.unwrap_or_else(|| self.settings.default_city.clone());

        match client.current(&city) {
            Ok(report) => Ok(Response::ok(report.sentence())),
            Err(ServiceError::Status(code)) => {
                warn!(city = %city, code, "weather lookup rejected");
                Ok(Response::failed(format!(
                    "Sorry, I couldn't get weather information for {city}"
                )))
            }
            Err(e) => Err(AssistantError::service(Service::Weather, e)),
        }
    }

    fn news(&self) -> Result<Response> {
        let client = self.services.news.as_ref().ok_or_else(|| {
            AssistantError::service(
                Service::News,
                ServiceError::NotConfigured {
                    key: "NEWS_API_KEY",
                },
            )
        })?;
        let headlines = client
            .top_headlines(self.settings.news_count)
            .map_err(|e| AssistantError::service(Service::News, e))?;
        if headlines.is_empty() {
            return Ok(Response::ok("No news found"));
        }

        let mut lines = vec![format!(
            "Here are the top {} news headlines:",
            headlines.len()
        )];
        lines.extend(
            headlines
                .iter()
                .enumerate()
                .map(|(i, h)| format!("News {}: {}", i + 1, h.title)),
        );
        Ok(Response::with_lines(lines))
    }

    fn api_status(&self) -> Response {
        let report = StatusReport::from_keys(&self.settings.keys);
        for line in report.detail_lines() {
            info!("{line}");
        }
        Response::with_lines(report.spoken_lines())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKeys;
    use crate::services::WeatherReport;
    use crate::testing::{services, FakeNews, FakeWeather, ScriptedConversation};

    fn dispatcher(services: Services, keys: ApiKeys) -> Dispatcher {
        let store = ContactStore::open_in_memory().unwrap();
        store.insert_contact("Mom", "9876543210", None).unwrap();
        store
            .add_web_shortcut("github", "https://github.com")
            .unwrap();
        let settings = Settings {
            keys,
            ..Settings::default()
        };
        Dispatcher::new(settings, store, services)
    }

    fn no_answers() -> ScriptedConversation {
        ScriptedConversation::new(Vec::<String>::new())
    }

    #[test]
    fn test_open_without_shortcut_asks_os() {
        let (services, handles) = services();
        let d = dispatcher(services, ApiKeys::default());
        let response = d
            .dispatch(
                Intent::Open {
                    target: "notepad".into(),
                },
                &mut no_answers(),
            )
            .unwrap();
        assert!(response.handled);
        assert_eq!(handles.launcher.launched(), ["notepad"]);
        assert!(response.text().contains("try to open it"));
    }

    #[test]
    fn test_open_web_shortcut() {
        let (services, handles) = services();
        let d = dispatcher(services, ApiKeys::default());
        let response = d
            .dispatch(
                Intent::Open {
                    target: "github".into(),
                },
                &mut no_answers(),
            )
            .unwrap();
        assert_eq!(response.text(), "Opening github");
        assert_eq!(handles.launcher.launched(), ["https://github.com"]);
    }

    #[test]
    fn test_play_uses_results_page() {
        let (services, handles) = services();
        let d = dispatcher(services, ApiKeys::default());
        let response = d
            .dispatch(
                Intent::PlayMedia {
                    search_term: "lofi beats".into(),
                },
                &mut no_answers(),
            )
            .unwrap();
        assert_eq!(response.text(), "Playing lofi beats on YouTube");
        assert_eq!(
            handles.launcher.launched(),
            ["https://www.youtube.com/results?search_query=lofi%20beats"]
        );
    }

    #[test]
    fn test_weather_not_configured_makes_no_call() {
        let (services, handles) = services();
        let d = dispatcher(services, ApiKeys::default());
        let response = d
            .dispatch(
                Intent::Weather {
                    city: Some("paris".into()),
                },
                &mut no_answers(),
            )
            .unwrap();
        assert!(!response.handled);
        assert_eq!(
            response.text(),
            "Weather API key not configured. Please add your OpenWeatherMap API key."
        );
        assert!(handles.launcher.launched().is_empty());
    }

    #[test]
    fn test_weather_report_and_default_city() {
        let (mut services, _) = services();
        let weather = FakeWeather::answering(WeatherReport {
            city: "Delhi".into(),
            description: "haze".into(),
            temperature_c: 31.2,
            humidity_pct: 40,
        });
        services.weather = Some(Box::new(weather.clone()));
        let d = dispatcher(services, ApiKeys::default());

        let response = d
            .dispatch(Intent::Weather { city: None }, &mut no_answers())
            .unwrap();
        assert_eq!(
            response.text(),
            "The weather in Delhi is haze with a temperature of 31 degrees Celsius and humidity of 40 percent."
        );
        assert_eq!(weather.requested(), ["Delhi"]);
    }

    #[test]
    fn test_weather_rejected_city() {
        let (mut services, _) = services();
        services.weather = Some(Box::new(FakeWeather::status(404)));
        let d = dispatcher(services, ApiKeys::default());
        let response = d
            .dispatch(
                Intent::Weather {
                    city: Some("atlantis".into()),
                },
                &mut no_answers(),
            )
            .unwrap();
        assert_eq!(
            response.text(),
            "Sorry, I couldn't get weather information for atlantis"
        );
    }

    #[test]
    fn test_news_lines() {
        let (mut services, _) = services();
        services.news = Some(Box::new(FakeNews::with_titles(["First", "Second"])));
        let d = dispatcher(services, ApiKeys::default());
        let response = d.dispatch(Intent::News, &mut no_answers()).unwrap();
        assert_eq!(
            response.lines,
            [
                "Here are the top 2 news headlines:",
                "News 1: First",
                "News 2: Second"
            ]
        );

        let (mut services, _) = crate::testing::services();
        services.news = Some(Box::new(FakeNews::with_titles(Vec::<String>::new())));
        let d = dispatcher(services, ApiKeys::default());
        let response = d.dispatch(Intent::News, &mut no_answers()).unwrap();
        assert_eq!(response.text(), "No news found");
    }

    #[test]
    fn test_news_not_configured() {
        let (services, _) = services();
        let d = dispatcher(services, ApiKeys::default());
        let response = d.dispatch(Intent::News, &mut no_answers()).unwrap();
        assert!(response.text().starts_with("News API key not configured"));
    }

    #[test]
    fn test_api_status() {
        let (services, _) = services();
        let keys = ApiKeys {
            youtube: Some("k".into()),
            ..ApiKeys::default()
        };
        let d = dispatcher(services, keys);
        let response = d.dispatch(Intent::ApiStatus, &mut no_answers()).unwrap();
        assert_eq!(response.lines[0], "I have 1 out of 11 API services configured");
    }

    #[test]
    fn test_contact_action_through_dispatcher() {
        let (services, handles) = services();
        let d = dispatcher(services, ApiKeys::default());
        let mut conv = ScriptedConversation::new(["whatsapp"]);
        let response = d
            .dispatch(
                Intent::ContactAction {
                    kind: ContactActionKind::PhoneCall,
                    command: "phone call to mom".into(),
                },
                &mut conv,
            )
            .unwrap();
        assert_eq!(response.text(), "Calling Mom on WhatsApp");
        assert_eq!(handles.launcher.launched(), ["whatsapp://call?phone=919876543210"]);
    }

    #[test]
    fn test_unrecognized_echoes() {
        let (services, _) = services();
        let d = dispatcher(services, ApiKeys::default());
        let response = d
            .dispatch(
                Intent::Unrecognized {
                    text: "asdkjasd".into(),
                },
                &mut no_answers(),
            )
            .unwrap();
        assert!(!response.handled);
        assert!(response.text().contains("asdkjasd"));
    }

    #[test]
    fn test_launch_failure_is_an_apology() {
        let (mut services, _) = services();
        services.launcher = Box::new(crate::testing::FakeLauncher::failing());
        let d = dispatcher(services, ApiKeys::default());
        let response = d
            .dispatch(
                Intent::Open {
                    target: "notepad".into(),
                },
                &mut no_answers(),
            )
            .unwrap();
        assert!(!response.handled);
        assert_eq!(
            response.text(),
            "Sorry, something went wrong while trying to open that."
        );
    }
}
