//! Fakes for driving the dispatcher and session without side effects

use crate::dispatcher::Conversation;
use crate::error::{AssistantError, Result};
use crate::services::{
    Headline, Launcher, NewsClient, ServiceError, Services, WeatherClient, WeatherReport,
    YouTubeSearch,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Records every launch target; optionally fails each launch.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    launched: Arc<Mutex<Vec<String>>>,
    attempts: Arc<Mutex<usize>>,
    fail: bool,
}

impl FakeLauncher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Targets launched successfully
    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl Launcher for FakeLauncher {
    fn launch(&self, target: &str) -> core::result::Result<(), ServiceError> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail {
            return Err(ServiceError::Launch(format!("{target}: no handler")));
        }
        self.launched.lock().unwrap().push(target.to_string());
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeWeather {
    answer: core::result::Result<WeatherReport, u16>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl FakeWeather {
    pub fn answering(report: WeatherReport) -> Self {
        Self {
            answer: Ok(report),
            requested: Arc::default(),
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            answer: Err(code),
            requested: Arc::default(),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl WeatherClient for FakeWeather {
    fn current(&self, city: &str) -> core::result::Result<WeatherReport, ServiceError> {
        self.requested.lock().unwrap().push(city.to_string());
        self.answer.clone().map_err(ServiceError::Status)
    }
}

pub struct FakeNews {
    titles: Vec<String>,
}

impl FakeNews {
    pub fn with_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }
}

impl NewsClient for FakeNews {
    fn top_headlines(&self, count: usize) -> core::result::Result<Vec<Headline>, ServiceError> {
        Ok(self
            .titles
            .iter()
            .take(count)
            .map(|t| Headline { title: t.clone() })
            .collect())
    }
}

/// Answers follow-up questions from a fixed list; runs dry as silence.
pub struct ScriptedConversation {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedConversation {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.clone()
    }
}

impl Conversation for ScriptedConversation {
    fn ask(&mut self, question: &str) -> Result<String> {
        self.asked.push(question.to_string());
        self.answers.pop_front().ok_or(AssistantError::InputTimeout)
    }
}

pub struct Handles {
    pub launcher: FakeLauncher,
}

/// Services with a recording launcher, keyless YouTube search and no
/// weather or news client.
pub fn services() -> (Services, Handles) {
    let launcher = FakeLauncher::default();
    let services = Services {
        launcher: Box::new(launcher.clone()),
        media: Box::new(YouTubeSearch::new(reqwest::blocking::Client::new(), None)),
        weather: None,
        news: None,
    };
    (services, Handles { launcher })
}
