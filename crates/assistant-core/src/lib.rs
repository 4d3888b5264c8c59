//! assistant-core: what the assistant does with a command
//!
//! A [`Session`] reads utterances from a [`voice_local::SpeechInput`],
//! classifies them with [`intent_parser::IntentParser`] and hands the intent
//! to the [`Dispatcher`], which performs one action through [`services`] and
//! produces a [`Response`] for the [`voice_local::Speaker`].

pub mod config;
pub use config::{ApiKeys, ApiStatusEntry, ConfigError, Settings};

mod error;
pub use error::{AssistantError, Result};

pub mod services;
pub use services::{Service, ServiceError, Services};

mod dispatcher;
pub use dispatcher::{Conversation, Dispatcher, Response};

pub mod contact_flow;
pub use contact_flow::{ContactFlow, FlowState};

mod session;
pub use session::{Control, CycleOutcome, Session, SessionState};

#[cfg(test)]
mod testing;
