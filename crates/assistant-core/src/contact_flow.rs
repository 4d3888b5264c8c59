//! Message and call actions toward a stored contact
//!
//! A contact action is a short conversation: resolve the contact, ask which
//! channel to use, ask for the message body when sending a message, then
//! open the matching deep link. Each step is one [`FlowState`] transition so
//! the sequence can be observed and tested one move at a time.

use crate::dispatcher::{Conversation, Response};
use crate::error::{AssistantError, Result};
use crate::services::messaging::{contact_uri, success_message};
use crate::services::{Channel, Launcher, Service, ServiceError};
use contact_store::{ContactResolver, ResolvedContact};
use intent_parser::ContactActionKind;
use tracing::{debug, info, warn};

pub const CHANNEL_PROMPT: &str = "Which mode you want to use whatsapp or mobile";
pub const BODY_PROMPT: &str = "What message to send";
const TRY_AGAIN: &str = "Please try again";
const EMPTY_BODY: &str = "No message to send";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    AwaitingContactResolved,
    AwaitingChannelChoice {
        contact: ResolvedContact,
    },
    AwaitingMessageBody {
        contact: ResolvedContact,
        channel: Channel,
    },
    Executing {
        contact: ResolvedContact,
        channel: Channel,
        body: Option<String>,
    },
    /// Terminal: what to tell the user
    Done(String),
    /// Terminal: the apology to speak
    Failed(String),
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Done(_) | FlowState::Failed(_))
    }

    fn name(&self) -> &'static str {
        match self {
            FlowState::AwaitingContactResolved => "awaiting_contact_resolved",
            FlowState::AwaitingChannelChoice { .. } => "awaiting_channel_choice",
            FlowState::AwaitingMessageBody { .. } => "awaiting_message_body",
            FlowState::Executing { .. } => "executing",
            FlowState::Done(_) => "done",
            FlowState::Failed(_) => "failed",
        }
    }
}

pub struct ContactFlow<'a> {
    kind: ContactActionKind,
    command: String,
    resolver: ContactResolver<'a>,
    launcher: &'a dyn Launcher,
    state: FlowState,
}

impl<'a> ContactFlow<'a> {
    pub fn new(
        kind: ContactActionKind,
        command: impl Into<String>,
        resolver: ContactResolver<'a>,
        launcher: &'a dyn Launcher,
    ) -> Self {
        Self {
            kind,
            command: command.into(),
            resolver,
            launcher,
            state: FlowState::AwaitingContactResolved,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Advance one transition. Terminal states stay put.
    pub fn step(&mut self, conv: &mut dyn Conversation) -> Result<()> {
        let current = std::mem::replace(&mut self.state, FlowState::AwaitingContactResolved);
        let from = current.name();
        let next = match current {
            FlowState::AwaitingContactResolved => self.resolve()?,
            FlowState::AwaitingChannelChoice { contact } => {
                let answer = ask(conv, CHANNEL_PROMPT)?;
                match Channel::from_answer(&answer) {
                    None => {
                        debug!(answer = %answer, "no channel in answer");
                        FlowState::Failed(TRY_AGAIN.to_string())
                    }
                    Some(channel) if self.kind == ContactActionKind::Message => {
                        FlowState::AwaitingMessageBody { contact, channel }
                    }
                    Some(channel) => FlowState::Executing {
                        contact,
                        channel,
                        body: None,
                    },
                }
            }
            FlowState::AwaitingMessageBody { contact, channel } => {
                let body = ask(conv, BODY_PROMPT)?;
                if body.is_empty() {
                    FlowState::Failed(EMPTY_BODY.to_string())
                } else {
                    FlowState::Executing {
                        contact,
                        channel,
                        body: Some(body),
                    }
                }
            }
            FlowState::Executing {
                contact,
                channel,
                body,
            } => self.execute(&contact, channel, body.as_deref()),
            terminal => terminal,
        };
        debug!(from, to = next.name(), "contact flow transition");
        self.state = next;
        Ok(())
    }

    /// Drive the flow to a terminal state.
    pub fn run(mut self, conv: &mut dyn Conversation) -> Result<Response> {
        loop {
            match self.state {
                FlowState::Done(message) => return Ok(Response::ok(message)),
                FlowState::Failed(apology) => return Ok(Response::failed(apology)),
                _ => self.step(conv)?,
            }
        }
    }

    fn resolve(&self) -> Result<FlowState> {
        match self.resolver.resolve(&self.command) {
            Ok(contact) => Ok(FlowState::AwaitingChannelChoice { contact }),
            Err(e) => {
                let err = AssistantError::from(e);
                if err.is_internal() {
                    return Err(err);
                }
                info!("{err}");
                Ok(FlowState::Failed(err.apology()))
            }
        }
    }

    fn execute(&self, contact: &ResolvedContact, channel: Channel, body: Option<&str>) -> FlowState {
        let name = &contact.contact.name;
        let uri = match contact_uri(channel, self.kind, &contact.phone, body) {
            Ok(uri) => uri,
            Err(ServiceError::Unsupported(what)) => {
                info!("{what} is not supported");
                return FlowState::Failed(TRY_AGAIN.to_string());
            }
            Err(e) => return FlowState::Failed(AssistantError::service(Service::Messaging, e).apology()),
        };
        match self.launcher.launch(&uri) {
            Ok(()) => {
                info!(contact = %name, channel = %channel, kind = %self.kind, "contact action launched");
                FlowState::Done(success_message(channel, self.kind, name))
            }
            Err(e) => {
                warn!("contact action failed: {e}");
                FlowState::Failed(AssistantError::service(Service::Messaging, e).apology())
            }
        }
    }
}

/// Follow-up question; silence or garbled speech counts as an empty answer.
fn ask(conv: &mut dyn Conversation, question: &str) -> Result<String> {
    match conv.ask(question) {
        Ok(answer) => Ok(answer.trim().to_string()),
        Err(e) if e.is_internal() => Err(e),
        Err(e) => {
            debug!("no answer to {question:?}: {e}");
            Ok(String::new())
        }
    }
}
