use crate::services::{Service, ServiceError};
use contact_store::StoreError;
use thiserror::Error;
use voice_local::VoiceError;

/// Everything a command cycle can fail with.
///
/// Every variant except [`AssistantError::Internal`] is expected during
/// normal use and ends in one spoken apology; the session keeps listening.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("no speech captured before the listen timeout")]
    InputTimeout,

    #[error("transcription failed: {0}")]
    TranscriptionFailure(String),

    #[error("no contact matches {0:?}")]
    ContactNotFound(String),

    #[error("{service} unavailable: {source}")]
    ExternalServiceUnavailable {
        service: Service,
        #[source]
        source: ServiceError,
    },

    #[error("unrecognized command: {0}")]
    UnrecognizedCommand(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = AssistantError> = core::result::Result<T, E>;

impl AssistantError {
    pub fn service(service: Service, source: ServiceError) -> Self {
        Self::ExternalServiceUnavailable { service, source }
    }

    /// The single line spoken to the user for this failure.
    pub fn apology(&self) -> String {
        match self {
            Self::InputTimeout => "I didn't hear anything.".to_string(),
            Self::TranscriptionFailure(_) => "Sorry, I couldn't understand that".to_string(),
            Self::ContactNotFound(fragment) if fragment.is_empty() => {
                "Sorry, I didn't catch who to contact".to_string()
            }
            Self::ContactNotFound(fragment) => {
                format!("Sorry, {fragment} does not exist in your contacts")
            }
            Self::ExternalServiceUnavailable { service, source } => service.apology(source),
            Self::UnrecognizedCommand(text) => format!("I'm not sure how to handle: {text}"),
            Self::Internal(_) => "Sorry, I encountered an error processing that command.".to_string(),
        }
    }

    /// Internal errors abort the cycle; everything else is recoverable.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<StoreError> for AssistantError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ContactNotFound(fragment) => Self::ContactNotFound(fragment),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<VoiceError> for AssistantError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::Timeout | VoiceError::Closed => Self::InputTimeout,
            VoiceError::Transcription(reason) => Self::TranscriptionFailure(reason),
            other => Self::Internal(other.to_string()),
        }
    }
}
