//! voice-local: speech input/output for the assistant
//!
//! A session talks to the user through two traits: [`SpeechInput`] produces
//! one utterance per call and [`Speaker`] delivers replies. Console and
//! scripted backends are always cheap to build; the microphone backend
//! (feature `audio`) captures with `cpal` and transcribes over HTTP.

mod error;
pub use error::{Result, VoiceError};

mod types;
pub use types::{ListenConfig, TranscriptionConfig, Utterance};

mod traits;
pub use traits::{Speaker, SpeechInput, Transcriber};

mod console;
pub use console::{ConsoleInput, ConsoleSpeaker};

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::{RecordingSpeaker, ScriptStep, ScriptedInput};

#[cfg(feature = "audio")]
mod hosted;
#[cfg(feature = "audio")]
pub use hosted::HostedTranscriber;

#[cfg(feature = "audio")]
pub mod mic;
#[cfg(feature = "audio")]
pub use mic::MicInput;

pub mod plugin;
