use thiserror::Error;

pub type Result<T, E = VoiceError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum VoiceError {
    /// Nothing was said before the listen timeout
    #[error("no speech captured before timeout")]
    Timeout,
    /// Audio was captured but could not be turned into text
    #[error("transcription failed: {0}")]
    Transcription(String),
    #[error("audio device error: {0}")]
    Device(String),
    /// The input source has no more utterances (EOF, exhausted script)
    #[error("input closed")]
    Closed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
